//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Cache miss in dispatch
//!     → pool.rs (filter configured backends by health flag)
//!     → round_robin.rs (rotate through the healthy subset)
//!     → Return backend or NoHealthyBackend
//! ```
//!
//! # Design Decisions
//! - Selection is purely positional over the *currently* healthy list;
//!   a health flip between two selections shifts the rotation, accepted
//! - Health flags live on the backends; the pool never owns a lock
//! - Request-path failures never touch health state (monitor's call alone)

pub mod backend;
pub mod pool;
pub mod round_robin;

use std::sync::Arc;

use backend::Backend;

/// A selection strategy over the currently healthy backend list.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Pick a backend from `backends`, or `None` when the list is empty.
    fn next(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
