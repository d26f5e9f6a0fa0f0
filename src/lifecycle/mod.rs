//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build dispatcher state → Start tasks
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast to long-lived tasks → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown is coordinated for long-lived tasks only; in-flight request
//!   handlers are never drained

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
