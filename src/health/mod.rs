//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs:
//!     Periodic timer
//!     → Probe each configured backend (sentinel datagram, bounded wait)
//!     → Flip the backend's health flag with the result
//! ```
//!
//! # Design Decisions
//! - One probe decides: a missed probe marks down, an answered probe
//!   marks up (no hysteresis thresholds)
//! - Probe failures are recorded, never raised
//! - Health state is the monitor's alone; the request path never writes it

pub mod monitor;

pub use monitor::HealthMonitor;
