//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (exact sliding-log check per client IP)
//!     → admitted requests pass to cache/selection
//!     → rejected requests are dropped silently (client times out)
//! ```
//!
//! # Design Decisions
//! - Rejection is a normal, frequent outcome, not an error
//! - The log is exact: real timestamps, not bucketed counters
//! - Idle client logs are swept to bound memory

pub mod rate_limit;

pub use rate_limit::RateLimiter;
