//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request correlation ids)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Every request outcome is counted, drops included: a silent drop on
//!   the wire must still be visible to the operator
//! - Metric updates are cheap (atomic increments)
//! - The exporter is opt-in; recording without it installed is a no-op

pub mod logging;
pub mod metrics;
