//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem
//! - Respect RUST_LOG when set, fall back to the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when present; otherwise the configured level applies to
/// this crate's targets.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("udp_balancer={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
