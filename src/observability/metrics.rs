//! Metrics collection and exposition.
//!
//! # Metrics
//! - `balancer_requests_total` (counter): requests by terminal outcome
//! - `balancer_rate_limited_total` (counter): silent drops from quota
//! - `balancer_cache_entries` (gauge): current cache occupancy
//! - `balancer_backend_health` (gauge): 1=healthy, 0=unhealthy, per backend
//! - `balancer_active_clients` (gauge): registry size
//!
//! # Design Decisions
//! - Helpers are no-ops until an exporter is installed, so library code
//!   records unconditionally
//! - Labels carry the backend address and the request outcome

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a request reaching a terminal outcome.
pub fn record_request(outcome: &'static str) {
    counter!("balancer_requests_total", "outcome" => outcome).increment(1);
}

/// Count a quota rejection.
pub fn record_rate_limited() {
    counter!("balancer_rate_limited_total").increment(1);
}

/// Export current cache occupancy.
pub fn record_cache_size(entries: usize) {
    gauge!("balancer_cache_entries").set(entries as f64);
}

/// Export a backend's probed health.
pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("balancer_backend_health", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

/// Export the active-client registry size.
pub fn record_active_clients(clients: usize) {
    gauge!("balancer_active_clients").set(clients as f64);
}
