//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! balancer. All types derive Serde traits for deserialization from config
//! files, and every section has defaults so a minimal config works.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address, in-flight cap).
    pub listener: ListenerConfig,

    /// Backend server definitions.
    pub backends: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Response cache configuration.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:1245").
    pub bind_address: String,

    /// Maximum concurrently in-flight request handlers.
    ///
    /// Datagrams arriving past the cap are dropped silently, the same
    /// outcome a rate-limited client sees.
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:1245".to_string(),
            max_in_flight: 1024,
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend address (e.g., "127.0.0.1:1250").
    pub address: String,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Interval between probe rounds in seconds.
    pub interval_secs: u64,

    /// Per-probe reply timeout in milliseconds.
    pub timeout_ms: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            timeout_ms: 1000,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Sliding window width in seconds.
    pub window_secs: u64,

    /// Maximum admitted requests per client within the window.
    pub max_requests: usize,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 10,
            max_requests: 5,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,

    /// Interval between janitor sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            sweep_interval_secs: 30,
        }
    }
}

/// Timeout configuration for request-path operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bounded wait for a backend reply in milliseconds.
    pub backend_reply_ms: u64,
}

impl TimeoutConfig {
    pub fn backend_reply(&self) -> Duration {
        Duration::from_millis(self.backend_reply_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            backend_reply_ms: 2000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin read API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = BalancerConfig::default();
        assert_eq!(config.listener.bind_address, "127.0.0.1:1245");
        assert_eq!(config.health_check.interval(), Duration::from_secs(5));
        assert_eq!(config.health_check.probe_timeout(), Duration::from_millis(1000));
        assert_eq!(config.rate_limit.window(), Duration::from_secs(10));
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.timeouts.backend_reply(), Duration::from_millis(2000));
    }

    #[test]
    fn minimal_toml_parses_with_defaults() {
        let raw = r#"
            [[backends]]
            address = "127.0.0.1:1250"

            [[backends]]
            address = "127.0.0.1:1251"
        "#;
        let config: BalancerConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[1].address, "127.0.0.1:1251");
        assert_eq!(config.rate_limit.max_requests, 5);
        assert!(config.admin.enabled);
    }

    #[test]
    fn sections_override_defaults() {
        let raw = r#"
            [listener]
            bind_address = "0.0.0.0:5353"
            max_in_flight = 64

            [[backends]]
            address = "10.0.0.1:53"

            [rate_limit]
            window_secs = 1
            max_requests = 100

            [cache]
            ttl_secs = 5
        "#;
        let config: BalancerConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.listener.max_in_flight, 64);
        assert_eq!(config.rate_limit.window_secs, 1);
        assert_eq!(config.cache.ttl_secs, 5);
        // untouched section keeps its default
        assert_eq!(config.health_check.interval_secs, 5);
    }
}
