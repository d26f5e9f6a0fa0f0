//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses actually parse
//! - Validate value ranges (windows, TTLs, caps > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function over the config
//! - Runs before the config is accepted into the system

use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The listener bind address does not parse as a socket address.
    #[error("listener bind address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    /// A backend address does not parse as a socket address.
    #[error("backend address {0:?} is not a valid socket address")]
    InvalidBackendAddress(String),

    /// No backends configured; nothing to balance over.
    #[error("at least one backend must be configured")]
    NoBackends,

    /// A zero value where a positive one is required.
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    /// The admin API address does not parse as a socket address.
    #[error("admin bind address {0:?} is not a valid socket address")]
    InvalidAdminAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for backend in &config.backends {
        if backend.address.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidBackendAddress(backend.address.clone()));
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroValue("health_check.interval_secs"));
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroValue("health_check.timeout_ms"));
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroValue("rate_limit.window_secs"));
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroValue("rate_limit.max_requests"));
    }
    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::ZeroValue("cache.ttl_secs"));
    }
    if config.cache.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroValue("cache.sweep_interval_secs"));
    }
    if config.timeouts.backend_reply_ms == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.backend_reply_ms"));
    }
    if config.listener.max_in_flight == 0 {
        errors.push(ValidationError::ZeroValue("listener.max_in_flight"));
    }

    if config.admin.enabled && config.admin.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAdminAddress(config.admin.bind_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    fn valid_config() -> BalancerConfig {
        let mut config = BalancerConfig::default();
        config.backends.push(BackendConfig {
            address: "127.0.0.1:1250".to_string(),
        });
        config
    }

    #[test]
    fn default_with_one_backend_is_valid() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn empty_backend_list_is_rejected() {
        let config = BalancerConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::NoBackends)));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = BalancerConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.rate_limit.window_secs = 0;
        config.backends.push(BackendConfig {
            address: "also bad".to_string(),
        });
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = valid_config();
        config.cache.ttl_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::ZeroValue("cache.ttl_secs"))));
    }
}
