//! Backend pool management.
//!
//! # Responsibilities
//! - Own the configured backends in configuration order
//! - Filter by health flag and apply the selection strategy
//! - Expose a health snapshot for probing and the admin API

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::BackendConfig;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::round_robin::RoundRobin;
use crate::load_balancer::Strategy;

/// Error returned when the healthy subset is empty.
///
/// Always request-scoped: callers drop the request and carry on. The pool
/// self-heals once the health monitor restores an endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no healthy backends available")]
pub struct NoHealthyBackend;

/// Manages the backend set and selection over its healthy subset.
#[derive(Debug)]
pub struct BackendPool {
    /// All configured backends, in configuration order. Entries are created
    /// at startup and never removed; only their health flags change.
    backends: Vec<Arc<Backend>>,
    /// Selection strategy applied to the healthy subset.
    strategy: Box<dyn Strategy>,
}

impl BackendPool {
    /// Create a pool over already-parsed addresses.
    pub fn new(addrs: Vec<SocketAddr>) -> Self {
        let backends = addrs
            .into_iter()
            .map(|addr| Arc::new(Backend::new(addr)))
            .collect();
        Self {
            backends,
            strategy: Box::new(RoundRobin::new()),
        }
    }

    /// Create a pool from configuration, skipping unparseable addresses.
    ///
    /// Validation has already rejected bad addresses on the normal startup
    /// path; the warn here covers pools built without it.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        let mut addrs = Vec::new();
        for config in configs {
            match config.address.parse() {
                Ok(addr) => addrs.push(addr),
                Err(_) => {
                    tracing::warn!(address = %config.address, "Invalid backend address, skipping")
                }
            }
        }
        Self::new(addrs)
    }

    /// Select a backend from the currently healthy subset.
    pub fn select(&self) -> Result<Arc<Backend>, NoHealthyBackend> {
        let healthy: Vec<Arc<Backend>> = self
            .backends
            .iter()
            .filter(|b| b.is_healthy())
            .cloned()
            .collect();

        self.strategy.next(&healthy).ok_or(NoHealthyBackend)
    }

    /// Return all backends (for health checking).
    pub fn all_backends(&self) -> Vec<Arc<Backend>> {
        self.backends.clone()
    }

    /// Address → health flag, in configuration order.
    pub fn health_snapshot(&self) -> Vec<(SocketAddr, bool)> {
        self.backends
            .iter()
            .map(|b| (b.addr, b.is_healthy()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(addrs: &[&str]) -> BackendPool {
        BackendPool::new(addrs.iter().map(|a| a.parse().unwrap()).collect())
    }

    #[test]
    fn selection_alternates_over_healthy_pair() {
        let pool = pool(&["127.0.0.1:1250", "127.0.0.1:1251"]);
        let a = pool.select().unwrap().addr;
        let b = pool.select().unwrap().addr;
        let c = pool.select().unwrap().addr;
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn unhealthy_backends_are_excluded() {
        let pool = pool(&["127.0.0.1:1250", "127.0.0.1:1251"]);
        pool.all_backends()[0].set_healthy(false);

        for _ in 0..4 {
            let picked = pool.select().unwrap();
            assert_eq!(picked.addr, "127.0.0.1:1251".parse().unwrap());
        }
    }

    #[test]
    fn empty_healthy_subset_errors() {
        let pool = pool(&["127.0.0.1:1250"]);
        pool.all_backends()[0].set_healthy(false);
        assert_eq!(pool.select().unwrap_err(), NoHealthyBackend);
    }

    #[test]
    fn recovered_backend_rejoins_rotation() {
        let pool = pool(&["127.0.0.1:1250", "127.0.0.1:1251"]);
        pool.all_backends()[0].set_healthy(false);
        let _ = pool.select().unwrap();

        pool.all_backends()[0].set_healthy(true);
        let picked: Vec<_> = (0..4).map(|_| pool.select().unwrap().addr).collect();
        assert!(picked.contains(&"127.0.0.1:1250".parse().unwrap()));
        assert!(picked.contains(&"127.0.0.1:1251".parse().unwrap()));
    }

    #[test]
    fn from_config_skips_invalid_addresses() {
        let configs = vec![
            BackendConfig {
                address: "127.0.0.1:1250".to_string(),
            },
            BackendConfig {
                address: "bogus".to_string(),
            },
        ];
        let pool = BackendPool::from_config(&configs);
        assert_eq!(pool.all_backends().len(), 1);
    }
}
