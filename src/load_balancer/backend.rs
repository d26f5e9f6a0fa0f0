//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend endpoint
//! - Track the health flag (written by the monitor, read by selection)

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

/// A single backend endpoint.
///
/// Identity (the address) is immutable and set at startup. Only the health
/// flag ever changes, and the health monitor is its only writer.
#[derive(Debug)]
pub struct Backend {
    /// The address of the backend.
    pub addr: SocketAddr,
    /// Current health flag.
    healthy: AtomicBool,
}

impl Backend {
    /// Create a new backend.
    ///
    /// Backends start healthy; the first probe round corrects the flag
    /// within one health-check interval.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            healthy: AtomicBool::new(true),
        }
    }

    /// Return true if the last probe round saw this backend respond.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    /// Set the health flag, returning the previous value.
    pub fn set_healthy(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_healthy_and_flips() {
        let backend = Backend::new("127.0.0.1:1250".parse().unwrap());
        assert!(backend.is_healthy());

        let was = backend.set_healthy(false);
        assert!(was);
        assert!(!backend.is_healthy());

        let was = backend.set_healthy(true);
        assert!(!was);
        assert!(backend.is_healthy());
    }
}
