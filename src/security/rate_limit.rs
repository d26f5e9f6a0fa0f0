//! Per-client sliding-log rate limiting.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// An exact sliding-window rate limiter keyed by client IP.
///
/// Each client carries an ordered log of admission timestamps. On every
/// check the log is pruned to the trailing window before counting, so the
/// limit holds over any window-sized interval, not calendar buckets.
/// Memory per client is proportional to its recent admitted traffic.
pub struct RateLimiter {
    /// Client IP → admission timestamps, oldest first.
    log: DashMap<IpAddr, VecDeque<Instant>>,
    /// Trailing window width.
    window: Duration,
    /// Maximum admitted requests per client within the window.
    max_requests: usize,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            log: DashMap::new(),
            window,
            max_requests,
        }
    }

    /// Check a client and record the request if admitted.
    ///
    /// Returns `true` when admitted. Rejected requests are NOT recorded:
    /// a client hammering past its quota does not push its own window
    /// forward. The entry lock makes the prune-check-append atomic per
    /// client while other clients proceed in parallel.
    pub fn check_and_record(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut timestamps = self.log.entry(client).or_default();

        while let Some(front) = timestamps.front() {
            if now.duration_since(*front) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push_back(now);
        true
    }

    /// Drop clients whose whole log has aged out of the window.
    ///
    /// Lazy pruning only runs for clients that come back; this bounds the
    /// map for clients that never do. Called by the janitor task.
    pub fn purge_idle(&self) {
        let now = Instant::now();
        self.log.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|newest| now.duration_since(*newest) <= self.window)
        });
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const CLIENT: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(192, 168, 1, 1));
    const OTHER: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(192, 168, 1, 2));

    #[test]
    fn admits_up_to_capacity_then_rejects() {
        let limiter = RateLimiter::new(Duration::from_secs(10), 5);

        for _ in 0..5 {
            assert!(limiter.check_and_record(CLIENT));
        }
        assert!(!limiter.check_and_record(CLIENT));
    }

    #[test]
    fn window_rolls_and_readmits() {
        let limiter = RateLimiter::new(Duration::from_millis(100), 2);

        assert!(limiter.check_and_record(CLIENT));
        assert!(limiter.check_and_record(CLIENT));
        assert!(!limiter.check_and_record(CLIENT));

        sleep(Duration::from_millis(150));
        assert!(limiter.check_and_record(CLIENT));
    }

    #[test]
    fn rejections_are_not_recorded() {
        let limiter = RateLimiter::new(Duration::from_millis(200), 1);

        assert!(limiter.check_and_record(CLIENT));
        // A burst of rejections must not extend the client's window.
        for _ in 0..10 {
            assert!(!limiter.check_and_record(CLIENT));
        }

        sleep(Duration::from_millis(250));
        assert!(limiter.check_and_record(CLIENT));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(Duration::from_secs(10), 1);

        assert!(limiter.check_and_record(CLIENT));
        assert!(limiter.check_and_record(OTHER));
        assert!(!limiter.check_and_record(CLIENT));
        assert!(!limiter.check_and_record(OTHER));
    }

    #[test]
    fn purge_drops_idle_clients_only() {
        let limiter = RateLimiter::new(Duration::from_millis(100), 5);

        assert!(limiter.check_and_record(CLIENT));
        sleep(Duration::from_millis(150));
        assert!(limiter.check_and_record(OTHER));

        limiter.purge_idle();
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
