//! Active-client bookkeeping.
//!
//! Pure observability: which client IPs have been answered, and when last.
//! Entries are upserted on every successfully dispatched request and never
//! expire on their own.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// Last-seen record per client IP, in unix seconds.
#[derive(Default)]
pub struct ActiveClientRegistry {
    clients: DashMap<IpAddr, u64>,
}

impl ActiveClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `client` was just answered.
    pub fn touch(&self, client: IpAddr) {
        self.clients.insert(client, unix_now());
    }

    /// Point-in-time copy for the admin API.
    pub fn snapshot(&self) -> HashMap<IpAddr, u64> {
        self.clients
            .iter()
            .map(|r| (*r.key(), *r.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
