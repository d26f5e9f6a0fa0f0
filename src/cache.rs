//! Response caching.
//!
//! The single source of truth for "has this exact query been recently
//! answered". Keys are the raw request payloads, byte for byte; the cache
//! does not know or care which backend produced the stored answer.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A cached backend response.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    stored_at: Instant,
}

/// A thread-safe TTL cache keyed by raw request payload.
pub struct ResponseCache {
    entries: DashMap<Vec<u8>, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a payload, expiring lazily.
    ///
    /// An entry is visible only while `now - stored_at <= TTL`. An expired
    /// entry is treated as absent and removed on the spot.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let hit = match self.entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => Some(entry.value.clone()),
            Some(_) => None,
            None => return None,
        };

        if hit.is_none() {
            // Re-checked under the entry lock so a concurrent overwrite
            // with a fresh timestamp survives.
            self.entries
                .remove_if(key, |_, entry| entry.stored_at.elapsed() > self.ttl);
        }

        hit
    }

    /// Store a response, overwriting any existing entry with a fresh
    /// timestamp (insert-or-replace, never insert-if-absent).
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired-but-unreaped included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reap entries that expired but were never looked up again.
    /// Called by the janitor task.
    pub fn purge_expired(&self) {
        self.entries
            .retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
    }
}
