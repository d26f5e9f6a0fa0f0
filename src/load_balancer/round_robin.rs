//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, Strategy};

/// Round-robin selector.
/// Stores an internal cursor to rotate through the list it is given.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for RoundRobin {
    fn next(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>> {
        if backends.is_empty() {
            return None;
        }

        // Advance only when a selection is actually made. Lost increments
        // under contention cost fairness, not correctness: the index is
        // always reduced modulo the current list length.
        let cursor = self.cursor.fetch_add(1, Ordering::Relaxed);
        Some(backends[cursor % backends.len()].clone())
    }
}
