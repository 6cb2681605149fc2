//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, expired removals and sweeps.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache activity and occupancy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Name of the store instance
    pub name: String,
    /// Current number of stored entries (expired ones not yet swept included)
    pub size: usize,
    /// Entry count per namespace
    pub namespaces: BTreeMap<String, usize>,
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that returned nothing (absent or expired)
    pub misses: u64,
    /// Number of entries removed because they expired
    pub expired: u64,
    /// Number of full sweeps performed
    pub sweeps: u64,
    /// Time of the last full sweep
    pub last_cleanup: Option<DateTime<Utc>>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates empty statistics for the named store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    // == Record Sweep ==
    /// Counts a sweep and stamps its time (Unix milliseconds).
    pub fn record_sweep(&mut self, at_ms: u64) {
        self.sweeps += 1;
        self.last_cleanup = DateTime::from_timestamp_millis(at_ms as i64);
    }
}
