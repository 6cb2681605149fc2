//! Cache Store Module
//!
//! Namespaced key-value storage with per-entry TTL, eviction on read and a
//! throttled full sweep.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{
    CacheEntry, CacheStats, Clock, SystemClock, DEFAULT_CLEANUP_INTERVAL,
    DEFAULT_CLEANUP_THRESHOLD,
};

// == Cache Store ==
/// Namespaced TTL cache.
///
/// Entries live in one table per namespace, so clearing a namespace can never
/// reach into another one. The store never fails: every operation either
/// finds a live value or reports a miss.
#[derive(Debug)]
pub struct CacheStore {
    /// namespace -> key -> entry
    entries: HashMap<String, HashMap<String, CacheEntry>>,
    /// Number of stored entries across all namespaces
    len: usize,
    /// Activity counters
    stats: CacheStats,
    /// Time source for expiry and throttling
    clock: Arc<dyn Clock>,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
    /// Minimum time between two full sweeps
    cleanup_interval: Duration,
    /// Stored-entry count above which `set` attempts a sweep
    cleanup_threshold: usize,
    /// Time of the last full sweep (Unix milliseconds)
    last_cleanup: Option<u64>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store using the system clock and default sweep settings.
    ///
    /// # Arguments
    /// * `name` - Label reported in statistics
    /// * `default_ttl` - TTL for entries stored without an explicit one
    pub fn new(name: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            len: 0,
            stats: CacheStats::new(name),
            clock: Arc::new(SystemClock),
            default_ttl,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            cleanup_threshold: DEFAULT_CLEANUP_THRESHOLD,
            last_cleanup: None,
        }
    }

    /// Overrides the sweep throttle window and the size-triggered threshold.
    pub fn with_cleanup(mut self, interval: Duration, threshold: usize) -> Self {
        self.cleanup_interval = interval;
        self.cleanup_threshold = threshold;
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Get ==
    /// Returns the value stored under `namespace`/`key` if it is still live.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now_ms();

        let expired = match self.entries.get(namespace).and_then(|ns| ns.get(key)) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_entry(namespace, key);
            self.stats.record_expired(1);
        }
        self.stats.record_miss();
        None
    }

    // == Set ==
    /// Stores a value, replacing any existing entry and resetting its TTL.
    ///
    /// # Arguments
    /// * `namespace` - Key space to store under
    /// * `key` - Key within the namespace
    /// * `value` - Opaque bytes
    /// * `ttl` - Time to live (uses the store default if None)
    pub fn set(&mut self, namespace: &str, key: &str, value: Vec<u8>, ttl: Option<Duration>) {
        let now = self.clock.now_ms();
        let ttl_ms = duration_ms(ttl.unwrap_or(self.default_ttl));
        let entry = CacheEntry::new(value, now, ttl_ms);

        let previous = self
            .entries
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), entry);
        if previous.is_none() {
            self.len += 1;
        }

        if self.len > self.cleanup_threshold {
            self.clean_expired();
        }
    }

    // == Delete ==
    /// Removes an entry. Returns whether anything was removed.
    pub fn delete(&mut self, namespace: &str, key: &str) -> bool {
        self.remove_entry(namespace, key)
    }

    // == Clear ==
    /// Removes every entry in `namespace`. Returns the number removed.
    pub fn clear(&mut self, namespace: &str) -> usize {
        let removed = self
            .entries
            .remove(namespace)
            .map(|ns| ns.len())
            .unwrap_or(0);
        self.len -= removed;
        removed
    }

    // == Clean Expired ==
    /// Sweeps all namespaces and drops expired entries.
    ///
    /// Runs at most once per cleanup interval. Returns `None` when throttled,
    /// otherwise the number of entries removed.
    pub fn clean_expired(&mut self) -> Option<usize> {
        let now = self.clock.now_ms();
        let interval_ms = duration_ms(self.cleanup_interval);

        if let Some(last) = self.last_cleanup {
            if now.saturating_sub(last) < interval_ms {
                return None;
            }
        }

        let mut removed = 0;
        self.entries.retain(|_, ns| {
            let before = ns.len();
            ns.retain(|_, entry| !entry.is_expired(now));
            removed += before - ns.len();
            !ns.is_empty()
        });

        self.len -= removed;
        self.last_cleanup = Some(now);
        self.stats.record_expired(removed);
        self.stats.record_sweep(now);
        debug!(store = %self.stats.name, removed, remaining = self.len, "cache sweep");

        Some(removed)
    }

    // == Stats ==
    /// Returns a snapshot of the store's statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.size = self.len;
        stats.namespaces = self
            .entries
            .iter()
            .map(|(name, ns)| (name.clone(), ns.len()))
            .collect();
        stats
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of stored entries in one namespace.
    pub fn namespace_len(&self, namespace: &str) -> usize {
        self.entries.get(namespace).map(|ns| ns.len()).unwrap_or(0)
    }

    fn remove_entry(&mut self, namespace: &str, key: &str) -> bool {
        let Some(ns) = self.entries.get_mut(namespace) else {
            return false;
        };
        let removed = ns.remove(key).is_some();
        if ns.is_empty() {
            self.entries.remove(namespace);
        }
        if removed {
            self.len -= 1;
        }
        removed
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
