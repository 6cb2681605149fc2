//! Cache Module
//!
//! Namespaced in-memory caching with TTL expiration and throttled sweeping.

use std::time::Duration;

mod clock;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Minimum time between two full sweeps
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Stored-entry count above which writes attempt an early sweep
pub const DEFAULT_CLEANUP_THRESHOLD: usize = 100;
