//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired cache entries, so
//! namespaces nobody reads any more still get emptied.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that calls the store's throttled sweep on a fixed
/// interval.
///
/// The write lock is held only for the sweep itself. When the store's own
/// throttle window has not elapsed (a size-triggered sweep ran recently) the
/// tick is skipped.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new("catalog", Duration::from_secs(300))));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.clean_expired();

            match removed {
                Some(0) => debug!("TTL cleanup: no expired entries found"),
                Some(count) => info!("TTL cleanup: removed {} expired entries", count),
                None => debug!("TTL cleanup: skipped, swept recently"),
            }
        }
    })
}
