//! Read-through aggregation over the upstream catalog.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::catalog::{CatalogUpstream, ChannelInfo, PageQuery, PageResult, Playlist, SearchQuery};
use crate::config::TtlPolicy;
use crate::error::Result;

// == Namespaces ==
pub const NS_CHANNEL: &str = "channel";
pub const NS_PLAYLISTS: &str = "playlists";
pub const NS_VIDEOS: &str = "videos";
pub const NS_SEARCH: &str = "search";

/// Every namespace the aggregator writes to.
pub const NAMESPACES: [&str; 4] = [NS_CHANNEL, NS_PLAYLISTS, NS_VIDEOS, NS_SEARCH];

const CHANNEL_KEY: &str = "info";
const PLAYLISTS_KEY: &str = "all";

// == Catalog Aggregator ==
/// Serves catalog queries from the cache, falling back to the upstream on a miss.
///
/// Each operation validates its input first, then reads the cache. On a miss
/// it calls the upstream once, stores the result under the operation's TTL
/// class and returns it. Failed fetches leave the cache untouched.
///
/// The cache lock is never held across an upstream call. Two callers missing
/// the same key at once both fetch; the later write wins.
pub struct CatalogAggregator {
    cache: Arc<RwLock<CacheStore>>,
    upstream: Arc<dyn CatalogUpstream>,
    ttl: TtlPolicy,
}

impl CatalogAggregator {
    pub fn new(
        cache: Arc<RwLock<CacheStore>>,
        upstream: Arc<dyn CatalogUpstream>,
        ttl: TtlPolicy,
    ) -> Self {
        Self {
            cache,
            upstream,
            ttl,
        }
    }

    /// Channel metadata, `None` if the upstream has no such channel.
    pub async fn channel_info(&self) -> Result<Option<ChannelInfo>> {
        if let Some(cached) = self.cached(NS_CHANNEL, CHANNEL_KEY).await {
            return Ok(cached);
        }

        let channel = self.upstream.fetch_channel().await.map_err(|e| {
            warn!(endpoint = "channel", error = %e, "upstream fetch failed");
            e
        })?;

        self.store(NS_CHANNEL, CHANNEL_KEY, &channel, self.ttl.channel_ttl())
            .await;
        Ok(channel)
    }

    /// One page of channel videos.
    pub async fn channel_videos(&self, query: &PageQuery) -> Result<PageResult> {
        query.validate()?;

        let key = query.cache_key();
        if let Some(cached) = self.cached(NS_VIDEOS, &key).await {
            return Ok(cached);
        }

        let page = self.upstream.fetch_videos(query).await.map_err(|e| {
            warn!(
                endpoint = "videos",
                max_results = query.max_results,
                order = %query.order,
                has_playlist = query.playlist_id.is_some(),
                has_page_token = query.page_token.is_some(),
                error = %e,
                "upstream fetch failed"
            );
            e
        })?;

        self.store(NS_VIDEOS, &key, &page, self.ttl.videos_ttl()).await;
        Ok(page)
    }

    /// All playlists of the channel; empty if it has none.
    pub async fn channel_playlists(&self) -> Result<Vec<Playlist>> {
        if let Some(cached) = self.cached(NS_PLAYLISTS, PLAYLISTS_KEY).await {
            return Ok(cached);
        }

        let playlists = self.upstream.fetch_playlists().await.map_err(|e| {
            warn!(endpoint = "playlists", error = %e, "upstream fetch failed");
            e
        })?;

        self.store(NS_PLAYLISTS, PLAYLISTS_KEY, &playlists, self.ttl.playlists_ttl())
            .await;
        Ok(playlists)
    }

    /// One page of search results for a non-empty query.
    pub async fn search_videos(&self, query: &SearchQuery) -> Result<PageResult> {
        query.validate()?;

        let key = query.cache_key();
        if let Some(cached) = self.cached(NS_SEARCH, &key).await {
            return Ok(cached);
        }

        let page = self.upstream.search_videos(query).await.map_err(|e| {
            warn!(
                endpoint = "search",
                max_results = query.max_results,
                query_len = query.query.len(),
                has_page_token = query.page_token.is_some(),
                error = %e,
                "upstream fetch failed"
            );
            e
        })?;

        self.store(NS_SEARCH, &key, &page, self.ttl.search_ttl()).await;
        Ok(page)
    }

    /// Drops every cached entry in `namespace`. Returns the number removed.
    pub async fn invalidate(&self, namespace: &str) -> usize {
        let removed = self.cache.write().await.clear(namespace);
        debug!(namespace, removed, "cache namespace cleared");
        removed
    }

    /// Reads and decodes a cached value. Undecodable entries are dropped and
    /// treated as a miss.
    async fn cached<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<T> {
        let mut cache = self.cache.write().await;
        let Some(bytes) = cache.get(namespace, key) else {
            debug!(namespace, "cache miss");
            return None;
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(namespace, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(namespace, error = %e, "discarding undecodable cache entry");
                cache.delete(namespace, key);
                None
            }
        }
    }

    async fn store<T: Serialize>(&self, namespace: &str, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.cache.write().await.set(namespace, key, bytes, Some(ttl)),
            Err(e) => warn!(namespace, error = %e, "failed to encode value for cache"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::catalog::{Video, VideoOrder};
    use crate::error::CatalogError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Barrier;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct FakeUpstream {
        calls: AtomicUsize,
        fail: AtomicBool,
        no_channel: bool,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl FakeUpstream {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn begin(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CatalogError::upstream("fake", "HTTP 503"));
            }
            Ok(())
        }
    }

    fn video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("Video {id}"),
            description: String::new(),
            published_at: None,
            channel_id: Some("UC1".to_string()),
            channel_title: None,
            thumbnails: Default::default(),
            view_count: Some(1),
            like_count: None,
            comment_count: None,
            duration: None,
        }
    }

    #[async_trait]
    impl CatalogUpstream for FakeUpstream {
        async fn fetch_channel(&self) -> Result<Option<ChannelInfo>> {
            self.begin()?;
            if self.no_channel {
                return Ok(None);
            }
            Ok(Some(ChannelInfo {
                id: "UC1".to_string(),
                title: "Studio".to_string(),
                description: String::new(),
                custom_url: None,
                published_at: None,
                thumbnails: Default::default(),
                subscriber_count: Some(10),
                video_count: Some(2),
                view_count: Some(100),
            }))
        }

        async fn fetch_videos(&self, query: &PageQuery) -> Result<PageResult> {
            self.begin()?;
            self.seen_tokens.lock().unwrap().push(query.page_token.clone());
            Ok(PageResult {
                items: vec![video("a"), video("b")],
                next_page_token: Some("NEXT/+=token".to_string()),
                prev_page_token: query.page_token.clone(),
                total_results: Some(2),
            })
        }

        async fn fetch_playlists(&self) -> Result<Vec<Playlist>> {
            self.begin()?;
            Ok(Vec::new())
        }

        async fn search_videos(&self, query: &SearchQuery) -> Result<PageResult> {
            self.begin()?;
            Ok(PageResult {
                items: vec![video(&query.query)],
                ..PageResult::default()
            })
        }
    }

    /// Holds every search inside the upstream until two are in flight.
    struct GatedUpstream {
        gate: Barrier,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogUpstream for GatedUpstream {
        async fn fetch_channel(&self) -> Result<Option<ChannelInfo>> {
            Ok(None)
        }

        async fn fetch_videos(&self, _query: &PageQuery) -> Result<PageResult> {
            Ok(PageResult::default())
        }

        async fn fetch_playlists(&self) -> Result<Vec<Playlist>> {
            Ok(Vec::new())
        }

        async fn search_videos(&self, query: &SearchQuery) -> Result<PageResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.wait().await;
            Ok(PageResult {
                items: vec![video(&query.query)],
                ..PageResult::default()
            })
        }
    }

    fn aggregator_with(upstream: Arc<FakeUpstream>) -> (CatalogAggregator, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = CacheStore::new("test", Duration::from_secs(300))
            .with_clock(Arc::new(clock.clone()));
        let aggregator = CatalogAggregator::new(
            Arc::new(RwLock::new(store)),
            upstream,
            TtlPolicy::default(),
        );
        (aggregator, clock)
    }

    #[tokio::test]
    async fn test_videos_max_results_bounds() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        let too_small = aggregator.channel_videos(&PageQuery::with_max_results(0)).await;
        assert!(matches!(too_small, Err(CatalogError::InvalidArgument(_))));

        let too_large = aggregator.channel_videos(&PageQuery::with_max_results(51)).await;
        assert!(matches!(too_large, Err(CatalogError::InvalidArgument(_))));
        assert_eq!(upstream.calls(), 0);

        assert_ok!(aggregator.channel_videos(&PageQuery::with_max_results(20)).await);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_videos_cache_hit_skips_upstream() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());
        let query = PageQuery::default();

        let first = aggregator.channel_videos(&query).await.unwrap();
        let second = aggregator.channel_videos(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_distinct_query_shapes_do_not_collide() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        let base = PageQuery::default();
        let by_views = PageQuery {
            order: VideoOrder::ViewCount,
            ..base.clone()
        };
        let in_playlist = PageQuery {
            playlist_id: Some("PL1".to_string()),
            ..base.clone()
        };

        for query in [&base, &by_views, &in_playlist] {
            aggregator.channel_videos(query).await.unwrap();
        }
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test]
    async fn test_page_token_forwarded_unmodified() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        let first = aggregator.channel_videos(&PageQuery::default()).await.unwrap();
        let token = first.next_page_token.clone().unwrap();
        assert_eq!(token, "NEXT/+=token");

        let next = PageQuery {
            page_token: Some(token.clone()),
            ..PageQuery::default()
        };
        let second = aggregator.channel_videos(&next).await.unwrap();

        let seen = upstream.seen_tokens.lock().unwrap().clone();
        assert_eq!(seen, vec![None, Some(token.clone())]);
        assert_eq!(second.prev_page_token, Some(token));
    }

    #[tokio::test]
    async fn test_search_twice_calls_upstream_once() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());
        let query = SearchQuery::new("flutter", 20, None);

        let first = aggregator.search_videos(&query).await.unwrap();
        let second = aggregator.search_videos(&query).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.items[0].id, "flutter");
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_search_refetches_after_ttl() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, clock) = aggregator_with(upstream.clone());
        let query = SearchQuery::new("flutter", 20, None);

        aggregator.search_videos(&query).await.unwrap();
        clock.advance_secs(TtlPolicy::default().search);
        aggregator.search_videos(&query).await.unwrap();

        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        let result = aggregator.search_videos(&SearchQuery::new("", 20, None)).await;
        assert!(matches!(result, Err(CatalogError::InvalidArgument(_))));
        assert_eq!(upstream.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_channel_is_none() {
        let upstream = Arc::new(FakeUpstream {
            no_channel: true,
            ..FakeUpstream::default()
        });
        let (aggregator, _) = aggregator_with(upstream.clone());

        assert_eq!(aggregator.channel_info().await.unwrap(), None);
        assert_eq!(aggregator.channel_info().await.unwrap(), None);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_channel_info_cached_for_channel_ttl() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, clock) = aggregator_with(upstream.clone());

        let channel = aggregator.channel_info().await.unwrap().unwrap();
        assert_eq!(channel.title, "Studio");

        clock.advance_secs(TtlPolicy::default().channel - 1);
        aggregator.channel_info().await.unwrap();
        assert_eq!(upstream.calls(), 1);

        clock.advance_secs(1);
        aggregator.channel_info().await.unwrap();
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_playlists_is_ok() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        let playlists = assert_ok!(aggregator.channel_playlists().await);
        assert!(playlists.is_empty());
        aggregator.channel_playlists().await.unwrap();
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_errors_are_not_cached() {
        let upstream = Arc::new(FakeUpstream::default());
        upstream.fail.store(true, Ordering::SeqCst);
        let (aggregator, _) = aggregator_with(upstream.clone());

        let err = assert_err!(aggregator.channel_playlists().await);
        assert!(matches!(err, CatalogError::UpstreamUnavailable { .. }));
        assert!(aggregator.cache.read().await.is_empty());

        upstream.fail.store(false, Ordering::SeqCst);
        assert_ok!(aggregator.channel_playlists().await);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());
        let query = SearchQuery::new("rust", 10, None);

        aggregator.search_videos(&query).await.unwrap();
        aggregator.channel_playlists().await.unwrap();

        assert_eq!(aggregator.invalidate(NS_SEARCH).await, 1);
        aggregator.search_videos(&query).await.unwrap();
        aggregator.channel_playlists().await.unwrap();

        // search refetched, playlists still cached
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let upstream = Arc::new(FakeUpstream::default());
        let (aggregator, _) = aggregator_with(upstream.clone());

        aggregator
            .cache
            .write()
            .await
            .set(NS_PLAYLISTS, PLAYLISTS_KEY, b"not json".to_vec(), None);

        assert_ok!(aggregator.channel_playlists().await);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_reach_upstream() {
        let upstream = Arc::new(GatedUpstream {
            gate: Barrier::new(2),
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(RwLock::new(CacheStore::new("test", Duration::from_secs(300))));
        let aggregator = CatalogAggregator::new(cache.clone(), upstream.clone(), TtlPolicy::default());
        let query = SearchQuery::new("flutter", 10, None);

        // Each search parks in the upstream until the other arrives, so this
        // only completes if neither holds the cache lock while fetching.
        let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(aggregator.search_videos(&query), aggregator.search_videos(&query))
        })
        .await
        .expect("concurrent searches should not block each other");

        assert_eq!(assert_ok!(first).items[0].id, "flutter");
        assert_eq!(assert_ok!(second).items[0].id, "flutter");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.read().await.namespace_len(NS_SEARCH), 1);
    }
}
