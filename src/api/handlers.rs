//! API Handlers
//!
//! HTTP request handlers for each catalog endpoint. Successful catalog
//! responses carry a `Cache-Control` header sized to the data's TTL class.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::cache::CacheStore;
use crate::catalog::{CatalogAggregator, CatalogUpstream, YouTubeClient, NAMESPACES};
use crate::config::{Config, TtlPolicy};
use crate::error::{CatalogError, Result};
use crate::models::{
    ClearResponse, HealthResponse, SearchParams, StatsResponse, VideosParams,
};

// == Cache-Control Values ==
pub const CHANNEL_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=1800";
pub const PLAYLISTS_CACHE_CONTROL: &str = "public, s-maxage=1800, stale-while-revalidate=600";
pub const VIDEOS_CACHE_CONTROL: &str = "public, s-maxage=600, stale-while-revalidate=300";
pub const SEARCH_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=150";

/// Application state shared across all handlers.
///
/// The store is created once at startup and shared with the aggregator.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub cache: Arc<RwLock<CacheStore>>,
    /// Read-through catalog
    pub catalog: Arc<CatalogAggregator>,
}

impl AppState {
    /// Creates a new AppState around an existing store and upstream.
    pub fn new(cache: CacheStore, upstream: Arc<dyn CatalogUpstream>, ttl: TtlPolicy) -> Self {
        let cache = Arc::new(RwLock::new(cache));
        let catalog = Arc::new(CatalogAggregator::new(cache.clone(), upstream, ttl));
        Self { cache, catalog }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache store and the YouTube upstream client.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheStore::new("catalog", config.default_ttl())
            .with_cleanup(config.cleanup_interval(), config.cleanup_threshold);
        let upstream = Arc::new(YouTubeClient::from_config(config)?);
        Ok(Self::new(cache, upstream, config.ttl))
    }
}

/// Handler for GET /channel
pub async fn channel_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let channel = state
        .catalog
        .channel_info()
        .await?
        .ok_or_else(|| CatalogError::NotFound("Channel not found".to_string()))?;

    Ok(([(header::CACHE_CONTROL, CHANNEL_CACHE_CONTROL)], Json(channel)))
}

/// Handler for GET /playlists
pub async fn playlists_handler(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let playlists = state.catalog.channel_playlists().await?;

    Ok(([(header::CACHE_CONTROL, PLAYLISTS_CACHE_CONTROL)], Json(playlists)))
}

/// Handler for GET /videos
///
/// Query: `maxResults` (default 20), `pageToken`, `playlistId`, `order` (default `date`).
pub async fn videos_handler(
    State(state): State<AppState>,
    Query(params): Query<VideosParams>,
) -> Result<impl IntoResponse> {
    let query = params.into_query()?;
    let page = state.catalog.channel_videos(&query).await?;

    Ok(([(header::CACHE_CONTROL, VIDEOS_CACHE_CONTROL)], Json(page)))
}

/// Handler for GET /search
///
/// Query: `q` (required), `maxResults` (default 20), `pageToken`.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    let query = params.into_query()?;
    let page = state.catalog.search_videos(&query).await?;

    Ok(([(header::CACHE_CONTROL, SEARCH_CACHE_CONTROL)], Json(page)))
}

/// Handler for DELETE /cache/:namespace
pub async fn clear_namespace_handler(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
) -> Result<Json<ClearResponse>> {
    if !NAMESPACES.contains(&namespace.as_str()) {
        return Err(CatalogError::NotFound(format!(
            "Unknown cache namespace '{namespace}'"
        )));
    }

    let removed = state.catalog.invalidate(&namespace).await;
    Ok(Json(ClearResponse::new(namespace, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(StatsResponse::from(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
