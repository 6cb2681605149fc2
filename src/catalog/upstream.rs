//! Upstream catalog seam.

use async_trait::async_trait;

use crate::catalog::{ChannelInfo, PageQuery, PageResult, Playlist, SearchQuery};
use crate::error::Result;

/// Source of catalog data behind the cache.
///
/// Implementations perform one logical fetch per call and never cache.
/// Queries reach them already validated.
#[async_trait]
pub trait CatalogUpstream: Send + Sync {
    /// Channel metadata, `None` when the channel does not exist.
    async fn fetch_channel(&self) -> Result<Option<ChannelInfo>>;

    /// One page of the channel's videos, optionally restricted to a playlist.
    async fn fetch_videos(&self, query: &PageQuery) -> Result<PageResult>;

    /// All playlists of the channel, in upstream order.
    async fn fetch_playlists(&self) -> Result<Vec<Playlist>>;

    /// One page of search results within the channel.
    async fn search_videos(&self, query: &SearchQuery) -> Result<PageResult>;
}
