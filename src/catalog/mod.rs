//! Catalog Module
//!
//! Channel, playlist, video listing and search queries against the upstream
//! video catalog, served through the cache.

mod aggregator;
mod query;
mod types;
mod upstream;
mod youtube;

pub use aggregator::{
    CatalogAggregator, NAMESPACES, NS_CHANNEL, NS_PLAYLISTS, NS_SEARCH, NS_VIDEOS,
};
pub use query::{
    PageQuery, SearchQuery, VideoOrder, DEFAULT_MAX_RESULTS, MAX_MAX_RESULTS, MIN_MAX_RESULTS,
};
pub use types::{ChannelInfo, PageResult, Playlist, Thumbnail, Thumbnails, Video};
pub use upstream::CatalogUpstream;
pub use youtube::YouTubeClient;
