//! YouTube Data API v3 upstream.
//!
//! Listing endpoints (`search`, `playlistItems`) only carry snippets, so every
//! listed page is enriched with one `videos` lookup for statistics and
//! duration. Page tokens go out and come back untouched.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::catalog::{
    CatalogUpstream, ChannelInfo, PageQuery, PageResult, Playlist, SearchQuery, Thumbnails, Video,
};
use crate::config::Config;
use crate::error::{CatalogError, Result};

/// Upper bound on playlist pages followed for one channel.
const MAX_PLAYLIST_PAGES: usize = 10;
/// Page size the playlists endpoint accepts at most.
const PLAYLIST_PAGE_SIZE: u32 = 50;

// == Wire Types ==
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
    next_page_token: Option<String>,
    prev_page_token: Option<String>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    total_results: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    channel_id: Option<String>,
    channel_title: Option<String>,
    custom_url: Option<String>,
    #[serde(default)]
    thumbnails: Thumbnails,
    resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ResourceId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    #[serde(default)]
    snippet: Snippet,
    content_details: Option<ResourceId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    snippet: Option<Snippet>,
    statistics: Option<Statistics>,
    content_details: Option<VideoDetails>,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
    subscriber_count: Option<String>,
    video_count: Option<String>,
    #[serde(default)]
    hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistResource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    content_details: Option<PlaylistDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistDetails {
    item_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// == Conversions ==
fn parse_count(raw: &Option<String>) -> Option<u64> {
    raw.as_deref().and_then(|v| v.parse().ok())
}

fn channel_from_resource(resource: ChannelResource) -> ChannelInfo {
    let stats = resource.statistics.unwrap_or_default();
    let subscriber_count = if stats.hidden_subscriber_count {
        None
    } else {
        parse_count(&stats.subscriber_count)
    };

    ChannelInfo {
        id: resource.id,
        title: resource.snippet.title,
        description: resource.snippet.description,
        custom_url: resource.snippet.custom_url,
        published_at: resource.snippet.published_at,
        thumbnails: resource.snippet.thumbnails,
        subscriber_count,
        video_count: parse_count(&stats.video_count),
        view_count: parse_count(&stats.view_count),
    }
}

fn playlist_from_resource(resource: PlaylistResource) -> Playlist {
    Playlist {
        id: resource.id,
        title: resource.snippet.title,
        description: resource.snippet.description,
        published_at: resource.snippet.published_at,
        thumbnails: resource.snippet.thumbnails,
        item_count: resource.content_details.and_then(|d| d.item_count),
    }
}

fn listed_from_search(items: Vec<SearchItem>) -> Vec<(String, Snippet)> {
    items
        .into_iter()
        .filter_map(|item| item.id.video_id.map(|id| (id, item.snippet)))
        .collect()
}

fn listed_from_playlist(items: Vec<PlaylistItem>) -> Vec<(String, Snippet)> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item
                .content_details
                .and_then(|d| d.video_id)
                .or_else(|| item.snippet.resource_id.clone().and_then(|r| r.video_id))?;
            Some((id, item.snippet))
        })
        .collect()
}

/// Joins listed videos with their detail records.
///
/// Listing order is kept. Videos the detail lookup did not return (private or
/// deleted) are dropped.
fn merge_details(listed: Vec<(String, Snippet)>, details: Vec<VideoResource>) -> Vec<Video> {
    let mut by_id: HashMap<String, VideoResource> =
        details.into_iter().map(|d| (d.id.clone(), d)).collect();

    listed
        .into_iter()
        .filter_map(|(id, listing)| {
            let detail = by_id.remove(&id)?;
            let snippet = detail.snippet.unwrap_or(listing);
            let stats = detail.statistics.unwrap_or_default();

            Some(Video {
                id,
                title: snippet.title,
                description: snippet.description,
                published_at: snippet.published_at,
                channel_id: snippet.channel_id,
                channel_title: snippet.channel_title,
                thumbnails: snippet.thumbnails,
                view_count: parse_count(&stats.view_count),
                like_count: parse_count(&stats.like_count),
                comment_count: parse_count(&stats.comment_count),
                duration: detail.content_details.and_then(|d| d.duration),
            })
        })
        .collect()
}

// == YouTube Client ==
/// Client for the YouTube Data API, scoped to one channel.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    api_key: String,
    channel_id: String,
}

impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base_url", &self.base_url)
            .field("channel_id", &self.channel_id)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl YouTubeClient {
    /// Creates a client whose requests each time out after `timeout`.
    pub fn new(
        api_key: impl Into<String>,
        channel_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            channel_id: channel_id.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.channel_id.clone(),
            config.upstream_base_url.clone(),
            config.upstream_timeout(),
        )
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Issues one GET and decodes the JSON body.
    ///
    /// Transport errors are stripped of their URL, which carries the API key.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(self.endpoint_url(endpoint))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::upstream(endpoint, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message);
            let message = match detail {
                Some(detail) => format!("HTTP {status}: {detail}"),
                None => format!("HTTP {status}"),
            };
            return Err(CatalogError::upstream(endpoint, message));
        }

        response.json::<T>().await.map_err(|e| {
            CatalogError::upstream(endpoint, format!("invalid response body: {}", e.without_url()))
        })
    }

    async fn enrich(&self, listed: Vec<(String, Snippet)>) -> Result<Vec<Video>> {
        if listed.is_empty() {
            return Ok(Vec::new());
        }

        let ids = listed
            .iter()
            .map(|(id, _)| id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let params = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", ids),
        ];
        let details: ListResponse<VideoResource> = self.get_json("videos", &params).await?;

        Ok(merge_details(listed, details.items))
    }

    async fn listing_page<T>(
        &self,
        page: ListResponse<T>,
        listed: fn(Vec<T>) -> Vec<(String, Snippet)>,
    ) -> Result<PageResult> {
        let total_results = page.page_info.and_then(|p| p.total_results);
        let items = self.enrich(listed(page.items)).await?;

        Ok(PageResult {
            items,
            next_page_token: page.next_page_token,
            prev_page_token: page.prev_page_token,
            total_results,
        })
    }
}

fn push_page_token(params: &mut Vec<(&str, String)>, token: &Option<String>) {
    if let Some(token) = token {
        params.push(("pageToken", token.clone()));
    }
}

#[async_trait]
impl CatalogUpstream for YouTubeClient {
    async fn fetch_channel(&self) -> Result<Option<ChannelInfo>> {
        let params = [
            ("part", "snippet,statistics".to_string()),
            ("id", self.channel_id.clone()),
        ];
        let response: ListResponse<ChannelResource> = self.get_json("channels", &params).await?;

        Ok(response.items.into_iter().next().map(channel_from_resource))
    }

    async fn fetch_videos(&self, query: &PageQuery) -> Result<PageResult> {
        let mut params = vec![("maxResults", query.max_results.to_string())];
        push_page_token(&mut params, &query.page_token);

        match &query.playlist_id {
            Some(playlist_id) => {
                params.push(("part", "snippet,contentDetails".to_string()));
                params.push(("playlistId", playlist_id.clone()));
                let page: ListResponse<PlaylistItem> =
                    self.get_json("playlistItems", &params).await?;
                self.listing_page(page, listed_from_playlist).await
            }
            None => {
                params.push(("part", "snippet".to_string()));
                params.push(("channelId", self.channel_id.clone()));
                params.push(("type", "video".to_string()));
                params.push(("order", query.order.to_string()));
                let page: ListResponse<SearchItem> = self.get_json("search", &params).await?;
                self.listing_page(page, listed_from_search).await
            }
        }
    }

    async fn fetch_playlists(&self) -> Result<Vec<Playlist>> {
        let mut playlists = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PLAYLIST_PAGES {
            let mut params = vec![
                ("part", "snippet,contentDetails".to_string()),
                ("channelId", self.channel_id.clone()),
                ("maxResults", PLAYLIST_PAGE_SIZE.to_string()),
            ];
            push_page_token(&mut params, &page_token);

            let page: ListResponse<PlaylistResource> = self.get_json("playlists", &params).await?;
            playlists.extend(page.items.into_iter().map(playlist_from_resource));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(playlists),
            }
        }

        debug!(
            count = playlists.len(),
            "playlist listing truncated after {MAX_PLAYLIST_PAGES} pages"
        );
        Ok(playlists)
    }

    async fn search_videos(&self, query: &SearchQuery) -> Result<PageResult> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("channelId", self.channel_id.clone()),
            ("type", "video".to_string()),
            ("q", query.query.clone()),
            ("maxResults", query.max_results.to_string()),
        ];
        push_page_token(&mut params, &query.page_token);

        let page: ListResponse<SearchItem> = self.get_json("search", &params).await?;
        self.listing_page(page, listed_from_search).await
    }
}
