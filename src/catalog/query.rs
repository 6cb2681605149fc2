//! Pagination and search queries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

pub const MIN_MAX_RESULTS: u32 = 1;
pub const MAX_MAX_RESULTS: u32 = 50;
pub const DEFAULT_MAX_RESULTS: u32 = 20;

// == Video Order ==
/// Sort order accepted by the upstream listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VideoOrder {
    #[default]
    Date,
    Relevance,
    ViewCount,
    Rating,
}

impl VideoOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoOrder::Date => "date",
            VideoOrder::Relevance => "relevance",
            VideoOrder::ViewCount => "viewCount",
            VideoOrder::Rating => "rating",
        }
    }
}

impl fmt::Display for VideoOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date" => Ok(VideoOrder::Date),
            "relevance" => Ok(VideoOrder::Relevance),
            "viewCount" => Ok(VideoOrder::ViewCount),
            "rating" => Ok(VideoOrder::Rating),
            other => Err(CatalogError::InvalidArgument(format!(
                "order must be one of date, relevance, viewCount, rating (got '{other}')"
            ))),
        }
    }
}

fn validate_max_results(max_results: u32) -> Result<()> {
    if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&max_results) {
        return Err(CatalogError::InvalidArgument(format!(
            "maxResults must be between {MIN_MAX_RESULTS} and {MAX_MAX_RESULTS}"
        )));
    }
    Ok(())
}

// == Page Query ==
/// A request for one page of channel videos.
///
/// `page_token: None` always means the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub max_results: u32,
    pub page_token: Option<String>,
    pub playlist_id: Option<String>,
    pub order: VideoOrder,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            page_token: None,
            playlist_id: None,
            order: VideoOrder::Date,
        }
    }
}

impl PageQuery {
    pub fn with_max_results(max_results: u32) -> Self {
        Self {
            max_results,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_results(self.max_results)
    }

    /// Cache key covering every field that changes the upstream answer.
    ///
    /// Free-form fields are written in quoted form so two different queries
    /// can never render to the same key.
    pub fn cache_key(&self) -> String {
        format!(
            "list:playlist={:?}:order={}:max={}:page={:?}",
            self.playlist_id, self.order, self.max_results, self.page_token
        )
    }
}

// == Search Query ==
/// A free-text search over the channel's videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: u32,
    pub page_token: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, max_results: u32, page_token: Option<String>) -> Self {
        Self {
            query: query.into(),
            max_results,
            page_token,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }
        validate_max_results(self.max_results)
    }

    pub fn cache_key(&self) -> String {
        format!(
            "search:q={:?}:max={}:page={:?}",
            self.query, self.max_results, self.page_token
        )
    }
}
