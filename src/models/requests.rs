//! Request DTOs for the catalog API
//!
//! Query-string parameters for the listing endpoints. Everything arrives as
//! text and is checked here so malformed input becomes a 400 with a JSON body.

use serde::Deserialize;

use crate::catalog::{PageQuery, SearchQuery, VideoOrder, DEFAULT_MAX_RESULTS};
use crate::error::{CatalogError, Result};

/// Query parameters for `GET /videos`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideosParams {
    pub max_results: Option<String>,
    pub page_token: Option<String>,
    pub playlist_id: Option<String>,
    pub order: Option<String>,
}

impl VideosParams {
    /// Converts the raw parameters into a validated page query.
    pub fn into_query(self) -> Result<PageQuery> {
        let order = match non_empty(self.order) {
            Some(raw) => raw.parse::<VideoOrder>()?,
            None => VideoOrder::default(),
        };

        let query = PageQuery {
            max_results: parse_max_results(self.max_results.as_deref())?,
            page_token: non_empty(self.page_token),
            playlist_id: non_empty(self.playlist_id),
            order,
        };
        query.validate()?;
        Ok(query)
    }
}

/// Query parameters for `GET /search`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub max_results: Option<String>,
    pub page_token: Option<String>,
}

impl SearchParams {
    /// Converts the raw parameters into a validated search query.
    pub fn into_query(self) -> Result<SearchQuery> {
        let Some(q) = self.q else {
            return Err(CatalogError::InvalidArgument(
                "query parameter 'q' is required".to_string(),
            ));
        };

        let query = SearchQuery::new(
            q,
            parse_max_results(self.max_results.as_deref())?,
            non_empty(self.page_token),
        );
        query.validate()?;
        Ok(query)
    }
}

/// Missing or empty means the default; anything else must be an integer.
fn parse_max_results(raw: Option<&str>) -> Result<u32> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_MAX_RESULTS),
        Some(value) => value.parse().map_err(|_| {
            CatalogError::InvalidArgument(format!(
                "maxResults must be an integer between 1 and 50 (got '{value}')"
            ))
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
