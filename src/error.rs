//! Error types for the catalog service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Catalog Error Enum ==
/// Unified error type for the catalog service.
///
/// The cache never produces errors; everything here comes from input
/// validation or from the upstream catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Bad caller input, rejected before any upstream call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Valid request with nothing to return
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream catalog request failed
    #[error("Upstream {endpoint} request failed: {message}")]
    UpstreamUnavailable { endpoint: String, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Builds an upstream error for `endpoint`.
    pub fn upstream(endpoint: &str, message: impl Into<String>) -> Self {
        CatalogError::UpstreamUnavailable {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::UpstreamUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            CatalogError::InvalidArgument(msg) => msg.clone(),
            CatalogError::NotFound(msg) => msg.clone(),
            CatalogError::UpstreamUnavailable { .. } => self.to_string(),
            CatalogError::Internal(msg) => msg.clone(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the catalog service.
pub type Result<T> = std::result::Result<T, CatalogError>;
