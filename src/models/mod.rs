//! Request and Response models for the catalog API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query-string parsing and for the service endpoints' response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SearchParams, VideosParams};
pub use responses::{ClearResponse, ErrorResponse, HealthResponse, StatsResponse};
