//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /channel` - Channel metadata
//! - `GET /playlists` - Channel playlists
//! - `GET /videos` - Paginated channel videos
//! - `GET /search` - Paginated search results
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//! - `DELETE /cache/:namespace` - Clear a cache namespace (opt-in)

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
