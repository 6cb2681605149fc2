//! API Routes
//!
//! Configures the Axum router with all catalog endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    channel_handler, clear_namespace_handler, health_handler, playlists_handler, search_handler,
    stats_handler, videos_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /channel` - Channel metadata
/// - `GET /playlists` - Channel playlists
/// - `GET /videos` - One page of channel videos
/// - `GET /search` - One page of search results
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
/// - `DELETE /cache/:namespace` - Clear a cache namespace (only with `cache_admin`)
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState, cache_admin: bool) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/channel", get(channel_handler))
        .route("/playlists", get(playlists_handler))
        .route("/videos", get(videos_handler))
        .route("/search", get(search_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    if cache_admin {
        router = router.route("/cache/:namespace", delete(clear_namespace_handler));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
