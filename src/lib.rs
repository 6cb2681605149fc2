//! Video Catalog Cache - read-through cache in front of a video catalog API
//!
//! Serves channel info, playlists, paginated video listings and search from a
//! namespaced TTL cache, fetching from the upstream catalog only on a miss.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
