//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::time::Duration;

/// Default upstream API root
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

// == TTL Policy ==
/// Cache lifetime per catalog operation, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub channel: u64,
    pub playlists: u64,
    pub videos: u64,
    pub search: u64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            channel: 3600,
            playlists: 1800,
            videos: 600,
            search: 300,
        }
    }
}

impl TtlPolicy {
    pub fn channel_ttl(&self) -> Duration {
        Duration::from_secs(self.channel)
    }

    pub fn playlists_ttl(&self) -> Duration {
        Duration::from_secs(self.playlists)
    }

    pub fn videos_ttl(&self) -> Duration {
        Duration::from_secs(self.videos)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search)
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// Upstream API key
    pub api_key: String,
    /// Channel whose catalog is served
    pub channel_id: String,
    /// Upstream API root URL
    pub upstream_base_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Default TTL in seconds for entries stored without one
    pub default_ttl: u64,
    /// Sweep throttle window and background task interval in seconds
    pub cleanup_interval: u64,
    /// Stored-entry count that triggers an early sweep
    pub cleanup_threshold: usize,
    /// Per-operation TTL classes
    pub ttl: TtlPolicy,
    /// Whether the namespace purge endpoint is routed
    pub cache_admin_enabled: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("server_port", &self.server_port)
            .field("default_ttl", &self.default_ttl)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("cleanup_threshold", &self.cleanup_threshold)
            .field("ttl", &self.ttl)
            .field("cache_admin_enabled", &self.cache_admin_enabled)
            .finish()
    }
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `YOUTUBE_API_KEY` - Upstream API key (required)
    /// - `YOUTUBE_CHANNEL_ID` - Channel to serve (required)
    /// - `UPSTREAM_BASE_URL` - Upstream API root (default: YouTube Data API v3)
    /// - `UPSTREAM_TIMEOUT` - Upstream request timeout in seconds (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep interval in seconds (default: 300)
    /// - `CLEANUP_THRESHOLD` - Entry count for early sweeps (default: 100)
    /// - `CHANNEL_TTL`, `PLAYLISTS_TTL`, `VIDEOS_TTL`, `SEARCH_TTL` - Per-operation
    ///   TTLs in seconds (default: 3600, 1800, 600, 300)
    /// - `CACHE_ADMIN_ENABLED` - Route `DELETE /cache/:namespace` (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env::var("YOUTUBE_API_KEY").unwrap_or_default(),
            channel_id: env::var("YOUTUBE_CHANNEL_ID").unwrap_or_default(),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or(defaults.upstream_base_url),
            upstream_timeout: parse_env("UPSTREAM_TIMEOUT").unwrap_or(defaults.upstream_timeout),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl: parse_env("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cleanup_threshold: parse_env("CLEANUP_THRESHOLD")
                .unwrap_or(defaults.cleanup_threshold),
            ttl: TtlPolicy {
                channel: parse_env("CHANNEL_TTL").unwrap_or(defaults.ttl.channel),
                playlists: parse_env("PLAYLISTS_TTL").unwrap_or(defaults.ttl.playlists),
                videos: parse_env("VIDEOS_TTL").unwrap_or(defaults.ttl.videos),
                search: parse_env("SEARCH_TTL").unwrap_or(defaults.ttl.search),
            },
            cache_admin_enabled: parse_env("CACHE_ADMIN_ENABLED")
                .unwrap_or(defaults.cache_admin_enabled),
        }
    }

    /// Checks required values.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.api_key.trim().is_empty() {
            return Some("YOUTUBE_API_KEY must be set".to_string());
        }
        if self.channel_id.trim().is_empty() {
            return Some("YOUTUBE_CHANNEL_ID must be set".to_string());
        }
        if self.upstream_timeout == 0 {
            return Some("UPSTREAM_TIMEOUT must be greater than zero".to_string());
        }
        None
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            channel_id: String::new(),
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            upstream_timeout: 10,
            server_port: 3000,
            default_ttl: 300,
            cleanup_interval: 300,
            cleanup_threshold: 100,
            ttl: TtlPolicy::default(),
            cache_admin_enabled: false,
        }
    }
}
