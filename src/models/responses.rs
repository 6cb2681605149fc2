//! Response DTOs for the catalog API
//!
//! Catalog payloads are served as-is; these cover the service endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Store name
    pub name: String,
    /// Entries currently stored
    pub size: usize,
    /// Entries per namespace
    pub namespaces: BTreeMap<String, usize>,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed after expiring
    pub expired: u64,
    /// Full sweeps performed
    pub sweeps: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Last full sweep in ISO 8601 format
    pub last_cleanup: Option<String>,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            name: stats.name,
            size: stats.size,
            namespaces: stats.namespaces,
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            sweeps: stats.sweeps,
            hit_rate,
            last_cleanup: stats.last_cleanup.map(|t| t.to_rfc3339()),
        }
    }
}

/// Response body for DELETE /cache/:namespace
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub namespace: String,
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(namespace: impl Into<String>, removed: usize) -> Self {
        Self {
            namespace: namespace.into(),
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
