//! Cache store trait and error types
//!
//! A store is a plain string key-value map with per-entry expiry. The review
//! cache layers key derivation and JSON encoding on top of it.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during cache store operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for cache store operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for key-value stores backing the review cache
///
/// Implementations serialize access themselves; callers hold no lock around
/// these calls. Expired entries must read as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value for `key`, or `None` if missing or expired
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value and expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removes `key` if present
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Drops every expired entry, returning how many were removed
    async fn purge_expired(&self) -> CacheResult<usize>;

    /// Human-readable backend name for logging
    fn name(&self) -> &'static str;
}
