//! Review cache
//!
//! This module keeps moderated review lists so that repeated requests for the
//! same business do not trigger another paid scraper run:
//! - Keys are `source:identifier`, with the identifier used verbatim
//! - Values are whole JSON-encoded review lists, replaced on every write
//! - Entries expire after a fixed TTL, checked lazily on read
//!
//! Caching is an optimization only. A store that fails on read is treated as a
//! miss, and a failed write is logged and ignored.

mod memory;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{CacheError, CacheResult, CacheStore};

use crate::config::{CacheBackend, CacheConfig};
use crate::review::{Review, Source};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Builds the store selected by the configuration
pub fn open_store(config: &CacheConfig) -> CacheResult<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        CacheBackend::Sqlite => {
            let path = config.path.as_deref().ok_or_else(|| {
                CacheError::Unavailable("sqlite cache backend requires a path".to_string())
            })?;
            Ok(Arc::new(SqliteStore::new(Path::new(path))?))
        }
    }
}

/// Review lists keyed by source and external identifier
#[derive(Clone)]
pub struct ReviewCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ReviewCache {
    /// Creates a cache over an existing store
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Opens the configured store and wraps it
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        let store = open_store(config)?;
        tracing::info!(
            "Using {} review cache (ttl {}s)",
            store.name(),
            config.ttl_seconds
        );
        Ok(Self::new(store, Duration::from_secs(config.ttl_seconds)))
    }

    /// Derives the cache key for a source and identifier
    ///
    /// The identifier is not normalized: two spellings of the same page URL
    /// are two different entries.
    pub fn key(source: Source, id: &str) -> String {
        format!("{}:{}", source, id)
    }

    /// Returns the cached reviews, or `None` on a miss
    ///
    /// Expired entries, store failures, and undecodable values are all misses.
    pub async fn get(&self, source: Source, id: &str) -> Option<Vec<Review>> {
        let key = Self::key(source, id);

        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(reviews) => {
                tracing::debug!("Cache hit for {}", key);
                Some(reviews)
            }
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// Stores reviews, replacing any previous entry and restarting its TTL
    pub async fn set(&self, source: Source, id: &str, reviews: &[Review]) {
        let key = Self::key(source, id);

        let result = match serde_json::to_string(reviews) {
            Ok(raw) => self.store.set(&key, &raw, self.ttl).await,
            Err(e) => Err(CacheError::from(e)),
        };

        match result {
            Ok(()) => tracing::debug!("Cached {} reviews under {}", reviews.len(), key),
            Err(e) => tracing::warn!("Cache write failed for {}: {}", key, e),
        }
    }

    /// Removes an entry immediately
    pub async fn invalidate(&self, source: Source, id: &str) -> CacheResult<()> {
        let key = Self::key(source, id);
        self.store.del(&key).await?;
        tracing::info!("Invalidated cache entry {}", key);
        Ok(())
    }

    /// Reclaims space held by expired entries
    pub async fn purge_expired(&self) -> CacheResult<usize> {
        let removed = self.store.purge_expired().await?;
        if removed > 0 {
            tracing::info!("Purged {} expired cache entries", removed);
        }
        Ok(removed)
    }
}
