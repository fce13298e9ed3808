//! Process-local cache store

use crate::cache::traits::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory store with lazy expiry
///
/// Expired entries are dropped when they are next read or purged.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet read
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, MemoryEntry>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.lock()?;

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
            None => return Ok(None),
        }

        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn purge_expired(&self) -> CacheResult<usize> {
        let mut entries = self.lock()?;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        Ok(before - entries.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
