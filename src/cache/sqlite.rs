//! SQLite cache store
//!
//! A file-backed store lets several harvester processes share cached scraper
//! results. Expiry is checked on read; `purge_expired` reclaims space.

use crate::cache::traits::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS review_cache (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_review_cache_expires ON review_cache(expires_at);
";

/// SQLite-backed key-value store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates a cache database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        Self::with_connection(conn)
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> CacheResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> CacheResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> CacheResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Unavailable("sqlite store lock poisoned".to_string()))
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl CacheStore for SqliteStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM review_cache WHERE key = ?1 AND expires_at > ?2",
                params![key, now_millis()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now_millis().saturating_add(ttl_millis);

        self.lock()?.execute(
            "INSERT INTO review_cache (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
            params![key, value, expires_at],
        )?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        self.lock()?
            .execute("DELETE FROM review_cache WHERE key = ?1", params![key])?;
        Ok(())
    }

    async fn purge_expired(&self) -> CacheResult<usize> {
        let removed = self.lock()?.execute(
            "DELETE FROM review_cache WHERE expires_at <= ?1",
            params![now_millis()],
        )?;
        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
