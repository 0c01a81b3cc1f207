/*!
 * SQLite-backed translation cache.
 *
 * `SqliteCache` stores one row per fingerprint and survives restarts, so a
 * sentence translated in one run is served from disk in the next.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{OptionalExtension, params};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::connection::DatabaseConnection;
use super::schema::{self, DEFAULT_CACHE_TABLE};
use crate::errors::CacheError;
use crate::translation::cache::{CacheEntry, CacheStats, CacheStore, fingerprint, truncate_text};

/// Cache store persisted in a SQLite table
#[derive(Debug, Clone)]
pub struct SqliteCache {
    /// Database connection
    db: DatabaseConnection,
    /// Validated cache table name
    table: Arc<str>,
    /// Lookups that found nothing since this handle was created
    misses: Arc<AtomicUsize>,
}

impl SqliteCache {
    /// Open a cache over the given table, creating it if needed
    pub fn new(db: DatabaseConnection, table: &str) -> Result<Self> {
        db.execute(|conn| schema::ensure_cache_table(conn, table))?;

        Ok(Self {
            db,
            table: Arc::from(table),
            misses: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Create a cache in an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Self::new(DatabaseConnection::new_in_memory()?, DEFAULT_CACHE_TABLE)
    }

    /// Entry count and total hits stored in the table
    pub async fn stats(&self) -> Result<CacheStats> {
        let table = self.table.clone();
        let (entries, hits) = self
            .db
            .execute_async(move |conn| {
                let row: (i64, i64) = conn.query_row(
                    &format!("SELECT COUNT(*), COALESCE(SUM(hit_count), 0) FROM {}", table),
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok(row)
            })
            .await?;

        Ok(CacheStats {
            hits: hits.max(0) as usize,
            misses: self.misses.load(Ordering::SeqCst),
            entries: entries.max(0) as usize,
        })
    }

    /// Delete every cached translation, returning the number removed
    pub async fn clear(&self) -> Result<usize> {
        let table = self.table.clone();
        let deleted = self
            .db
            .execute_async(move |conn| Ok(conn.execute(&format!("DELETE FROM {}", table), [])?))
            .await?;

        self.misses.store(0, Ordering::SeqCst);
        debug!("Cleared {} cached translations from {}", deleted, self.table);
        Ok(deleted)
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let table = self.table.clone();
        let key = key.to_string();

        let found = self
            .db
            .execute_async(move |conn| {
                let entry = conn
                    .query_row(
                        &format!(
                            "SELECT fingerprint, source_text, source_language, target_language, translated_text
                             FROM {} WHERE fingerprint = ?1",
                            table
                        ),
                        [&key],
                        |row| {
                            Ok(CacheEntry {
                                fingerprint: row.get(0)?,
                                source_text: row.get(1)?,
                                source_language: row.get(2)?,
                                target_language: row.get(3)?,
                                translated_text: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;

                if entry.is_some() {
                    conn.execute(
                        &format!("UPDATE {} SET hit_count = hit_count + 1 WHERE fingerprint = ?1", table),
                        [&key],
                    )?;
                }
                Ok(entry)
            })
            .await?;

        match found {
            Some(entry) => {
                let expected = fingerprint(
                    &entry.source_language,
                    &entry.target_language,
                    &entry.source_text,
                );
                if expected != entry.fingerprint {
                    warn!("Cache row {} does not match its contents", entry.fingerprint);
                    return Err(CacheError::CorruptEntry {
                        fingerprint: entry.fingerprint,
                        reason: "stored text does not hash to its key".to_string(),
                    });
                }
                debug!("Cache hit for '{}'", truncate_text(&entry.source_text, 30));
                Ok(Some(entry))
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        }
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        let table = self.table.clone();
        let created_at = chrono::Utc::now().to_rfc3339();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO {} (
                            fingerprint, source_text, source_language, target_language,
                            translated_text, created_at, hit_count
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
                        ON CONFLICT(fingerprint) DO UPDATE SET translated_text = excluded.translated_text",
                        table
                    ),
                    params![
                        entry.fingerprint,
                        entry.source_text,
                        entry.source_language,
                        entry.target_language,
                        entry.translated_text,
                        created_at,
                    ],
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }
}
