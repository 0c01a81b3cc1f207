/*!
 * Translation caching functionality.
 *
 * Every sentence is cached under a fingerprint of its language pair and
 * exact text, so a sentence translated once is never sent to the provider
 * again for the same pair. Stores implement [`CacheStore`]; this module ships
 * the in-memory store, the SQLite store lives in the database module.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::CacheError;

/// Fingerprint of a (source language, target language, sentence) triple.
///
/// Fields are separated by NUL bytes so no two distinct triples share an input.
pub fn fingerprint(source_language: &str, target_language: &str, sentence: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_language.as_bytes());
    hasher.update([0u8]);
    hasher.update(target_language.as_bytes());
    hasher.update([0u8]);
    hasher.update(sentence.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A cached sentence translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of the language pair and source text
    pub fingerprint: String,
    /// Original sentence
    pub source_text: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Translated sentence
    pub translated_text: String,
}

impl CacheEntry {
    /// Build an entry, deriving its fingerprint
    pub fn new(
        source_language: &str,
        target_language: &str,
        source_text: &str,
        translated_text: &str,
    ) -> Self {
        Self {
            fingerprint: fingerprint(source_language, target_language, source_text),
            source_text: source_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            translated_text: translated_text.to_string(),
        }
    }
}

/// Key-value store for cached translations
#[async_trait]
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Look up an entry; `Ok(None)` is a miss, not an error
    async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Store an entry; storing the same fingerprint twice is harmless
    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;
}

/// Computes fingerprints and adapts store results for one language pair
#[derive(Debug, Clone)]
pub struct CacheLookup {
    store: Arc<dyn CacheStore>,
}

impl CacheLookup {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Find the cached translation of a sentence
    pub async fn lookup(
        &self,
        source_language: &str,
        target_language: &str,
        sentence: &str,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let key = fingerprint(source_language, target_language, sentence);
        match self.store.get(&key).await? {
            Some(entry) if entry.fingerprint != key => Err(CacheError::CorruptEntry {
                fingerprint: key,
                reason: format!("store returned entry keyed {}", entry.fingerprint),
            }),
            found => Ok(found),
        }
    }

    /// Remember a successful translation
    pub async fn store(
        &self,
        source_language: &str,
        target_language: &str,
        sentence: &str,
        translated: &str,
    ) -> Result<(), CacheError> {
        self.store
            .put(CacheEntry::new(source_language, target_language, sentence, translated))
            .await
    }
}

/// Hit and miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entries: {}, Hits: {}, Misses: {}, Hit rate: {:.1}%",
            self.entries,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0
        )
    }
}

/// In-process cache store
#[derive(Debug, Clone)]
pub struct MemoryCache {
    /// Entries keyed by fingerprint
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,

    hits: Arc<AtomicUsize>,
    misses: Arc<AtomicUsize>,

    /// When disabled every lookup misses and nothing is stored
    enabled: bool,
}

impl MemoryCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(AtomicUsize::new(0)),
            misses: Arc::new(AtomicUsize::new(0)),
            enabled,
        }
    }

    /// Cache that never stores anything
    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::SeqCst),
            misses: self.misses.load(Ordering::SeqCst),
            entries: self.len(),
        }
    }

    /// Drop all entries and reset the counters
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::SeqCst);
        self.misses.store(0, Ordering::SeqCst);
        debug!("Translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        if !self.enabled {
            return Ok(None);
        }

        let found = self.entries.read().get(fingerprint).cloned();
        match &found {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::SeqCst);
                debug!(
                    "Cache hit for '{}' ({} -> {})",
                    truncate_text(&entry.source_text, 30),
                    entry.source_language,
                    entry.target_language
                );
            }
            None => {
                self.misses.fetch_add(1, Ordering::SeqCst);
                debug!("Cache miss for {}", fingerprint);
            }
        }

        Ok(found)
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }

        debug!(
            "Cached translation for '{}' ({} -> {})",
            truncate_text(&entry.source_text, 30),
            entry.source_language,
            entry.target_language
        );
        self.entries.write().insert(entry.fingerprint.clone(), entry);
        Ok(())
    }
}

/// Truncate text to at most `max_chars` characters with an ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
