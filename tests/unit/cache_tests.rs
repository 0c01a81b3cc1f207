/*!
 * Tests for translation cache functionality
 */

use std::sync::Arc;

use segtrans::database::{DatabaseConnection, SqliteCache};
use segtrans::errors::CacheError;
use segtrans::translation::{CacheEntry, CacheLookup, CacheStore, MemoryCache, fingerprint};

#[test]
fn test_fingerprint_shouldDependOnEveryField() {
    let base = fingerprint("en", "fr", "Hello.");

    assert_eq!(base, fingerprint("en", "fr", "Hello."));
    assert_ne!(base, fingerprint("en", "es", "Hello."));
    assert_ne!(base, fingerprint("de", "fr", "Hello."));
    assert_ne!(base, fingerprint("en", "fr", "Hello!"));
    assert_eq!(base.len(), 64);
    assert!(base.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_fingerprint_withShiftedSeparators_shouldDiffer() {
    assert_ne!(fingerprint("en", "fr", "x"), fingerprint("en-f", "r", "x"));
    assert_ne!(fingerprint("a", "b", "c"), fingerprint("a", "", "bc"));
}

#[tokio::test]
async fn test_memoryCache_withDisabled_shouldNeverStore() {
    let cache = MemoryCache::disabled();
    let entry = CacheEntry::new("en", "fr", "hello", "bonjour");

    cache.put(entry.clone()).await.unwrap();

    assert!(cache.get(&entry.fingerprint).await.unwrap().is_none());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_cacheLookup_withDifferentLanguages_shouldMiss() {
    let lookup = CacheLookup::new(Arc::new(MemoryCache::default()));
    lookup.store("en", "fr", "hello", "bonjour").await.unwrap();

    assert!(lookup.lookup("de", "fr", "hello").await.unwrap().is_none());
    assert!(lookup.lookup("en", "es", "hello").await.unwrap().is_none());
    assert_eq!(
        lookup.lookup("en", "fr", "hello").await.unwrap().unwrap().translated_text,
        "bonjour"
    );
}

#[tokio::test]
async fn test_memoryCache_stats_shouldCountHitsAndMisses() {
    let cache = MemoryCache::default();
    let lookup = CacheLookup::new(Arc::new(cache.clone()));
    lookup.store("en", "fr", "hello", "bonjour").await.unwrap();

    lookup.lookup("en", "fr", "hello").await.unwrap();
    lookup.lookup("en", "fr", "goodbye").await.unwrap();

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[derive(Debug)]
struct MisroutingStore;

#[async_trait::async_trait]
impl CacheStore for MisroutingStore {
    async fn get(&self, _fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(Some(CacheEntry::new("en", "fr", "other", "autre")))
    }

    async fn put(&self, _entry: CacheEntry) -> Result<(), CacheError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_cacheLookup_withMismatchedEntry_shouldReportCorruption() {
    let lookup = CacheLookup::new(Arc::new(MisroutingStore));

    let error = lookup.lookup("en", "fr", "hello").await.unwrap_err();

    assert!(matches!(error, CacheError::CorruptEntry { .. }));
}

#[tokio::test]
async fn test_sqliteCache_withCustomTable_shouldRoundTripThroughLookup() {
    let dir = tempfile::tempdir().unwrap();
    let db = DatabaseConnection::new(dir.path().join("cache.db")).unwrap();
    let cache = SqliteCache::new(db, "site_translations").unwrap();
    let lookup = CacheLookup::new(Arc::new(cache.clone()));

    lookup.store("en", "es", "Good morning.", "Buenos días.").await.unwrap();
    let found = lookup.lookup("en", "es", "Good morning.").await.unwrap().unwrap();

    assert_eq!(found.translated_text, "Buenos días.");
    assert_eq!(cache.stats().await.unwrap().entries, 1);
}
