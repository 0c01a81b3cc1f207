/*!
 * Common test utilities for the segtrans test suite
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use segtrans::errors::CacheError;
use segtrans::providers::mock::MockProvider;
use segtrans::translation::{CacheEntry, CacheStore, MemoryCache, TranslationOptions, TranslationService};

/// Which cache operation a `FailingCache` breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Get,
    Put,
}

/// Cache store that fails one kind of operation, and delegates otherwise
#[derive(Debug, Clone)]
pub struct FailingCache {
    inner: MemoryCache,
    fail_on: FailOn,
    /// Sentence whose lookups fail; every lookup fails when unset
    sentence: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl FailingCache {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryCache::default(),
            fail_on,
            sentence: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Only fail for entries of this source sentence
    pub fn for_sentence(mut self, sentence: &str) -> Self {
        self.sentence = Some(sentence.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matches(&self, fingerprint: &str) -> bool {
        match &self.sentence {
            None => true,
            Some(sentence) => ["en", "es", "fr"].iter().any(|target| {
                segtrans::translation::fingerprint("en", target, sentence) == fingerprint
            }),
        }
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, fingerprint: &str) -> Result<Option<CacheEntry>, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::Get && self.matches(fingerprint) {
            return Err(CacheError::Storage("lookup unavailable".to_string()));
        }
        self.inner.get(fingerprint).await
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == FailOn::Put && self.matches(&entry.fingerprint) {
            return Err(CacheError::Storage("write rejected".to_string()));
        }
        self.inner.put(entry).await
    }
}

/// Owned strings from string literals
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Service over a mock provider and a fresh memory cache
pub fn mock_service(provider: &MockProvider, max_in_flight: usize) -> TranslationService {
    service_with_cache(provider, Arc::new(MemoryCache::default()), max_in_flight)
}

/// Service over a mock provider and the given cache
pub fn service_with_cache(
    provider: &MockProvider,
    cache: Arc<dyn CacheStore>,
    max_in_flight: usize,
) -> TranslationService {
    TranslationService::new(
        Arc::new(provider.clone()),
        cache,
        TranslationOptions {
            max_concurrent_requests: max_in_flight,
            ..TranslationOptions::default()
        },
    )
}
