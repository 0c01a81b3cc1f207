/*!
 * Sentence-level translation.
 *
 * This module contains the translation pipeline. It is split into several
 * submodules:
 *
 * - `core`: the service that runs classify, split, translate, reassemble
 * - `batch`: bounded-concurrency translation of sentence units
 * - `cache`: fingerprints, cache entries and the in-memory store
 * - `concurrency`: per-provider in-flight bounds
 * - `formatting`: reassembly and cleanup of translated output
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::cache::{CacheEntry, CacheLookup, CacheStats, CacheStore, MemoryCache, fingerprint};
pub use self::core::{PreparedInput, TranslationOptions, TranslationService};

// Submodules
pub mod batch;
pub mod cache;
pub mod concurrency;
pub mod core;
pub mod formatting;
