/*!
 * # segtrans - sentence-level translation of text and HTML
 *
 * A Rust library that translates plain text or HTML fragments one sentence
 * at a time, through a translation backend and a persistent cache.
 *
 * ## Features
 *
 * - Detects whether the input is HTML or plain text
 * - Splits text into sentences with locale-aware abbreviation rules
 * - Tokenizes HTML and translates only its text nodes, leaving tags,
 *   attributes, comments and scripts untouched
 * - Caches every sentence translation under a language-pair fingerprint
 *   (in memory or in SQLite)
 * - Translates sentences concurrently with a bounded number in flight,
 *   stopping at the first failure
 * - Translation backends:
 *   - LibreTranslate
 *   - Ollama (local LLM)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `segmentation`: Sentence segmentation
 * - `markup`: HTML classification, tokenization and reconstruction
 * - `translation`: The translation pipeline:
 *   - `translation::core`: Classify, split, translate, reassemble
 *   - `translation::batch`: Bounded-concurrency sentence translation
 *   - `translation::cache`: Fingerprints and the in-memory cache
 *   - `translation::formatting`: Output reassembly and cleanup
 * - `database`: SQLite cache store
 * - `providers`: Translation backend clients
 * - `api`: Request and response envelope
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod api;
pub mod app_config;
pub mod app_controller;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod markup;
pub mod providers;
pub mod segmentation;
pub mod translation;

// Re-export main types for easier usage
pub use api::{TranslateRequest, TranslateResponse};
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, CacheError, ProviderError, TokenizeError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use segmentation::SentenceSegmenter;
pub use translation::TranslationService;
