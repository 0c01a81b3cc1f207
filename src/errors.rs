/*!
 * Error types for the segtrans library.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised by a cache store
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backing store failed to read or write
    #[error("Cache storage error: {0}")]
    Storage(String),

    /// A stored entry could not be decoded
    #[error("Corrupt cache entry {fingerprint}: {reason}")]
    CorruptEntry {
        /// Fingerprint of the offending entry
        fingerprint: String,
        /// What was wrong with it
        reason: String,
    },
}

impl From<rusqlite::Error> for CacheError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<anyhow::Error> for CacheError {
    fn from(error: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", error))
    }
}

/// Errors that can occur while tokenizing markup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// The input exceeds the configured size limit
    #[error("Markup input is {size} bytes, limit is {limit} bytes")]
    InputTooLarge {
        /// Size of the rejected input
        size: usize,
        /// Configured limit
        limit: usize,
    },

    /// The parser reported an error in strict mode
    #[error("Malformed markup at line {line}: {message}")]
    Malformed {
        /// Line reported by the parser
        line: u64,
        /// Parser message
        message: String,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The request itself is invalid
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Target language is not offered by the provider
    #[error("Target language not supported: {0}")]
    UnsupportedTargetLanguage(String),

    /// Listing the provider's languages failed
    #[error("Failed to list supported languages: {0}")]
    LanguageListing(#[source] ProviderError),

    /// Markup could not be tokenized
    #[error("Tokenization error: {0}")]
    Tokenize(#[from] TokenizeError),

    /// Cache lookup or store failed for a sentence unit
    #[error("Cache error for sentence {index}: {source}")]
    Cache {
        /// Position of the sentence unit in the batch
        index: usize,
        /// Underlying cache failure
        #[source]
        source: CacheError,
    },

    /// Provider call failed for a sentence unit
    #[error("Provider error for sentence {index}: {source}")]
    Provider {
        /// Position of the sentence unit in the batch
        index: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// A result slot was left empty after the batch finished
    #[error("Missing translation for sentence {0}")]
    MissingResult(usize),
}

impl TranslationError {
    /// Position of the sentence unit that caused the failure, when known
    pub fn unit_index(&self) -> Option<usize> {
        match self {
            Self::Cache { index, .. } | Self::Provider { index, .. } => Some(*index),
            Self::MissingResult(index) => Some(*index),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
