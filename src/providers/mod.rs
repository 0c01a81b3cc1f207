/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for the supported backends:
 * - LibreTranslate: machine translation REST API
 * - Ollama: local LLM server prompted to translate
 * - Mock: in-process provider for tests
 */

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// Providers are stateless from the caller's point of view: every call
/// translates exactly one string. Retries and backoff are the provider's
/// own business.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Translate a single piece of text
    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Language codes this provider can translate into
    async fn supported_target_languages(&self) -> Result<HashSet<String>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.supported_target_languages().await.map(|_| ())
    }

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Build the provider selected in the configuration
pub fn create_provider(config: &TranslationConfig) -> Arc<dyn Provider> {
    match config.provider {
        TranslationProvider::LibreTranslate => {
            Arc::new(libretranslate::LibreTranslate::from_config(config))
        }
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::from_config(config)),
    }
}

pub mod libretranslate;
pub mod mock;
pub mod ollama;
