/*!
 * Application controller.
 *
 * Wires a `Config` into a running pipeline: the provider, the cache store
 * and the translation service. The CLI and embedders talk to this type
 * instead of assembling the pieces themselves.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::{self, ApiResponse, EncodeOptions, TranslateRequest, TranslateResponse};
use crate::app_config::{CacheBackend, CacheConfig, Config};
use crate::database::{DatabaseConnection, SqliteCache};
use crate::providers::{self, Provider};
use crate::translation::{CacheStats, CacheStore, MemoryCache, TranslationOptions, TranslationService};

/// The cache store a controller was built with
#[derive(Debug, Clone)]
pub enum CacheHandle {
    Memory(MemoryCache),
    Sqlite(SqliteCache),
}

impl CacheHandle {
    /// Open the store described by the configuration
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        if !config.enabled {
            debug!("Translation cache disabled");
            return Ok(Self::Memory(MemoryCache::disabled()));
        }

        match config.backend {
            CacheBackend::Memory => Ok(Self::Memory(MemoryCache::default())),
            CacheBackend::Sqlite => {
                let db = match &config.database_path {
                    Some(path) => DatabaseConnection::new(path)?,
                    None => DatabaseConnection::new_default()?,
                };
                Ok(Self::Sqlite(SqliteCache::new(db, &config.table_name)?))
            }
        }
    }

    pub fn store(&self) -> Arc<dyn CacheStore> {
        match self {
            Self::Memory(cache) => Arc::new(cache.clone()),
            Self::Sqlite(cache) => Arc::new(cache.clone()),
        }
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        match self {
            Self::Memory(cache) => Ok(cache.stats()),
            Self::Sqlite(cache) => cache.stats().await,
        }
    }

    /// Remove every entry, returning how many were removed
    pub async fn clear(&self) -> Result<usize> {
        match self {
            Self::Memory(cache) => {
                let removed = cache.len();
                cache.clear();
                Ok(removed)
            }
            Self::Sqlite(cache) => cache.clear().await,
        }
    }
}

/// Main application controller
#[derive(Debug, Clone)]
pub struct Controller {
    config: Config,
    cache: CacheHandle,
    service: TranslationService,
}

impl Controller {
    /// Build the provider and cache described by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = providers::create_provider(&config.translation);
        Self::with_provider(config, provider)
    }

    /// Build a controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        let cache = CacheHandle::from_config(&config.cache).context("Failed to open translation cache")?;

        let options = TranslationOptions {
            max_concurrent_requests: config.translation.optimal_concurrent_requests(),
            markup: config.markup.tokenizer_options(),
        };
        info!(
            "Using {} with up to {} sentences in flight",
            provider.name(),
            options.max_concurrent_requests
        );

        let service = TranslationService::new(provider, cache.store(), options);
        Ok(Self {
            config,
            cache,
            service,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &TranslationService {
        &self.service
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Validate and translate one request
    pub async fn translate(&self, request: &TranslateRequest) -> Result<TranslateResponse> {
        request.validate()?;
        let translated = self
            .service
            .translate(&request.text, &request.source_language, &request.target_language)
            .await?;
        Ok(TranslateResponse::new(translated))
    }

    /// Translate text between the configured default languages
    pub async fn translate_text(&self, text: &str) -> Result<String> {
        let request = TranslateRequest::new(
            self.config.source_language.clone(),
            self.config.target_language.clone(),
            text,
        );
        Ok(self.translate(&request).await?.translated_text)
    }

    /// Handle a raw JSON request body
    pub async fn handle(&self, body: &[u8], options: EncodeOptions) -> ApiResponse {
        api::handle_request(&self.service, body, options).await
    }

    /// Check that the configured provider answers
    pub async fn test_connection(&self) -> Result<()> {
        let provider = self.service.provider();
        provider
            .test_connection()
            .await
            .with_context(|| format!("Failed to reach {}", provider.name()))?;
        info!("{} is reachable", provider.name());
        Ok(())
    }

    /// Target languages offered by the provider, sorted
    pub async fn supported_languages(&self) -> Result<Vec<String>> {
        let languages = self.service.supported_target_languages().await?;
        Ok(languages.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect())
    }
}
