/*!
 * Application configuration.
 *
 * Configuration is a JSON document (`conf.json` by default). A default file
 * is written when none exists, and command line flags override file values
 * after loading. Every component receives the part of the configuration it
 * needs; nothing below the CLI reads the environment.
 */

use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::database::schema::{DEFAULT_CACHE_TABLE, validate_table_name};
use crate::markup::TokenizerOptions;
use crate::translation::concurrency::ProviderProfile;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "conf.json";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default source language code (ISO)
    pub source_language: String,

    /// Default target language code (ISO)
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Translation cache config
    #[serde(default)]
    pub cache: CacheConfig,

    /// Markup tokenizer config
    #[serde(default)]
    pub markup: MarkupConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// LibreTranslate REST API
    #[default]
    LibreTranslate,
    /// Local Ollama server
    Ollama,
}

impl TranslationProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LibreTranslate => "LibreTranslate",
            Self::Ollama => "Ollama",
        }
    }

    /// Lowercase provider identifier, as used in the config file
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" => Ok(Self::LibreTranslate),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Settings for one provider backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Model name (LLM providers only)
    #[serde(default)]
    pub model: String,

    /// API key, empty when the backend needs none
    #[serde(default)]
    pub api_key: String,

    /// Service URL
    #[serde(default)]
    pub endpoint: String,

    /// Max sentence units in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Target languages offered by backends that cannot list them
    #[serde(default)]
    pub supported_languages: Vec<String>,
}

impl ProviderConfig {
    /// Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let profile = ProviderProfile::for_provider(provider_type);
        match provider_type {
            TranslationProvider::LibreTranslate => Self {
                provider_type: provider_type.to_lowercase_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_libretranslate_endpoint(),
                concurrent_requests: profile.max_concurrent_requests,
                timeout_secs: default_timeout_secs(),
                supported_languages: Vec::new(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: provider_type.to_lowercase_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                concurrent_requests: profile.max_concurrent_requests,
                timeout_secs: default_ollama_timeout_secs(),
                supported_languages: default_supported_languages(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM providers
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Overrides the provider's in-flight bound when set
    #[serde(default)]
    pub max_concurrent_requests: Option<usize>,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_concurrent_requests: None,
            temperature: default_temperature(),
        }
    }
}

/// Where cached translations are kept
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process memory, lost on exit
    #[default]
    Memory,
    /// SQLite database file
    Sqlite,
}

/// Translation cache configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Whether translations are cached at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: CacheBackend,

    /// SQLite file; the user data directory is used when unset
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// SQLite table holding the cache
    #[serde(default = "default_cache_table")]
    pub table_name: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::default(),
            database_path: None,
            table_name: default_cache_table(),
        }
    }
}

/// Markup tokenizer configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MarkupConfig {
    /// Reject markup larger than this many bytes
    #[serde(default)]
    pub max_input_bytes: Option<usize>,

    /// Fail on the first markup parse error instead of keeping it as a token
    #[serde(default)]
    pub strict: bool,
}

impl MarkupConfig {
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            strict: self.strict,
            max_input_bytes: self.max_input_bytes,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_concurrent_requests() -> usize {
    crate::translation::concurrency::DEFAULT_MAX_IN_FLIGHT
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_cache_table() -> String {
    DEFAULT_CACHE_TABLE.to_string()
}

fn default_libretranslate_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

/// Prompt template for LLM providers
pub fn default_system_prompt() -> String {
    "You are a professional translator. Translate the user's text from {source_language} to {target_language}. \
     Reply with the translation only, without quotes, notes or explanations. \
     Keep punctuation, numbers and names as they are."
        .to_string()
}

/// Target languages assumed for LLM providers when none are configured
pub fn default_supported_languages() -> Vec<String> {
    ["en", "es", "fr", "de", "it", "pt", "nl", "pl", "ru", "ja", "zh", "ko"]
        .iter()
        .map(|code| code.to_string())
        .collect()
}

impl Config {
    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load a configuration file, writing the default one if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;
        crate::language_utils::get_language_name(&self.target_language)?;

        if self.translation.provider == TranslationProvider::Ollama && self.translation.get_model().is_empty() {
            return Err(anyhow!("A model is required for the Ollama provider"));
        }

        if self.translation.get_endpoint().is_empty() {
            return Err(anyhow!(
                "An endpoint is required for the {} provider",
                self.translation.provider.display_name()
            ));
        }

        validate_table_name(&self.cache.table_name)?;

        if self.markup.max_input_bytes == Some(0) {
            return Err(anyhow!("markup.max_input_bytes must be greater than zero"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            translation: TranslationConfig::default(),
            cache: CacheConfig::default(),
            markup: MarkupConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// In-flight bound for the active provider
    pub fn optimal_concurrent_requests(&self) -> usize {
        let configured = self
            .common
            .max_concurrent_requests
            .or_else(|| self.get_active_provider_config().map(|p| p.concurrent_requests));

        ProviderProfile::for_provider(self.provider).effective_concurrent_requests(configured)
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::LibreTranslate => String::new(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::LibreTranslate => default_libretranslate_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Configured target languages for the active provider
    pub fn get_supported_languages(&self) -> Vec<String> {
        match self.get_active_provider_config() {
            Some(provider_config) if !provider_config.supported_languages.is_empty() => {
                provider_config.supported_languages.clone()
            }
            _ => default_supported_languages(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::LibreTranslate),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
