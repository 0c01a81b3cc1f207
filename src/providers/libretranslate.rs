/*!
 * LibreTranslate client.
 *
 * Talks to a LibreTranslate (or compatible) REST server:
 * - `POST /translate` translates one string
 * - `GET /languages` lists languages and their translation targets
 */

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::providers::Provider;

/// Translation request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Text to translate
    q: &'a str,
    /// Source language code
    source: &'a str,
    /// Target language code
    target: &'a str,
    /// Input format, always plain text here
    format: &'a str,
    /// API key, for servers that require one
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Translation response body
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// One entry of the `/languages` listing
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageInfo {
    /// Language code
    pub code: String,
    /// English language name
    #[serde(default)]
    pub name: String,
    /// Codes this language can be translated into
    #[serde(default)]
    pub targets: Vec<String>,
}

/// LibreTranslate client with retry logic
#[derive(Debug, Clone)]
pub struct LibreTranslate {
    /// Base URL of the server
    base_url: String,
    /// Optional API key
    api_key: Option<String>,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl LibreTranslate {
    /// Create a client for a server URL
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self::new_with_config(endpoint, api_key, 3, 1000, 30)
    }

    /// Create a client with explicit retry and timeout settings
    pub fn new_with_config(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        max_retries: u32,
        backoff_base_ms: u64,
        timeout_secs: u64,
    ) -> Self {
        Self {
            base_url: normalize_base_url(&endpoint.into()),
            api_key: api_key.filter(|key| !key.is_empty()),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            max_retries,
            backoff_base_ms,
        }
    }

    /// Create a client from the active provider configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        let timeout_secs = config
            .get_active_provider_config()
            .map(|provider| provider.timeout_secs)
            .unwrap_or(30);

        Self::new_with_config(
            config.get_endpoint(),
            Some(config.get_api_key()),
            config.common.retry_count,
            config.common.retry_backoff_ms,
            timeout_secs,
        )
    }

    /// Fetch the full language listing
    pub async fn languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        let url = format!("{}/languages", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            return Err(map_status_error(status, message));
        }

        response
            .json::<Vec<LanguageInfo>>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Invalid languages response: {}", e)))
    }

    /// Translate text, retrying network failures and server errors
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: source_language,
            target: target_language,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.json::<TranslateResponse>().await.map_err(|e| {
                            ProviderError::ParseError(format!("Invalid translate response: {}", e))
                        })?;
                        debug!(
                            "LibreTranslate translated {} chars ({} -> {})",
                            text.chars().count(),
                            source_language,
                            target_language
                        );
                        return Ok(body.translated_text);
                    }

                    let message = read_error_message(response).await;
                    if status.is_server_error() {
                        error!(
                            "LibreTranslate error ({}): {} - attempt {}/{}",
                            status,
                            message,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(map_status_error(status, message));
                    } else {
                        // Client errors are not retried
                        error!("LibreTranslate error ({}): {}", status, message);
                        return Err(map_status_error(status, message));
                    }
                }
                Err(e) => {
                    warn!(
                        "LibreTranslate network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::RequestFailed(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "LibreTranslate request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }
}

#[async_trait]
impl Provider for LibreTranslate {
    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.translate(text, source_language, target_language).await
    }

    async fn supported_target_languages(&self) -> Result<HashSet<String>, ProviderError> {
        Ok(target_codes(&self.languages().await?))
    }

    fn name(&self) -> &str {
        "libretranslate"
    }
}

/// Every code that appears as a language or as a translation target
pub fn target_codes(languages: &[LanguageInfo]) -> HashSet<String> {
    languages
        .iter()
        .flat_map(|language| std::iter::once(&language.code).chain(language.targets.iter()))
        .cloned()
        .collect()
}

/// Strip trailing slashes and add a scheme when missing
fn normalize_base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let with_scheme = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    match Url::parse(&with_scheme) {
        Ok(url) => url.as_str().trim_end_matches('/').to_string(),
        Err(_) => with_scheme,
    }
}

async fn read_error_message(response: reqwest::Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text)
}

fn map_status_error(status: StatusCode, message: String) -> ProviderError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(message),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message,
        },
    }
}
