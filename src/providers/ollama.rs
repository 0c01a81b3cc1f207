/*!
 * Ollama client.
 *
 * Uses a local LLM as a translation backend: each sentence is sent to
 * `/api/generate` with a system prompt naming the language pair. Ollama has
 * no language listing, so the supported targets come from configuration.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Provider;
use crate::translation::formatting::FormatPreserver;

/// Ollama client for interacting with Ollama API
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// Model used for translation
    model: String,
    /// System prompt template with `{source_language}` and `{target_language}`
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Target languages accepted by this deployment
    supported_languages: HashSet<String>,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a client for a server URL and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            system_prompt: crate::app_config::default_system_prompt(),
            temperature: 0.3,
            supported_languages: crate::app_config::default_supported_languages()
                .into_iter()
                .collect(),
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }

    /// Create a client from the active provider configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        let mut client = Self::new(config.get_endpoint(), config.get_model());
        client.system_prompt = config.common.system_prompt.clone();
        client.temperature = config.common.temperature;
        client.max_retries = config.common.retry_count;
        client.backoff_base_ms = config.common.retry_backoff_ms;
        client.supported_languages = config.get_supported_languages().into_iter().collect();
        if let Some(provider) = config.get_active_provider_config() {
            client.client = Client::builder()
                .timeout(Duration::from_secs(provider.timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default();
        }
        client
    }

    /// System prompt with the language pair filled in
    pub fn render_system_prompt(&self, source_language: &str, target_language: &str) -> String {
        let name = |code: &str| language_utils::get_language_name(code).unwrap_or_else(|_| code.to_string());
        self.system_prompt
            .replace("{source_language}", &name(source_language))
            .replace("{target_language}", &name(target_language))
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get response text".to_string());

                    if status.is_success() {
                        return parse_generation(&body);
                    } else if status.is_server_error() {
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            body,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: body,
                        });
                    } else {
                        // Client error - don't retry
                        error!("Ollama API error ({}): {}", status, body);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: body,
                        });
                    }
                }
                Err(e) => {
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
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
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// Get the Ollama API version
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Invalid version response: {}", e)))?;

        response["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::ParseError("Invalid version format in response".to_string()))
    }
}

/// Parse a generate response, accepting streamed JSON lines as well
fn parse_generation(body: &str) -> Result<GenerationResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(response);
    }

    let mut text = String::new();
    let mut model = String::new();
    let mut parsed_any = false;
    for line in body.lines().filter(|line| !line.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| ProviderError::ParseError(format!("Invalid Ollama response: {}", e)))?;
        if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
            text.push_str(part);
        }
        if let Some(name) = value.get("model").and_then(|v| v.as_str()) {
            model = name.to_string();
        }
        parsed_any = true;
    }

    if !parsed_any {
        return Err(ProviderError::ParseError("Empty Ollama response".to_string()));
    }

    Ok(GenerationResponse {
        model,
        response: text,
        done: true,
    })
}

#[async_trait]
impl Provider for Ollama {
    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(self.render_system_prompt(source_language, target_language))
            .temperature(self.temperature);

        let response = self.generate(&request).await?;
        debug!("Ollama ({}) answered {} chars", response.model, response.response.len());

        Ok(FormatPreserver::clean_model_output(text, &response.response))
    }

    async fn supported_target_languages(&self) -> Result<HashSet<String>, ProviderError> {
        Ok(self.supported_languages.clone())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.version().await.map(|_| ())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
