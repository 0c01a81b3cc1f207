/*!
 * Request and response envelope for the translation entry point.
 *
 * The codec is transport agnostic: `handle_request` takes a raw JSON body
 * and returns a status code and body, which a CLI, an HTTP server or a
 * serverless handler can forward as they see fit.
 */

use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;
use crate::language_utils;
use crate::markup;
use crate::translation::TranslationService;

/// Inbound translation request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub source_language: String,
    #[serde(default)]
    pub target_language: String,
    #[serde(default)]
    pub text: String,
}

impl TranslateRequest {
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            text: text.into(),
        }
    }

    /// Check that every field is present and the source language is ISO 639.
    ///
    /// The target language is checked against the provider's own list, which
    /// may hold codes outside ISO 639 (`zt`).
    pub fn validate(&self) -> Result<(), TranslationError> {
        if self.source_language.is_empty() {
            return Err(TranslationError::InvalidRequest("source_language is required".to_string()));
        }
        if self.target_language.is_empty() {
            return Err(TranslationError::InvalidRequest("target_language is required".to_string()));
        }
        if self.text.is_empty() {
            return Err(TranslationError::InvalidRequest("text is required".to_string()));
        }
        if language_utils::validate_language_code(&self.source_language).is_err() {
            return Err(TranslationError::InvalidRequest("Invalid source language".to_string()));
        }
        Ok(())
    }
}

/// Outbound translation response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_confidence: Option<f64>,
}

impl TranslateResponse {
    pub fn new(translated_text: impl Into<String>) -> Self {
        Self {
            translated_text: translated_text.into(),
            ..Self::default()
        }
    }
}

/// Body of a failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON encoding switches
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Write `<`, `>` and `&` as unicode escapes
    pub escape_markup: bool,
    /// Indent the output
    pub pretty: bool,
}

/// Status code and body produced for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    fn error(status: u16, message: &str) -> Self {
        let body = serde_json::to_string(&ErrorResponse {
            error: message.to_string(),
        })
        .unwrap_or_else(|_| message.to_string());
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Parse a request body, dropping any byte sequence that is not valid UTF-8
pub fn decode_request(body: &[u8]) -> Result<TranslateRequest, TranslationError> {
    serde_json::from_str(&markup::sanitize_utf8(body)).map_err(|e| {
        warn!("Rejected request body: {}", e);
        TranslationError::InvalidRequest("Invalid request format".to_string())
    })
}

/// Serialize a value, leaving markup unescaped unless asked otherwise
pub fn encode_json<T: Serialize>(value: &T, options: EncodeOptions) -> Result<String, serde_json::Error> {
    let json = if options.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    // Outside strings JSON never contains these characters
    let json = if options.escape_markup {
        json.replace('&', "\\u0026")
            .replace('<', "\\u003c")
            .replace('>', "\\u003e")
    } else {
        json
    };

    Ok(json.trim().to_string())
}

/// Serialize a response
pub fn encode_response(response: &TranslateResponse, options: EncodeOptions) -> Result<String, serde_json::Error> {
    encode_json(response, options)
}

/// Status code and public message for a failed translation
pub fn error_status(error: &TranslationError) -> (u16, String) {
    match error {
        TranslationError::InvalidRequest(message) => (400, message.clone()),
        TranslationError::UnsupportedTargetLanguage(_) => (422, "Target language not supported".to_string()),
        TranslationError::LanguageListing(_) => (500, "Error checking supported languages".to_string()),
        TranslationError::Tokenize(_) => (500, "Error processing HTML content".to_string()),
        TranslationError::Cache { .. } | TranslationError::Provider { .. } | TranslationError::MissingResult(_) => {
            (500, "Error during translation".to_string())
        }
    }
}

/// Decode, validate, translate and encode one request
pub async fn handle_request(service: &TranslationService, body: &[u8], options: EncodeOptions) -> ApiResponse {
    let request = match decode_request(body).and_then(|request| request.validate().map(|_| request)) {
        Ok(request) => request,
        Err(e) => {
            let (status, message) = error_status(&e);
            return ApiResponse::error(status, &message);
        }
    };

    let translated = match service
        .translate(&request.text, &request.source_language, &request.target_language)
        .await
    {
        Ok(translated) => translated,
        Err(e) => {
            let (status, message) = error_status(&e);
            if status >= 500 {
                error!("Translation request failed: {}", e);
            }
            return ApiResponse::error(status, &message);
        }
    };

    match encode_response(&TranslateResponse::new(translated), options) {
        Ok(body) => ApiResponse { status: 200, body },
        Err(e) => {
            error!("Failed to encode response: {}", e);
            ApiResponse::error(500, "Error marshalling response")
        }
    }
}
