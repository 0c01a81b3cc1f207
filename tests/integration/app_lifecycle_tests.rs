/*!
 * Controller lifecycle tests: configuration in, JSON requests through
 */

use std::sync::Arc;

use segtrans::api::{EncodeOptions, ErrorResponse, TranslateRequest, TranslateResponse};
use segtrans::app_config::{CacheBackend, Config};
use segtrans::app_controller::Controller;
use segtrans::providers::mock::MockProvider;

fn controller_with(provider: &MockProvider) -> Controller {
    Controller::with_provider(Config::default(), Arc::new(provider.clone())).unwrap()
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body).unwrap().error
}

#[tokio::test]
async fn test_handle_withValidRequest_shouldReturnTranslation() {
    let provider = MockProvider::working();
    let controller = controller_with(&provider);
    let body = serde_json::to_vec(&TranslateRequest::new("en", "fr", "<b>Hi there.</b>")).unwrap();

    let response = controller.handle(&body, EncodeOptions::default()).await;

    assert_eq!(response.status, 200);
    assert!(response.is_success());
    let decoded: TranslateResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(decoded.translated_text, "<b>[fr] Hi there.</b>");
}

#[tokio::test]
async fn test_handle_withMalformedBody_shouldReturnBadRequest() {
    let provider = MockProvider::working();
    let controller = controller_with(&provider);

    let response = controller.handle(b"source_language=en", EncodeOptions::default()).await;

    assert_eq!(response.status, 400);
    assert_eq!(error_message(&response.body), "Invalid request format");
    assert_eq!(provider.language_requests(), 0);
}

#[tokio::test]
async fn test_handle_withMissingText_shouldReturnBadRequest() {
    let controller = controller_with(&MockProvider::working());

    let response = controller
        .handle(br#"{"source_language": "en", "target_language": "es"}"#, EncodeOptions::default())
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(error_message(&response.body), "text is required");
}

#[tokio::test]
async fn test_handle_withUnsupportedTarget_shouldReturnUnprocessable() {
    let provider = MockProvider::working().with_supported_languages(&["es"]);
    let controller = controller_with(&provider);

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "fr", "text": "Hello."}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 422);
    assert_eq!(error_message(&response.body), "Target language not supported");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_handle_withProviderOnlyTargetCode_shouldTranslate() {
    let provider = MockProvider::working().with_supported_languages(&["es", "zt"]);
    let controller = controller_with(&provider);

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "zt", "text": "Hello."}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 200);
    let decoded: TranslateResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(decoded.translated_text, "[zt] Hello.");
}

#[tokio::test]
async fn test_handle_withUnknownTargetCode_shouldReturnUnprocessable() {
    let provider = MockProvider::working();
    let controller = controller_with(&provider);

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "xx", "text": "Hello."}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 422);
    assert_eq!(error_message(&response.body), "Target language not supported");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_handle_withInvalidUtf8InText_shouldDropBadBytes() {
    let provider = MockProvider::working();
    let controller = controller_with(&provider);

    let response = controller
        .handle(
            b"{\"source_language\": \"en\", \"target_language\": \"es\", \"text\": \"<p>Caf\xc3\x28e.</p>\"}",
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 200);
    let decoded: TranslateResponse = serde_json::from_str(&response.body).unwrap();
    assert_eq!(decoded.translated_text, "<p>[es] Caf(e.</p>");
}

#[tokio::test]
async fn test_handle_withProviderFailure_shouldHideDetails() {
    let controller = controller_with(&MockProvider::failing());

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "es", "text": "Hello."}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(error_message(&response.body), "Error during translation");
}

#[tokio::test]
async fn test_handle_withListingFailure_shouldReportLanguageCheck() {
    let controller = controller_with(&MockProvider::working().with_failing_language_listing());

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "es", "text": "Hello."}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(error_message(&response.body), "Error checking supported languages");
}

#[tokio::test]
async fn test_handle_withStrictMarkupError_shouldReportMarkupFailure() {
    let mut config = Config::default();
    config.markup.strict = true;
    let controller = Controller::with_provider(config, Arc::new(MockProvider::working())).unwrap();

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "es", "text": "<p>Hello</p><"}"#,
            EncodeOptions::default(),
        )
        .await;

    assert_eq!(response.status, 500);
    assert_eq!(error_message(&response.body), "Error processing HTML content");
}

#[tokio::test]
async fn test_handle_withEscapedOutput_shouldEscapeMarkup() {
    let controller = controller_with(&MockProvider::working());
    let options = EncodeOptions {
        escape_markup: true,
        pretty: false,
    };

    let response = controller
        .handle(
            br#"{"source_language": "en", "target_language": "es", "text": "<i>Yes.</i>"}"#,
            options,
        )
        .await;

    assert_eq!(response.status, 200);
    assert!(response.body.contains("\\u003ci\\u003e"));
    assert!(!response.body.contains('<'));
}

#[tokio::test]
async fn test_sqliteCache_shouldSurviveControllerRestart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.cache.backend = CacheBackend::Sqlite;
    config.cache.database_path = Some(dir.path().join("cache.db"));
    config.cache.table_name = "lifecycle_cache".to_string();

    let first_provider = MockProvider::working();
    let first = Controller::with_provider(config.clone(), Arc::new(first_provider.clone())).unwrap();
    first.translate_text("Persist me. And me.").await.unwrap();
    assert_eq!(first_provider.request_count(), 2);
    drop(first);

    let second_provider = MockProvider::working();
    let second = Controller::with_provider(config, Arc::new(second_provider.clone())).unwrap();
    let translated = second.translate_text("Persist me. And me.").await.unwrap();

    assert_eq!(translated, "[es] Persist me. [es] And me.");
    assert_eq!(second_provider.request_count(), 0);
    assert_eq!(second.cache().stats().await.unwrap().entries, 2);
}

#[test]
fn test_translate_withConfigFile_shouldUseItsLanguages() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{"source_language": "en", "target_language": "it"}"#).unwrap();
    let config = Config::from_file(&path).unwrap();
    let controller = Controller::with_provider(config, Arc::new(MockProvider::working())).unwrap();

    let result = tokio_test::block_on(async { controller.translate_text("Ciao world.").await });

    assert_eq!(result.unwrap(), "[it] Ciao world.");
}
