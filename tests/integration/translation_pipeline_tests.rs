/*!
 * End-to-end tests for the translation pipeline over the mock provider
 */

use std::sync::Arc;
use std::time::Duration;

use segtrans::errors::{CacheError, TranslationError};
use segtrans::providers::mock::MockProvider;
use segtrans::translation::{BatchTranslator, CacheEntry, CacheStore, MemoryCache};

use crate::common::{FailOn, FailingCache, mock_service, service_with_cache, strings};

#[tokio::test]
async fn test_orchestrate_withSlowEarlyUnits_shouldKeepInputOrder() {
    let provider = MockProvider::working()
        .with_delay("First.", 120)
        .with_delay("Second.", 60)
        .with_delay("Third.", 10);
    let translator = BatchTranslator::new(Arc::new(provider.clone()), Arc::new(MemoryCache::default()), 4);

    let result = translator
        .orchestrate(&strings(&["First.", "Second.", "Third.", "Fourth."]), "en", "fr")
        .await
        .unwrap();

    assert_eq!(result, strings(&["[fr] First.", "[fr] Second.", "[fr] Third.", "[fr] Fourth."]));
    assert_eq!(provider.max_in_flight(), 4);
}

#[tokio::test]
async fn test_orchestrate_withCachedMiddleAndSlowFirst_shouldKeepInputOrder() {
    let provider = MockProvider::working().with_delay("Slow start.", 150);
    let cache = MemoryCache::default();
    cache
        .put(CacheEntry::new("en", "es", "Cached middle.", "Medio guardado."))
        .await
        .unwrap();
    let translator = BatchTranslator::new(Arc::new(provider.clone()), Arc::new(cache.clone()), 3);

    let result = translator
        .orchestrate(&strings(&["Slow start.", "Cached middle.", "Quick end."]), "en", "es")
        .await
        .unwrap();

    assert_eq!(
        result,
        strings(&["[es] Slow start.", "Medio guardado.", "[es] Quick end."])
    );
    assert_eq!(provider.request_count(), 2);
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_orchestrate_shouldRespectInFlightBound() {
    let provider = MockProvider::slow(20);
    let translator = BatchTranslator::new(Arc::new(provider.clone()), Arc::new(MemoryCache::default()), 3);
    let units: Vec<String> = (0..12).map(|i| format!("Sentence {}.", i)).collect();

    let result = translator.orchestrate(&units, "en", "es").await.unwrap();

    assert_eq!(result.len(), 12);
    assert_eq!(provider.request_count(), 12);
    assert!(provider.max_in_flight() <= 3);
    assert!(provider.max_in_flight() >= 2);
}

#[tokio::test]
async fn test_orchestrate_withFailingUnit_shouldCancelTheRest() {
    let provider = MockProvider::working()
        .with_delay("Slow one.", 300)
        .with_failure_on("Broken.");
    let translator = BatchTranslator::new(Arc::new(provider.clone()), Arc::new(MemoryCache::default()), 2);
    let units = strings(&["Slow one.", "Broken.", "Later.", "Much later."]);

    let error = translator.orchestrate(&units, "en", "es").await.unwrap_err();

    assert!(matches!(error, TranslationError::Provider { index: 1, .. }));
    assert_eq!(error.unit_index(), Some(1));
    assert!(provider.request_count() <= 2);

    // The slow unit was dropped mid-request and never finishes
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(provider.completed_count(), 1);
    assert!(provider.completed_count() < units.len());
}

#[tokio::test]
async fn test_orchestrate_withSerialLimit_shouldStopAtFailure() {
    let provider = MockProvider::working().with_failure_on("B.");
    let translator = BatchTranslator::new(Arc::new(provider.clone()), Arc::new(MemoryCache::default()), 1);

    let error = translator
        .orchestrate(&strings(&["A.", "B.", "C.", "D."]), "en", "es")
        .await
        .unwrap_err();

    assert_eq!(error.unit_index(), Some(1));
    assert_eq!(provider.request_count(), 2);
    assert_eq!(provider.max_in_flight(), 1);
}

#[tokio::test]
async fn test_translate_withUnsupportedTarget_shouldNotTranslate() {
    let provider = MockProvider::working().with_supported_languages(&["es", "fr"]);
    let service = mock_service(&provider, 4);

    let error = service.translate("<p>Hello.</p>", "en", "de").await.unwrap_err();

    assert!(matches!(error, TranslationError::UnsupportedTargetLanguage(ref code) if code == "de"));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(provider.language_requests(), 1);
}

#[tokio::test]
async fn test_translate_withLanguageListingFailure_shouldNotTranslate() {
    let provider = MockProvider::working().with_failing_language_listing();
    let service = mock_service(&provider, 4);

    let error = service.translate("Hello.", "en", "es").await.unwrap_err();

    assert!(matches!(error, TranslationError::LanguageListing(_)));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withEmptyText_shouldReturnEmpty() {
    let provider = MockProvider::working();
    let service = mock_service(&provider, 4);

    assert_eq!(service.translate("", "en", "es").await.unwrap(), "");
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_withMarkup_shouldOnlyTouchTextNodes() {
    let provider = MockProvider::working();
    let service = mock_service(&provider, 4);

    let translated = service
        .translate(
            "<div class=\"card\"><p>Hello world. How are you?</p><!-- note --><br/><p>Bye.</p></div>",
            "en",
            "es",
        )
        .await
        .unwrap();

    assert_eq!(
        translated,
        "<div class=\"card\"><p>[es] Hello world.[es] How are you?</p><!-- note --><br/><p>[es] Bye.</p></div>"
    );
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_translate_withScript_shouldLeaveItVerbatim() {
    let provider = MockProvider::working();
    let service = mock_service(&provider, 4);

    let translated = service
        .translate("<p>Hi there.</p><script>var a = 1 < 2;</script>", "en", "es")
        .await
        .unwrap();

    assert_eq!(translated, "<p>[es] Hi there.</p><script>var a = 1 < 2;</script>");
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withPlainText_shouldJoinWithSpaces() {
    let provider = MockProvider::working();
    let service = mock_service(&provider, 4);

    let translated = service
        .translate("The cat sat. The dog barked!", "en", "fr")
        .await
        .unwrap();

    assert_eq!(translated, "[fr] The cat sat. [fr] The dog barked!");
}

#[tokio::test]
async fn test_translate_withRepeatedSentence_shouldServeFromCache() {
    let provider = MockProvider::working();
    let cache = MemoryCache::default();
    let service = service_with_cache(&provider, Arc::new(cache.clone()), 1);

    service.translate("Good morning.", "en", "es").await.unwrap();
    let second = service.translate("<p>Good morning.</p>", "en", "es").await.unwrap();

    assert_eq!(second, "<p>[es] Good morning.</p>");
    assert_eq!(provider.request_count(), 1);
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_translate_withPreloadedCache_shouldUseCachedText() {
    let provider = MockProvider::working();
    let cache = MemoryCache::default();
    cache
        .put(CacheEntry::new("en", "es", "Thank you.", "Gracias."))
        .await
        .unwrap();
    let service = service_with_cache(&provider, Arc::new(cache), 4);

    let translated = service.translate("Thank you. See you.", "en", "es").await.unwrap();

    assert_eq!(translated, "Gracias. [es] See you.");
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withSameTextOtherTarget_shouldMissCache() {
    let provider = MockProvider::working();
    let service = mock_service(&provider, 4);

    service.translate("Thank you.", "en", "es").await.unwrap();
    let french = service.translate("Thank you.", "en", "fr").await.unwrap();

    assert_eq!(french, "[fr] Thank you.");
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_translate_withFailingLookup_shouldReportCacheError() {
    let provider = MockProvider::working();
    let cache = FailingCache::new(FailOn::Get).for_sentence("Second.");
    let service = service_with_cache(&provider, Arc::new(cache), 1);

    let error = service.translate("First. Second. Third.", "en", "es").await.unwrap_err();

    match error {
        TranslationError::Cache { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(source, CacheError::Storage(_)));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withFailingWrite_shouldFailAfterProviderCall() {
    let provider = MockProvider::working();
    let cache = FailingCache::new(FailOn::Put);
    let service = service_with_cache(&provider, Arc::new(cache.clone()), 1);

    let error = service.translate("Only one.", "en", "es").await.unwrap_err();

    assert!(matches!(error, TranslationError::Cache { index: 0, .. }));
    assert_eq!(provider.request_count(), 1);
    assert_eq!(cache.calls(), 2);
}

#[tokio::test]
async fn test_translate_withProviderFailure_shouldNameTheUnit() {
    let provider = MockProvider::working().with_failure_on("Bad.");
    let service = mock_service(&provider, 1);

    let error = service.translate("<p>Good.</p><p>Bad.</p>", "en", "es").await.unwrap_err();

    assert_eq!(error.unit_index(), Some(1));
    assert!(matches!(error, TranslationError::Provider { .. }));
}

#[tokio::test]
async fn test_translate_withEmptyProviderOutput_shouldKeepStructure() {
    let provider = MockProvider::empty();
    let service = mock_service(&provider, 2);

    let translated = service.translate("<p>Hello.</p><p>World.</p>", "en", "es").await.unwrap();

    assert_eq!(translated, "<p></p><p></p>");
}
