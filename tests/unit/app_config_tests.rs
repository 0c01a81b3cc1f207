/*!
 * Tests for application configuration
 */

use segtrans::app_config::{CacheBackend, Config, LogLevel, TranslationProvider};

#[test]
fn test_config_fromFile_shouldApplyValuesAndDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "source_language": "en",
            "target_language": "de",
            "translation": {
                "provider": "ollama",
                "available_providers": [
                    {"type": "ollama", "model": "mistral", "endpoint": "http://gpu:11434"}
                ],
                "common": {"max_concurrent_requests": 2}
            },
            "cache": {"backend": "sqlite", "table_name": "web_cache"},
            "markup": {"strict": true, "max_input_bytes": 65536},
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.get_model(), "mistral");
    assert_eq!(config.translation.get_endpoint(), "http://gpu:11434");
    assert_eq!(config.translation.optimal_concurrent_requests(), 2);
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(config.cache.table_name, "web_cache");
    assert!(config.cache.enabled);
    assert!(config.markup.strict);
    assert_eq!(config.markup.tokenizer_options().max_input_bytes, Some(65536));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_fromFile_withBrokenJson_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_config_saveThenLoad_shouldPreserveValues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    let mut config = Config::default();
    config.target_language = "it".to_string();
    config.translation.provider = TranslationProvider::Ollama;

    config.save(&path).unwrap();
    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded.target_language, "it");
    assert_eq!(loaded.translation.provider, TranslationProvider::Ollama);
}

#[test]
fn test_translationConfig_withOllama_shouldUseConservativeBound() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    assert_eq!(config.translation.optimal_concurrent_requests(), 4);
    assert!(config.translation.get_supported_languages().contains(&"fr".to_string()));
}

#[test]
fn test_validate_withZeroInputLimit_shouldFail() {
    let mut config = Config::default();
    config.markup.max_input_bytes = Some(0);
    assert!(config.validate().is_err());
}
