/*!
 * Core translation service implementation.
 *
 * `TranslationService` runs the whole pipeline for one input:
 *
 * 1. check the target language against the provider's language list
 * 2. classify the input as markup or plain text
 * 3. split it into sentence units (tokenizer or segmenter)
 * 4. translate the units through the cache with bounded concurrency
 * 5. reassemble the translated units into the input's shape
 */

use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::batch::BatchTranslator;
use super::cache::CacheStore;
use super::concurrency::DEFAULT_MAX_IN_FLIGHT;
use super::formatting::{Reassembly, reassemble};
use crate::errors::{ProviderError, TranslationError};
use crate::markup::{self, ContentKind, MarkupTokenizer, TokenizedMarkup, TokenizerOptions};
use crate::providers::Provider;
use crate::segmentation::SentenceSegmenter;

/// Translation options for customizing the translation process
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Maximum number of sentence units in flight
    pub max_concurrent_requests: usize,

    /// Markup tokenizer settings
    pub markup: TokenizerOptions,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_IN_FLIGHT,
            markup: TokenizerOptions::default(),
        }
    }
}

/// Input split into sentence units, ready for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedInput {
    /// Plain text and its sentences
    Plain { sentences: Vec<String> },
    /// Markup token stream with its text-node sentences
    Markup(TokenizedMarkup),
}

impl PreparedInput {
    pub fn kind(&self) -> ContentKind {
        match self {
            PreparedInput::Plain { .. } => ContentKind::Plain,
            PreparedInput::Markup(_) => ContentKind::Markup,
        }
    }

    /// Sentence units in translation order
    pub fn sentences(&self) -> &[String] {
        match self {
            PreparedInput::Plain { sentences } => sentences,
            PreparedInput::Markup(tokenized) => &tokenized.sentences,
        }
    }

    /// Put translated units back together in the input's shape
    pub fn reassemble(&self, translated: &[String]) -> String {
        let layout = match self {
            PreparedInput::Plain { .. } => Reassembly::Plain,
            PreparedInput::Markup(tokenized) => Reassembly::Markup {
                tokens: &tokenized.tokens,
                node_sentence_counts: &tokenized.node_sentence_counts,
            },
        };
        reassemble(layout, translated)
    }
}

/// Main translation service
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn Provider>,
    batch: BatchTranslator,
    /// Translation options
    pub options: TranslationOptions,
    /// Provider languages, fetched once
    supported_languages: Arc<OnceCell<HashSet<String>>>,
}

impl TranslationService {
    /// Create a new translation service over a provider and a cache store
    pub fn new(provider: Arc<dyn Provider>, cache: Arc<dyn CacheStore>, options: TranslationOptions) -> Self {
        let batch = BatchTranslator::new(provider.clone(), cache, options.max_concurrent_requests);
        Self {
            provider,
            batch,
            options,
            supported_languages: Arc::new(OnceCell::new()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Target languages offered by the provider
    pub async fn supported_target_languages(&self) -> Result<&HashSet<String>, TranslationError> {
        self.supported_languages
            .get_or_try_init(|| async {
                let languages = self
                    .provider
                    .supported_target_languages()
                    .await
                    .map_err(TranslationError::LanguageListing)?;
                if languages.is_empty() {
                    return Err(TranslationError::LanguageListing(ProviderError::ParseError(
                        format!("{} returned no languages", self.provider.name()),
                    )));
                }
                debug!("{} supports {} target languages", self.provider.name(), languages.len());
                Ok(languages)
            })
            .await
    }

    /// Fail unless the provider lists the target language
    pub async fn ensure_target_supported(&self, target_language: &str) -> Result<(), TranslationError> {
        if self.supported_target_languages().await?.contains(target_language) {
            Ok(())
        } else {
            Err(TranslationError::UnsupportedTargetLanguage(target_language.to_string()))
        }
    }

    /// Classify the input and split it into sentence units
    pub fn prepare(&self, text: &str, source_language: &str) -> Result<PreparedInput, TranslationError> {
        let segmenter = SentenceSegmenter::for_language(source_language);

        match markup::classify(text) {
            ContentKind::Markup => {
                let tokenizer = MarkupTokenizer::new(segmenter, self.options.markup.clone());
                Ok(PreparedInput::Markup(tokenizer.tokenize(text)?))
            }
            ContentKind::Plain => Ok(PreparedInput::Plain {
                sentences: segmenter.segment(text),
            }),
        }
    }

    /// Translate text or markup sentence by sentence
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        self.ensure_target_supported(target_language).await?;

        let prepared = self.prepare(text, source_language)?;
        info!(
            "Prepared {:?} input with {} sentences",
            prepared.kind(),
            prepared.sentences().len()
        );

        let translated = self
            .batch
            .orchestrate(prepared.sentences(), source_language, target_language)
            .await?;

        Ok(prepared.reassemble(&translated))
    }
}
