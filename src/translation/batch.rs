/*!
 * Batch translation processing.
 *
 * Translates a list of sentence units with a bounded number of units in
 * flight. Each unit is served from the cache or, on a miss, from the
 * provider, after which the result is written back to the cache.
 *
 * Results land in a slot reserved for each unit, so the output order is the
 * input order whatever order the units finish in. The first failing unit ends
 * the batch: the unit stream is dropped, which cancels every unit still
 * running or waiting at its next await point.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::translation::cache::{CacheLookup, CacheStore, truncate_text};
use crate::translation::concurrency::DEFAULT_MAX_IN_FLIGHT;

/// Batch translator for sentence units
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    provider: Arc<dyn Provider>,
    cache: CacheLookup,
    /// Maximum number of units in flight
    max_in_flight: usize,
}

impl BatchTranslator {
    /// Create a batch translator; a zero bound is raised to one
    pub fn new(provider: Arc<dyn Provider>, cache: Arc<dyn CacheStore>, max_in_flight: usize) -> Self {
        Self {
            provider,
            cache: CacheLookup::new(cache),
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Create a batch translator with the default in-flight bound
    pub fn with_default_limit(provider: Arc<dyn Provider>, cache: Arc<dyn CacheStore>) -> Self {
        Self::new(provider, cache, DEFAULT_MAX_IN_FLIGHT)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Translate every unit, returning results in input order or the first error
    pub async fn orchestrate(
        &self,
        units: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            "Translating {} sentences ({} -> {}) via {}, {} in flight",
            units.len(),
            source_language,
            target_language,
            self.provider.name(),
            self.max_in_flight
        );
        let start_time = Instant::now();

        let mut slots: Vec<Option<String>> = vec![None; units.len()];
        let mut pending = stream::iter(units.iter().enumerate())
            .map(|(index, unit)| self.translate_unit(index, unit, source_language, target_language))
            .buffer_unordered(self.max_in_flight);

        while let Some(result) = pending.next().await {
            let (index, translated) = result?;
            slots[index] = Some(translated);
        }

        info!(
            "Translated {} sentences in {:?}",
            units.len(),
            start_time.elapsed()
        );

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(TranslationError::MissingResult(index)))
            .collect()
    }

    /// Translate one unit through the cache
    async fn translate_unit(
        &self,
        index: usize,
        unit: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(usize, String), TranslationError> {
        let cached = self
            .cache
            .lookup(source_language, target_language, unit)
            .await
            .map_err(|source| TranslationError::Cache { index, source })?;

        if let Some(entry) = cached {
            debug!("Sentence {} served from cache", index);
            return Ok((index, entry.translated_text));
        }

        debug!("Sentence {} sent to provider: '{}'", index, truncate_text(unit, 40));
        let translated = self
            .provider
            .translate_one(unit, source_language, target_language)
            .await
            .map_err(|source| TranslationError::Provider { index, source })?;

        self.cache
            .store(source_language, target_language, unit, &translated)
            .await
            .map_err(|source| TranslationError::Cache { index, source })?;

        Ok((index, translated))
    }
}
