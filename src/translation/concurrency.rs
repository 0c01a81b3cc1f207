/*!
 * Provider-specific concurrency tuning.
 *
 * The orchestrator keeps a fixed number of sentence units in flight. The
 * default bound depends on how much parallel traffic a backend tolerates.
 */

use crate::app_config::TranslationProvider;

/// In-flight bound used when nothing else is configured
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Provider-specific concurrency profile with tuned defaults
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    /// Maximum concurrent requests
    pub max_concurrent_requests: usize,
}

impl ProviderProfile {
    /// Get the profile for a given provider
    pub fn for_provider(provider: TranslationProvider) -> Self {
        match provider {
            TranslationProvider::LibreTranslate => Self {
                // Small per-sentence requests, public instances rate limit
                max_concurrent_requests: DEFAULT_MAX_IN_FLIGHT,
            },
            TranslationProvider::Ollama => Self {
                // Local GPU, requests queue up past a few
                max_concurrent_requests: 4,
            },
        }
    }

    /// Effective in-flight bound, respecting any user override; never zero
    pub fn effective_concurrent_requests(&self, user_override: Option<usize>) -> usize {
        user_override
            .filter(|limit| *limit > 0)
            .unwrap_or(self.max_concurrent_requests)
            .max(1)
    }
}
