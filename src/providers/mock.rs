/*!
 * Mock provider implementation for testing.
 *
 * The mock simulates the behaviors the translation pipeline has to cope with:
 * - `MockProvider::working()` - always succeeds with a tagged translation
 * - `MockProvider::intermittent(n)` - every n-th request fails
 * - `MockProvider::failing()` - always fails with an error
 * - `MockProvider::slow(ms)` - succeeds after a delay
 *
 * Per-text delays and failures, the supported language list and call counters
 * let tests check ordering, cancellation and the in-flight bound.
 */

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Languages the mock reports unless told otherwise
const DEFAULT_LANGUAGES: [&str; 6] = ["en", "es", "fr", "de", "it", "pt"];

/// Request seen by the mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// Decrements the in-flight counter even when the call is cancelled
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
    /// Extra latency per source text
    delays: Arc<RwLock<HashMap<String, u64>>>,
    /// Source texts that always fail
    failing_texts: Arc<RwLock<HashSet<String>>>,
    supported_languages: Arc<RwLock<HashSet<String>>>,
    fail_language_listing: Arc<AtomicBool>,

    request_count: Arc<AtomicUsize>,
    completed_count: Arc<AtomicUsize>,
    language_requests: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            custom_response: None,
            delays: Arc::new(RwLock::new(HashMap::new())),
            failing_texts: Arc::new(RwLock::new(HashSet::new())),
            supported_languages: Arc::new(RwLock::new(
                DEFAULT_LANGUAGES.iter().map(|code| code.to_string()).collect(),
            )),
            fail_language_listing: Arc::new(AtomicBool::new(false)),
            request_count: Arc::new(AtomicUsize::new(0)),
            completed_count: Arc::new(AtomicUsize::new(0)),
            language_requests: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a fixed delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Delay the answer for one source text
    pub fn with_delay(self, text: &str, delay_ms: u64) -> Self {
        self.delays.write().insert(text.to_string(), delay_ms);
        self
    }

    /// Make every request for one source text fail
    pub fn with_failure_on(self, text: &str) -> Self {
        self.failing_texts.write().insert(text.to_string());
        self
    }

    /// Replace the reported target languages
    pub fn with_supported_languages(self, codes: &[&str]) -> Self {
        *self.supported_languages.write() = codes.iter().map(|code| code.to_string()).collect();
        self
    }

    /// Make the language listing fail
    pub fn with_failing_language_listing(self) -> Self {
        self.fail_language_listing.store(true, Ordering::SeqCst);
        self
    }

    /// Number of translation requests started
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of translation requests that ran to completion
    pub fn completed_count(&self) -> usize {
        self.completed_count.load(Ordering::SeqCst)
    }

    /// Number of language listing requests
    pub fn language_requests(&self) -> usize {
        self.language_requests.load(Ordering::SeqCst)
    }

    /// Highest number of translation requests observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn default_translation(request: &MockRequest) -> String {
        format!("[{}] {}", request.target_language, request.text)
    }

    async fn respond(&self, request: &MockRequest, count: usize) -> Result<String, ProviderError> {
        let extra_delay = self.delays.read().get(&request.text).copied();
        if let Some(delay_ms) = extra_delay {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self.failing_texts.read().contains(&request.text) {
            return Err(ProviderError::ApiError {
                message: format!("Simulated failure for '{}'", request.text),
                status_code: 500,
            });
        }

        let translated = || match self.custom_response {
            Some(generator) => generator(request),
            None => Self::default_translation(request),
        };

        match self.behavior {
            MockBehavior::Working => Ok(translated()),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(translated())
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(translated())
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn translate_one(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        let _guard = InFlightGuard(self.in_flight.clone());

        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        let result = self.respond(&request, count).await;

        self.completed_count.fetch_add(1, Ordering::SeqCst);
        result
    }

    async fn supported_target_languages(&self) -> Result<HashSet<String>, ProviderError> {
        self.language_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_language_listing.load(Ordering::SeqCst) {
            return Err(ProviderError::ConnectionError(
                "Simulated language listing failure".to_string(),
            ));
        }
        Ok(self.supported_languages.read().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
