//! Provider gateway.
//!
//! Every text-generation backend implements [`TextGenerator`]. Adapters are the
//! only code that sees SDK or HTTP error types; they report a provider-neutral
//! [`ProviderFailure`] which the [`ProviderRegistry`] wraps into
//! [`DebateError::GenerationFailed`].

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::DebateError;

pub mod gemini;
pub mod openai;

/// Sampling temperature used for every debate turn.
pub const TEMPERATURE: f32 = 0.7;

/// Added to the per-call timeout for the adapters' own HTTP clients, so the
/// registry's timeout always fires first.
pub const TRANSPORT_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Why a provider call produced no usable text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("provider error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderFailure {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ProviderFailure::Auth(body),
            429 => ProviderFailure::RateLimited(body),
            _ => ProviderFailure::Api(format!("HTTP {}: {}", status, body)),
        }
    }
}

/// One generation call: a system instruction plus the composed user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_text: String,
    pub prompt: String,
    /// Output token ceiling, for providers that accept one.
    pub max_tokens: Option<u32>,
}

/// A single text-generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in errors and logs (e.g. "openai").
    fn name(&self) -> &str;

    /// Issue exactly one generation call and return the raw text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderFailure>;
}

/// Explicit, read-only map from provider binding to adapter. Built once at
/// process start and passed by reference into each debate run.
#[derive(Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bindings: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        bindings.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("bindings", &bindings)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register an adapter under a binding name. Bindings are case-insensitive.
    pub fn with_provider(mut self, binding: &str, generator: Arc<dyn TextGenerator>) -> Self {
        self.providers.insert(binding.to_lowercase(), generator);
        self
    }

    fn lookup(&self, binding: &str) -> Option<&Arc<dyn TextGenerator>> {
        self.providers.get(&binding.to_lowercase())
    }

    /// Fail with `UnsupportedProvider` if no adapter answers for `binding`.
    pub fn ensure_supported(&self, binding: &str, speaker: &str) -> Result<(), DebateError> {
        self.lookup(binding).map(|_| ()).ok_or_else(|| DebateError::UnsupportedProvider {
            binding: binding.to_string(),
            speaker: speaker.to_string(),
        })
    }

    /// Run one generation call for `speaker` through the adapter bound to
    /// `binding`. The result is trimmed; an empty string is a valid result.
    pub async fn generate(
        &self,
        binding: &str,
        speaker: &str,
        request: &GenerationRequest,
    ) -> Result<String, DebateError> {
        let generator = self
            .lookup(binding)
            .ok_or_else(|| DebateError::UnsupportedProvider {
                binding: binding.to_string(),
                speaker: speaker.to_string(),
            })?;

        let outcome = match tokio::time::timeout(self.timeout, generator.generate(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProviderFailure::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) => Ok(text.trim().to_string()),
            Err(cause) => {
                tracing::warn!(
                    provider = generator.name(),
                    speaker,
                    error = %cause,
                    "provider call failed"
                );
                Err(DebateError::GenerationFailed {
                    provider: generator.name().to_string(),
                    role: speaker.to_string(),
                    cause,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        reply: Result<String, ProviderFailure>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn err(failure: ProviderFailure) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(failure),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    struct Stalled;

    #[async_trait]
    impl TextGenerator for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<String, ProviderFailure> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_text: "system".to_string(),
            prompt: "prompt".to_string(),
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn test_generate_trims_output() {
        let registry = ProviderRegistry::new().with_provider("gpt", Fixed::ok("  hello there \n"));
        let text = registry.generate("gpt", "Alice", &request()).await.unwrap();
        assert_eq!(text, "hello there");
    }

    #[tokio::test]
    async fn test_whitespace_only_output_is_empty_success() {
        let registry = ProviderRegistry::new().with_provider("gpt", Fixed::ok(" \n\t "));
        let text = registry.generate("gpt", "Alice", &request()).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_binding_lookup_is_case_insensitive() {
        let registry = ProviderRegistry::new().with_provider("Gemini", Fixed::ok("hi"));
        assert!(registry.ensure_supported("GEMINI", "Bob").is_ok());
        assert_eq!(registry.generate("gemini", "Bob", &request()).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_unknown_binding_makes_no_call() {
        let generator = Fixed::ok("unused");
        let registry = ProviderRegistry::new().with_provider("gpt", generator.clone());

        let err = registry.generate("llama", "Carol", &request()).await.unwrap_err();
        assert!(matches!(
            err,
            DebateError::UnsupportedProvider { ref binding, ref speaker }
                if binding == "llama" && speaker == "Carol"
        ));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_wrapped() {
        let registry = ProviderRegistry::new()
            .with_provider("gpt", Fixed::err(ProviderFailure::RateLimited("quota".into())));

        let err = registry.generate("gpt", "Alice", &request()).await.unwrap_err();
        match err {
            DebateError::GenerationFailed { provider, role, cause } => {
                assert_eq!(provider, "fixed");
                assert_eq!(role, "Alice");
                assert_eq!(cause, ProviderFailure::RateLimited("quota".into()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_generation_failure() {
        let registry = ProviderRegistry::new()
            .with_timeout(Duration::from_secs(5))
            .with_provider("slow", Arc::new(Stalled));

        let err = registry.generate("slow", "Bob", &request()).await.unwrap_err();
        assert!(matches!(
            err,
            DebateError::GenerationFailed { cause: ProviderFailure::Timeout(d), .. }
                if d == Duration::from_secs(5)
        ));
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(ProviderFailure::from_status(401, String::new()), ProviderFailure::Auth(_)));
        assert!(matches!(ProviderFailure::from_status(403, String::new()), ProviderFailure::Auth(_)));
        assert!(matches!(
            ProviderFailure::from_status(429, String::new()),
            ProviderFailure::RateLimited(_)
        ));
        assert!(matches!(ProviderFailure::from_status(500, String::new()), ProviderFailure::Api(_)));
    }
}
