//! Shared Application State

use debatecast_core::ProviderRegistry;

/// Created once at startup and handed to every handler behind an `Arc`.
#[derive(Debug)]
pub struct AppState {
    pub providers: ProviderRegistry,
    /// Language every participant must answer in.
    pub language: String,
}

impl AppState {
    pub fn new(providers: ProviderRegistry, language: impl Into<String>) -> Self {
        Self {
            providers,
            language: language.into(),
        }
    }
}
