//! Error types for the debate system.

use thiserror::Error;

use crate::provider::ProviderFailure;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Invalid debate configuration: {0}")]
    Validation(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unsupported provider '{binding}' requested by {speaker}")]
    UnsupportedProvider { binding: String, speaker: String },

    #[error("Generation failed for {role} via {provider}: {cause}")]
    GenerationFailed {
        provider: String,
        role: String,
        #[source]
        cause: ProviderFailure,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to write transcript: {0}")]
    Output(String),
}

impl DebateError {
    /// The role or participant the error is attributed to, if any.
    pub fn role(&self) -> Option<&str> {
        match self {
            DebateError::UnsupportedProvider { speaker, .. } => Some(speaker),
            DebateError::GenerationFailed { role, .. } => Some(role),
            _ => None,
        }
    }

    /// The provider binding the error is attributed to, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            DebateError::UnsupportedProvider { binding, .. } => Some(binding),
            DebateError::GenerationFailed { provider, .. } => Some(provider),
            _ => None,
        }
    }
}
