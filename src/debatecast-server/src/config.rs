use debatecast_core::orchestrator::DEFAULT_LANGUAGE;
use debatecast_core::{DebateError, ProviderSettings};
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub language: String,
    pub providers: ProviderSettings,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, DebateError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DebateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_address_str = get("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            DebateError::ConfigError(format!("Invalid BIND_ADDRESS '{}': {}", bind_address_str, e))
        })?;

        Ok(Self {
            bind_address,
            language: get("PROMPT_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            providers: ProviderSettings::from_lookup(&lookup)?,
        })
    }
}
