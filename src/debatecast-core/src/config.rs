//! Configuration module for role files and provider credentials.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::error::DebateError;
use crate::provider::gemini::GeminiGenerator;
use crate::provider::openai::OpenAiGenerator;
use crate::provider::ProviderRegistry;
use crate::role::{DEBATER_A, DEBATER_B, MODERATOR, RoleRegistry};

/// Root configuration structure of a role file.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptConfig,
    pub roles: BTreeMap<String, RoleConfig>,
}

/// Prompt composition settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// A single role entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleConfig {
    #[serde(default)]
    pub display_name: Option<String>,
    /// Older role files call this field `system`.
    #[serde(alias = "system")]
    pub persona: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

fn default_language() -> String {
    "Turkish".to_string()
}

fn default_provider() -> String {
    "openai".to_string()
}

impl Config {
    /// Load configuration from a TOML or JSON file, chosen by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DebateError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DebateError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Parse TOML content.
    pub fn from_toml_str(content: &str) -> Result<Self, DebateError> {
        toml::from_str(content)
            .map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Parse JSON content. Accepts either the full config shape or a bare
    /// `{ "<ROLE>": { "system": "..." } }` map.
    pub fn from_json_str(content: &str) -> Result<Self, DebateError> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))?;

        let parsed = if value.get("roles").is_some() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value(value).map(|roles| Config {
                prompt: PromptConfig::default(),
                roles,
            })
        };

        parsed.map_err(|e| DebateError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn role_registry(&self) -> RoleRegistry {
        RoleRegistry::from_config(&self.roles)
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    let mut roles = BTreeMap::new();
    roles.insert(
        MODERATOR.to_string(),
        RoleConfig {
            display_name: Some("Moderator".to_string()),
            persona: DEFAULT_MODERATOR_PERSONA.to_string(),
            provider: "openai".to_string(),
        },
    );
    roles.insert(
        DEBATER_A.to_string(),
        RoleConfig {
            display_name: Some("Debater A".to_string()),
            persona: DEFAULT_A_PERSONA.to_string(),
            provider: "openai".to_string(),
        },
    );
    roles.insert(
        DEBATER_B.to_string(),
        RoleConfig {
            display_name: Some("Debater B".to_string()),
            persona: DEFAULT_B_PERSONA.to_string(),
            provider: "gemini".to_string(),
        },
    );

    Config {
        prompt: PromptConfig::default(),
        roles,
    }
}

const DEFAULT_MODERATOR_PERSONA: &str = "You are MOD, the host of a televised debate show. \
You are neutral, warm and quick-witted. You introduce the topic, keep the debaters on track \
with short, pointed questions and never take a side yourself.";

const DEFAULT_A_PERSONA: &str = "You are A, a debater who argues IN FAVOR of the topic. \
You rely on evidence, concrete examples and clear reasoning, and you answer your opponent's \
points directly.";

const DEFAULT_B_PERSONA: &str = "You are B, a debater who argues AGAINST the topic. \
You probe assumptions, point out gaps in your opponent's logic and ground your position in \
well-reasoned arguments.";

/// Provider credentials and call settings, resolved once at process start.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
}

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

impl ProviderSettings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Result<Self, DebateError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DebateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| DebateError::ConfigError(format!("{} is not set", key)))
        };

        let openai_api_key = require("OPENAI_API_KEY")?;
        let gemini_api_key = require("GEMINI_API_KEY")?;

        let timeout = match get("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                DebateError::ConfigError(format!(
                    "PROVIDER_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            openai_api_key,
            openai_api_base: get("OPENAI_API_BASE")
                .or_else(|| get("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            gemini_api_key,
            gemini_api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            timeout: Duration::from_secs(timeout),
        })
    }

    /// Construct the provider registry with one adapter per backend.
    ///
    /// Bindings: `openai` and `gpt` share the OpenAI adapter, `gemini` maps to
    /// the Gemini adapter.
    pub fn build_registry(&self) -> Result<ProviderRegistry, DebateError> {
        let openai = Arc::new(OpenAiGenerator::new(
            &self.openai_api_key,
            &self.openai_api_base,
            &self.openai_model,
            self.timeout,
        )?);
        let gemini = Arc::new(GeminiGenerator::new(
            &self.gemini_api_key,
            &self.gemini_api_base,
            &self.gemini_model,
            self.timeout,
        )?);

        Ok(ProviderRegistry::new()
            .with_timeout(self.timeout)
            .with_provider("openai", openai.clone())
            .with_provider("gpt", openai)
            .with_provider("gemini", gemini))
    }
}
