//! Gemini `generateContent` adapter over plain HTTP.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::{
    GenerationRequest, ProviderFailure, TEMPERATURE, TRANSPORT_TIMEOUT_MARGIN, TextGenerator,
};
use crate::error::DebateError;

pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    timeout: Duration,
}

impl GeminiGenerator {
    pub fn new(
        api_key: &str,
        api_base: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, DebateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout + TRANSPORT_TIMEOUT_MARGIN)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

/// Concatenate the text parts of the first candidate.
///
/// No candidates at all is malformed. A candidate without parts (e.g. cut off
/// before producing text) yields empty text.
fn extract_text(data: &serde_json::Value) -> Result<String, ProviderFailure> {
    let candidate = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| {
            let reason = data
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
                .map(|r| format!(" (blocked: {})", r))
                .unwrap_or_default();
            ProviderFailure::Malformed(format!("no candidates in response{}", reason))
        })?;

    let Some(parts) = candidate.pointer("/content/parts").and_then(|p| p.as_array()) else {
        return Ok(String::new());
    };

    Ok(parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect())
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    /// `max_tokens` is not forwarded: thinking models spend output budget
    /// before emitting text, so a small ceiling can leave the answer empty.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderFailure> {
        let payload = json!({
            "systemInstruction": { "parts": [{ "text": request.system_text }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": { "temperature": TEMPERATURE },
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderFailure::Timeout(self.timeout)
                } else {
                    ProviderFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderFailure::from_status(status.as_u16(), body));
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderFailure::Malformed(e.to_string()))?;

        extract_text(&data)
    }
}
