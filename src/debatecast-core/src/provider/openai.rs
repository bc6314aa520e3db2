//! OpenAI chat-completions adapter.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;

use super::{
    GenerationRequest, ProviderFailure, TEMPERATURE, TRANSPORT_TIMEOUT_MARGIN, TextGenerator,
};
use crate::error::DebateError;

/// Talks to any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: &str,
        api_base: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, DebateError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout + TRANSPORT_TIMEOUT_MARGIN)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DebateError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        // One HTTP request per call: rate limits and 5xx surface immediately.
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retry),
            model: model.to_string(),
            timeout,
        })
    }

    fn classify(&self, err: OpenAIError) -> ProviderFailure {
        match err {
            OpenAIError::Reqwest(e) if e.is_timeout() => ProviderFailure::Timeout(self.timeout),
            OpenAIError::Reqwest(e) => ProviderFailure::Transport(e.to_string()),
            OpenAIError::ApiError(api) => classify_api_error(api),
            other => ProviderFailure::Malformed(other.to_string()),
        }
    }
}

/// The SDK drops the HTTP status, so go by the error code and type instead.
fn classify_api_error(api: ApiError) -> ProviderFailure {
    let tags = [api.code.as_deref(), api.r#type.as_deref()];
    let tagged = |names: &[&str]| tags.iter().flatten().any(|t| names.contains(t));

    if tagged(&["invalid_api_key", "authentication_error", "permission_denied"]) {
        ProviderFailure::Auth(api.to_string())
    } else if tagged(&["rate_limit_exceeded", "insufficient_quota", "requests", "tokens"]) {
        ProviderFailure::RateLimited(api.to_string())
    } else {
        ProviderFailure::Api(api.to_string())
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderFailure> {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: request.system_text.clone().into(),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: request.prompt.clone().into(),
                name: None,
            }),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .temperature(TEMPERATURE)
            .messages(messages);
        if let Some(max_tokens) = request.max_tokens {
            args.max_completion_tokens(max_tokens);
        }
        let chat_request = args
            .build()
            .map_err(|e| ProviderFailure::Api(format!("invalid request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| self.classify(e))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| ProviderFailure::Malformed("response contained no choices".into()))?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderRegistry;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OpenAiGenerator {
        OpenAiGenerator::new(
            "test-key",
            &format!("{}/v1", server.uri()),
            "gpt-4o-mini",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_text: "Follow the rules.".to_string(),
            prompt: "Speak about X.".to_string(),
            max_tokens: Some(220),
        }
    }

    fn completion(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    #[tokio::test]
    async fn test_sends_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "Follow the rules." },
                    { "role": "user", "content": "Speak about X." }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("Merhaba."))))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server).generate(&request()).await.unwrap();
        assert_eq!(text, "Merhaba.");
    }

    #[tokio::test]
    async fn test_null_content_is_empty_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
            .mount(&server)
            .await;

        let text = generator(&server).generate(&request()).await.unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_no_choices_is_malformed() {
        let server = MockServer::start().await;
        let mut body = completion(json!("unused"));
        body["choices"] = json!([]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderFailure::Malformed(_)));
    }

    fn api_error(status: u16, kind: &str, code: &str) -> ResponseTemplate {
        ResponseTemplate::new(status).set_body_json(json!({
            "error": {
                "message": "request rejected",
                "type": kind,
                "param": null,
                "code": code
            }
        }))
    }

    #[tokio::test]
    async fn test_invalid_key_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(api_error(401, "invalid_request_error", "invalid_api_key"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderFailure::Auth(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported_after_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(api_error(429, "requests", "rate_limit_exceeded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderFailure::RateLimited(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderFailure::Api(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_registry_reports_rate_limit_not_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(api_error(429, "requests", "rate_limit_exceeded"))
            .expect(1)
            .mount(&server)
            .await;

        let registry = ProviderRegistry::new()
            .with_timeout(Duration::from_secs(6))
            .with_provider("openai", std::sync::Arc::new(generator(&server)));
        let err = registry.generate("openai", "A", &request()).await.unwrap_err();

        match err {
            DebateError::GenerationFailed { cause, .. } => {
                assert!(matches!(cause, ProviderFailure::RateLimited(_)), "got {cause:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_response_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(json!("late")))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let timeout = Duration::from_secs(1);
        let generator = OpenAiGenerator::new(
            "test-key",
            &format!("{}/v1", server.uri()),
            "gpt-4o-mini",
            timeout,
        )
        .unwrap();
        let registry = ProviderRegistry::new()
            .with_timeout(timeout)
            .with_provider("openai", std::sync::Arc::new(generator));
        let err = registry.generate("openai", "A", &request()).await.unwrap_err();

        match err {
            DebateError::GenerationFailed { cause, .. } => {
                assert_eq!(cause, ProviderFailure::Timeout(timeout));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_api_error_codes() {
        let error = |kind: Option<&str>, code: Option<&str>| ApiError {
            message: "x".to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        };

        assert!(matches!(
            classify_api_error(error(Some("insufficient_quota"), None)),
            ProviderFailure::RateLimited(_)
        ));
        assert!(matches!(
            classify_api_error(error(Some("invalid_request_error"), Some("invalid_api_key"))),
            ProviderFailure::Auth(_)
        ));
        assert!(matches!(
            classify_api_error(error(Some("invalid_request_error"), Some("model_not_found"))),
            ProviderFailure::Api(_)
        ));
    }
}
