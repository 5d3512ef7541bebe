/// LLM Client: the single point of entry for all chat-completion calls in LinkGen.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions MUST go through the `TextCompletion` trait.
///
/// One call is exactly one attempt. Retry and backoff live in the generation
/// orchestrator, which needs to see rate limits as they happen.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// Groq exposes an OpenAI-compatible chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Token the provider puts in throttling errors (e.g. `rate_limit_exceeded`).
const RATE_LIMIT_TOKEN: &str = "rate_limit";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Transport error: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limited by provider")]
    RateLimited { retry_after: Option<Duration> },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status();
        if status == Some(StatusCode::TOO_MANY_REQUESTS) {
            return LlmError::RateLimited { retry_after: None };
        }
        LlmError::Transport {
            status: status.map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// A single-turn chat completion. Implementations perform exactly one attempt.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        model_id: &str,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Chat-completion client for Groq (or any OpenAI-compatible endpoint).
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            api_url,
        })
    }
}

#[async_trait]
impl TextCompletion for GroqClient {
    async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        model_id: &str,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: temperature.clamp(0.0, 1.0),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            return Err(classify_failure(status, &body, retry_after));
        }

        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        chat.text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Maps a non-success provider response onto the error taxonomy.
/// Throttling is detected by status code or by the provider's rate-limit token.
fn classify_failure(status: StatusCode, body: &str, retry_after: Option<Duration>) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.to_lowercase().contains(RATE_LIMIT_TOKEN) {
        return LlmError::RateLimited { retry_after };
    }

    let message = serde_json::from_str::<ProviderError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    LlmError::Transport {
        status: Some(status.as_u16()),
        message,
    }
}

/// Only the delta-seconds form of `Retry-After` is honoured; HTTP dates are ignored.
fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_429_is_rate_limit() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "", None);
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_rate_limit_token_in_body_is_rate_limit() {
        let body = r#"{"error":{"message":"Limit reached","type":"tokens","code":"rate_limit_exceeded"}}"#;
        let err = classify_failure(StatusCode::BAD_REQUEST, body, Some(Duration::from_secs(3)));
        match err {
            LlmError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_auth_failure_is_transport_with_provider_message() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#;
        match classify_failure(StatusCode::UNAUTHORIZED, body, None) {
            LlmError::Transport { status, message } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_error_body_is_kept_verbatim() {
        match classify_failure(StatusCode::BAD_GATEWAY, "upstream down", None) {
            LlmError::Transport { message, .. } => assert_eq!(message, "upstream down"),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(parse_retry_after(Some("2")), Some(Duration::from_secs(2)));
        assert_eq!(
            parse_retry_after(Some(" 1.5 ")),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_parse_retry_after_ignores_dates_and_garbage() {
        assert_eq!(parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")), None);
        assert_eq!(parse_retry_after(Some("-4")), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_chat_response_text_reads_first_choice() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello LinkedIn"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let chat: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(chat.text(), Some("Hello LinkedIn"));
    }

    #[test]
    fn test_chat_response_without_choices_has_no_text() {
        let chat: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(chat.text().is_none());
    }

    #[test]
    fn test_request_serializes_single_user_message() {
        let req = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "Write a post",
            }],
            temperature: 0.6,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Write a post");
    }
}
