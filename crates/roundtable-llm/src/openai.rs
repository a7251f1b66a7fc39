//! OpenAI-compatible provider implementation
//!
//! Works against any server exposing the OpenAI chat-completions API,
//! including self-hosted deployments; set `base_url` accordingly.

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    error::{LLMError, Result},
    provider::LLMProvider,
    types::{Message, MessageRole, Response, TokenUsage},
};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible chat-completions endpoints
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl OpenAIProvider {
    /// Create a provider against the public OpenAI endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LLMError::config_error("API key cannot be empty"));
        }

        Ok(Self {
            client: Client::new(),
            base_url: OPENAI_API_BASE.to_string(),
            api_key: Some(api_key),
            model: model.into(),
            timeout: Duration::from_secs(60),
        })
    }

    /// Create a provider against a self-hosted OpenAI-compatible server
    ///
    /// `api_key` may be `None` for unauthenticated local deployments.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(LLMError::config_error("base_url cannot be empty"));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            timeout: Duration::from_secs(60),
        })
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Convert our messages to wire format
    fn format_messages(&self, messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|msg| WireMessage {
                role: match msg.role {
                    MessageRole::System => "system".to_string(),
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "assistant".to_string(),
                },
                content: msg.content.clone(),
                name: msg.name.clone(),
            })
            .collect()
    }

    /// Make a retryable API request
    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        request_body: &ChatCompletionRequest,
    ) -> Result<T> {
        let operation = || async {
            let mut request = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .header("Content-Type", "application/json")
                .timeout(self.timeout)
                .json(request_body);

            if let Some(key) = &self.api_key {
                request = request.header("Authorization", format!("Bearer {}", key));
            }

            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    backoff::Error::Permanent(LLMError::Timeout)
                } else {
                    backoff::Error::Transient {
                        err: LLMError::HttpError(e),
                        retry_after: None,
                    }
                }
            })?;

            let status = response.status();

            // Handle rate limiting
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs: Option<u64> = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok());

                return Err(backoff::Error::Transient {
                    err: LLMError::RateLimitExceeded(retry_after_secs),
                    retry_after: retry_after_secs.map(Duration::from_secs),
                });
            }

            // Handle server errors (retryable)
            if status.is_server_error() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(backoff::Error::Transient {
                    err: LLMError::api_error(format!("Server error: {}", error_text)),
                    retry_after: None,
                });
            }

            // Handle client errors (not retryable)
            if status.is_client_error() {
                let error_text = response.text().await.unwrap_or_default();
                return Err(backoff::Error::Permanent(LLMError::api_error(format!(
                    "Client error ({}): {}",
                    status, error_text
                ))));
            }

            // Parse successful response
            response
                .json::<T>()
                .await
                .map_err(|e| backoff::Error::Permanent(LLMError::parse_error(e.to_string())))
        };

        let backoff_config = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff_config, operation).await
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn send_message(&self, messages: Vec<Message>) -> Result<Response> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: self.format_messages(&messages),
            stream: false,
            temperature: None,
            max_tokens: None,
        };

        tracing::debug!(
            "Sending {} messages to {} ({})",
            messages.len(),
            self.base_url,
            self.model
        );

        let response: ChatCompletionResponse = self.make_request(&request).await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LLMError::parse_error("No choices in response"))?;

        Ok(Response {
            content: choice.message.content.clone().unwrap_or_default(),
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.clone(),
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
