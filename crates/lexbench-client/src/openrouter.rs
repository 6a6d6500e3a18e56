//! OpenRouter Chat Completions API integration.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lexbench_core::error::{CallError, ConfigError, LexError, Result};
use lexbench_core::model::{CompletionClient, ModelResponse};
use lexbench_core::prompt::{Prompt, SYSTEM_INSTRUCTION};

use crate::retry::RetryPolicy;
use crate::routing::{ProviderPreferences, RoutingPolicy};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderPreferences>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    /// Provider that actually served the request.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

/// The part of a completion the harness consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub text: String,
    pub provider: Option<String>,
}

/// Extract the completion text from a response body. The text field's
/// absence is a call failure, not an empty answer.
pub fn parse_completion(body: &str) -> std::result::Result<ChatCompletion, CallError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CallError::InvalidResponse(format!("malformed body: {e}")))?;
    let text = response
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .ok_or_else(|| CallError::InvalidResponse("no completion content in response".into()))?;
    Ok(ChatCompletion {
        text,
        provider: response.provider,
    })
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Seam between the retrying client and the HTTP layer, so tests can count
/// and script attempts.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> std::result::Result<ChatCompletion, CallError>;
}

struct HttpTransport {
    http: reqwest::Client,
    url: String,
    api_key: String,
    referer: Option<String>,
    title: Option<String>,
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> std::result::Result<ChatCompletion, CallError> {
        let mut req = self
            .http
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request);
        if let Some(referer) = &self.referer {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.title {
            req = req.header("X-Title", title);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                CallError::Timeout
            } else {
                CallError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(match status.as_u16() {
                401 | 403 => CallError::Auth(message),
                429 => CallError::RateLimited {
                    retry_after_secs: retry_after,
                },
                code => CallError::Http {
                    status: code,
                    body: message,
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CallError::Transport(e.to_string()))?;
        parse_completion(&body)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Connection settings for the routing API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Optional attribution headers, OpenRouter etiquette.
    pub referer: Option<String>,
    pub title: Option<String>,
    /// Per-request timeout; no call blocks past this.
    pub timeout: Duration,
    pub temperature: f64,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.into(),
            referer: None,
            title: None,
            timeout: Duration::from_secs(60),
            temperature: 0.0,
        }
    }

    /// Read settings from the environment. A missing API key is a fatal
    /// configuration error; the attribution headers are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").map_err(|_| {
            LexError::Config(ConfigError::MissingCredential("OPENROUTER_API_KEY".into()))
        })?;
        let mut config = Self::new(api_key);
        config.referer = std::env::var("OPENROUTER_HTTP_REFERER").ok();
        config.title =
            Some(std::env::var("OPENROUTER_X_TITLE").unwrap_or_else(|_| "legalbench-eval".into()));
        Ok(config)
    }
}

/// Chat client for the OpenRouter routing API.
///
/// Retries transient failures up to the policy's attempt bound, then
/// degrades to a failed [`ModelResponse`] instead of returning an error.
pub struct OpenRouterClient {
    model_id: String,
    transport: Box<dyn ChatTransport>,
    retry: RetryPolicy,
    temperature: f64,
}

impl OpenRouterClient {
    pub fn new(config: ClientConfig, model_id: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LexError::Call(CallError::Transport(e.to_string())))?;
        let transport = HttpTransport {
            http,
            url: format!("{}/chat/completions", config.base_url),
            api_key: config.api_key,
            referer: config.referer,
            title: config.title,
        };
        Ok(Self {
            model_id: model_id.into(),
            transport: Box::new(transport),
            retry: RetryPolicy::default(),
            temperature: config.temperature,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Swap the HTTP layer out, for tests.
    pub fn with_transport(
        model_id: impl Into<String>,
        transport: Box<dyn ChatTransport>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            transport,
            retry,
            temperature: 0.0,
        }
    }

    pub fn build_request(&self, prompt: &Prompt) -> ChatRequest {
        let policy = RoutingPolicy::for_model(&self.model_id);
        ChatRequest {
            model: self.model_id.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_INSTRUCTION),
                ChatMessage::user(prompt.render()),
            ],
            temperature: self.temperature,
            provider: policy.provider_preferences(),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn call(&self, prompt: &Prompt) -> ModelResponse {
        let request = self.build_request(prompt);
        let started = Instant::now();
        let mut last_error: Option<CallError> = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.transport.send(&request).await {
                Ok(completion) => {
                    return ModelResponse::ok(
                        completion.text,
                        completion.provider,
                        started.elapsed().as_millis() as u64,
                    );
                }
                Err(error) => {
                    let retryable = error.is_retryable() && attempt < self.retry.max_attempts;
                    tracing::warn!(
                        task = %prompt.task,
                        model = %self.model_id,
                        attempt,
                        retryable,
                        error = %error,
                        "model call failed"
                    );
                    if retryable {
                        tokio::time::sleep(self.retry.backoff_for(attempt, &error)).await;
                        last_error = Some(error);
                    } else {
                        last_error = Some(error);
                        break;
                    }
                }
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts made".into());
        ModelResponse::failed(detail, started.elapsed().as_millis() as u64)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
