use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prompt::Prompt;

/// Outcome of one model call, successful or not.
///
/// A failed call is data, not an error: the runner records it and moves on,
/// so a single bad example never aborts a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Raw completion text, or the error description on failure.
    pub text: String,
    /// Provider that served the request, when the API reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Wall-clock latency of the call including retries.
    pub latency_ms: u64,
    pub success: bool,
    /// Error detail when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelResponse {
    pub fn ok(text: impl Into<String>, provider: Option<String>, latency_ms: u64) -> Self {
        Self {
            text: text.into(),
            provider,
            latency_ms,
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, latency_ms: u64) -> Self {
        let error = error.into();
        Self {
            text: format!("ERROR_API_CALL: {error}"),
            provider: None,
            latency_ms,
            success: false,
            error: Some(error),
        }
    }
}

/// Trait for completion backends.
///
/// Implementations handle transport, provider routing and retries; the
/// runner only sees the final `ModelResponse`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the outcome. Must not block indefinitely.
    async fn call(&self, prompt: &Prompt) -> ModelResponse;

    /// The model identifier requests are issued for.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response() {
        let resp = ModelResponse::ok("Yes", Some("novita".into()), 120);
        assert!(resp.success);
        assert_eq!(resp.text, "Yes");
        assert_eq!(resp.provider.as_deref(), Some("novita"));
        assert!(resp.error.is_none());
    }

    #[test]
    fn failed_response_carries_error_text() {
        let resp = ModelResponse::failed("HTTP 503: overloaded", 450);
        assert!(!resp.success);
        assert_eq!(resp.text, "ERROR_API_CALL: HTTP 503: overloaded");
        assert_eq!(resp.error.as_deref(), Some("HTTP 503: overloaded"));
    }

    #[test]
    fn serde_omits_empty_optionals() {
        let resp = ModelResponse::ok("No", None, 5);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("provider"));
        assert!(!json.contains("error"));
    }
}
