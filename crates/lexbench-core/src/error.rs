use thiserror::Error;

/// Top-level error type for the lexbench harness.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Call error: {0}")]
    Call(#[from] CallError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors detected before any API call is made. Always fatal for the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Malformed task '{task}': {reason}")]
    MalformedTask { task: String, reason: String },

    #[error("Missing required credential: {0}")]
    MissingCredential(String),
}

/// Failures of a single model call. Transient variants are retried and then
/// degraded to a failed `ModelResponse`; they never abort a batch.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CallError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CallError::Timeout | CallError::Transport(_) | CallError::RateLimited { .. } => true,
            CallError::Http { status, .. } => *status >= 500,
            CallError::Auth(_) | CallError::InvalidResponse(_) => false,
        }
    }
}

/// Dataset-level problems. Fatal for the affected task only.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Task '{task}' has {available} training examples, {requested} shots requested")]
    InsufficientExamples {
        task: String,
        requested: usize,
        available: usize,
    },

    #[error("Split '{split}' of task '{task}' is empty")]
    EmptySplit { task: String, split: String },

    #[error("Could not infer a label key for task '{task}'")]
    MissingLabelKey { task: String },
}

pub type Result<T> = std::result::Result<T, LexError>;
