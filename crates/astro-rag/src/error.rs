//! RAG error types.

use thiserror::Error;

pub type RagResult<T> = Result<T, RagError>;

/// User-visible text returned for an empty query.
pub const EMPTY_QUERY_MESSAGE: &str = "Input cannot be empty.";

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Input cannot be empty.")]
    EmptyQuery,

    #[error("Failed to build knowledge index: {0}")]
    IndexBuild(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Ollama unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RagError {
    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild(message.into())
    }

    /// Connect failures, timeouts and 5xx responses are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            RagError::ServiceUnavailable(_) => true,
            RagError::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
