//! API error types.

use astro_pipeline::PipelineError;
use astro_rag::{RagError, EMPTY_QUERY_MESSAGE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Body detail for requests that arrive while services are down.
pub const UNAVAILABLE_DETAIL: &str = "dependency unavailable";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Models, tooling or the knowledge index never came up.
    #[error("Dependency unavailable: {0}")]
    Unavailable(String),

    /// The language model or embedding service failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Rag(RagError::EmptyQuery) => {
                ApiError::BadRequest(EMPTY_QUERY_MESSAGE.to_string())
            }
            PipelineError::Rag(e) => ApiError::Upstream(e.to_string()),
            PipelineError::Startup(msg) => ApiError::Unavailable(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match &self {
            ApiError::Unavailable(_) => UNAVAILABLE_DETAIL.to_string(),
            // Don't expose upstream error details in production
            ApiError::Upstream(_) => {
                if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
                    "An internal error occurred".to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
