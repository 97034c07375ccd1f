//! Multimodal analysis and text chat handlers.

use std::future::Future;
use std::time::Duration;

use astro_models::MediaRequest;
use astro_pipeline::{PipelineResult, RequestLogger};
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Response for `/api/process_multimodal`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub final_response: String,
}

/// Body for `/api/chatbot_text`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
}

/// Response for `/api/chatbot_text`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = PipelineResult<T>>,
) -> ApiResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_) => Err(ApiError::Timeout(limit.as_secs())),
    }
}

/// Analyse a recorded clip (`video` file field) plus optional `user_text`.
pub async fn process_multimodal(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisResponse>> {
    let pipeline = state.pipeline()?;

    let mut video: Option<Vec<u8>> = None;
    let mut user_text = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read video: {}", e)))?;
                video = Some(bytes.to_vec());
            }
            Some("user_text") => {
                user_text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read user_text: {}", e)))?;
            }
            other => debug!(field = ?other, "Ignoring multipart field"),
        }
    }

    let video = video.ok_or_else(|| ApiError::bad_request("Missing 'video' file field"))?;
    let logger = RequestLogger::with_id(request_id.as_str(), "multimodal");

    let final_response = with_timeout(
        state.config.request_timeout,
        pipeline.process_with_logger(MediaRequest::new(video, user_text), logger),
    )
    .await?;

    Ok(Json(AnalysisResponse { final_response }))
}

/// Text-only chat against the same conversation engine.
pub async fn chatbot_text(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<ChatMessage>,
) -> ApiResult<Json<ChatResponse>> {
    let pipeline = state.pipeline()?;
    let logger = RequestLogger::with_id(request_id.as_str(), "chat");

    let response = with_timeout(
        state.config.request_timeout,
        pipeline.chat_with_logger(&body.message, logger),
    )
    .await?;

    Ok(Json(ChatResponse { response }))
}
