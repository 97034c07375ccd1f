//! Error types for classifier operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for classifier operations.
pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),
}

impl MlError {
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    pub fn preprocess(message: impl Into<String>) -> Self {
        Self::Preprocess(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }
}
