//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A model, the index or the corpus failed to come up.
    #[error("Startup failed: {0}")]
    Startup(String),

    #[error(transparent)]
    Rag(#[from] astro_rag::RagError),
}

impl PipelineError {
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Rejected empty query.
    pub fn is_empty_query(&self) -> bool {
        matches!(self, PipelineError::Rag(astro_rag::RagError::EmptyQuery))
    }
}
