//! Knowledge corpus chunks.

use serde::{Deserialize, Serialize};

/// One chunk of the reference corpus with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    text: String,
    embedding: Vec<f32>,
}

impl KnowledgeChunk {
    pub fn new(text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            embedding,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// Embedding dimensionality.
    pub fn dim(&self) -> usize {
        self.embedding.len()
    }
}
