//! Retrieval-augmented conversation engine.
//!
//! This crate provides:
//! - [`OllamaClient`]: embeddings and chat completions over Ollama's HTTP API
//! - A recursive character splitter for the reference corpus
//! - [`VectorIndex`]: an immutable in-memory cosine-similarity index
//! - [`ConversationEngine`]: retrieval + bounded history + one generation
//!   call per query

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod prompt;
pub mod retry;
pub mod splitter;

pub use client::{Embedder, LanguageModel, OllamaClient};
pub use config::{EngineConfig, IndexConfig, OllamaConfig};
pub use engine::ConversationEngine;
pub use error::{RagError, RagResult, EMPTY_QUERY_MESSAGE};
pub use index::{build_index, ScoredChunk, VectorIndex};
pub use splitter::RecursiveSplitter;
