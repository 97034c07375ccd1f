//! RAG configuration.

use std::path::PathBuf;
use std::time::Duration;

use astro_models::MAX_HISTORY_TURNS;

/// Ollama connection settings.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    pub base_url: String,
    /// Chat model tag
    pub chat_model: String,
    /// Embedding model tag
    pub embed_model: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Max retries on transient failures
    pub max_retries: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            chat_model: "gemma3:1b".to_string(),
            embed_model: "nomic-embed-text:latest".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }
}

impl OllamaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OLLAMA_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            chat_model: std::env::var("OLLAMA_CHAT_MODEL").unwrap_or(defaults.chat_model),
            embed_model: std::env::var("OLLAMA_EMBED_MODEL").unwrap_or(defaults.embed_model),
            timeout: Duration::from_secs(
                std::env::var("OLLAMA_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("OLLAMA_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }
}

/// Corpus indexing settings.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Reference corpus (plain text)
    pub corpus_path: PathBuf,
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between neighbouring chunks in characters
    pub chunk_overlap: usize,
    /// Concurrent embedding requests during the build
    pub embed_parallelism: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("data/knowledge.txt"),
            chunk_size: 500,
            chunk_overlap: 200,
            embed_parallelism: 4,
        }
    }
}

impl IndexConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            corpus_path: std::env::var("RAG_CORPUS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.corpus_path),
            chunk_size: std::env::var("RAG_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.chunk_size),
            chunk_overlap: std::env::var("RAG_CHUNK_OVERLAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.chunk_overlap),
            embed_parallelism: std::env::var("RAG_EMBED_PARALLEL")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.embed_parallelism),
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chunks retrieved per query
    pub top_k: usize,
    /// Turns kept in history
    pub history_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            history_turns: MAX_HISTORY_TURNS,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            top_k: std::env::var("RAG_TOP_K")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
            history_turns: MAX_HISTORY_TURNS,
        }
    }
}
