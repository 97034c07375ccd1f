//! In-memory vector index over the knowledge corpus.

use std::path::Path;

use astro_models::KnowledgeChunk;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::info;

use crate::client::Embedder;
use crate::config::IndexConfig;
use crate::error::{RagError, RagResult};
use crate::splitter::RecursiveSplitter;

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a KnowledgeChunk,
    pub score: f32,
}

/// Immutable set of embedded chunks. Safe to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<KnowledgeChunk>,
    dim: usize,
}

impl VectorIndex {
    /// Build from pre-embedded chunks. All embeddings must share one
    /// non-zero dimension.
    pub fn new(chunks: Vec<KnowledgeChunk>) -> RagResult<Self> {
        let dim = chunks
            .first()
            .map(KnowledgeChunk::dim)
            .ok_or_else(|| RagError::index_build("no chunks to index"))?;

        if dim == 0 {
            return Err(RagError::index_build("embeddings are empty"));
        }
        if let Some(bad) = chunks.iter().position(|c| c.dim() != dim) {
            return Err(RagError::index_build(format!(
                "chunk {} has dimension {}, expected {}",
                bad,
                chunks[bad].dim(),
                dim
            )));
        }

        Ok(Self { chunks, dim })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Top `k` chunks by cosine similarity, best first. Equal scores keep
    /// corpus order.
    pub fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<ScoredChunk<'_>>> {
        if query.len() != self.dim {
            return Err(RagError::Retrieval(format!(
                "query has dimension {}, index has {}",
                query.len(),
                self.dim
            )));
        }

        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk,
                score: cosine(query, chunk.embedding()),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

/// Read, split, embed and index the reference corpus.
///
/// Any failure here is a startup fault.
pub async fn build_index(config: &IndexConfig, embedder: &dyn Embedder) -> RagResult<VectorIndex> {
    let text = read_corpus(&config.corpus_path).await?;

    let splitter = RecursiveSplitter::new(config.chunk_size, config.chunk_overlap);
    let pieces = splitter.split(&text);
    if pieces.is_empty() {
        return Err(RagError::index_build(format!(
            "corpus {} is empty",
            config.corpus_path.display()
        )));
    }

    info!(
        corpus = %config.corpus_path.display(),
        chunks = pieces.len(),
        parallelism = config.embed_parallelism,
        "Embedding knowledge corpus"
    );

    let chunks: Vec<KnowledgeChunk> = stream::iter(pieces)
        .map(|piece| async move {
            let embedding = embedder.embed_one(&piece).await?;
            Ok::<_, RagError>(KnowledgeChunk::new(piece, embedding))
        })
        .buffered(config.embed_parallelism.max(1))
        .try_collect()
        .await
        .map_err(|e| RagError::index_build(format!("embedding failed: {e}")))?;

    let index = VectorIndex::new(chunks)?;
    info!(chunks = index.len(), dim = index.dim(), "Knowledge index ready");
    Ok(index)
}

async fn read_corpus(path: &Path) -> RagResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RagError::index_build(format!("cannot read {}: {}", path.display(), e)))
}
