//! Conversational retrieval engine.

use std::sync::Arc;

use astro_models::ChatHistory;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::{Embedder, LanguageModel};
use crate::config::EngineConfig;
use crate::error::{RagError, RagResult};
use crate::index::VectorIndex;
use crate::prompt::{format_context, render_prompt};

/// Answers queries against the knowledge index, keeping a bounded
/// conversation history.
///
/// Calls on one engine are serialised: the history lock is held from
/// retrieval until the new exchange is recorded, so every prompt sees the
/// history left by the previous call.
pub struct ConversationEngine {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
    history: Mutex<ChatHistory>,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        config: EngineConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            llm,
            history: Mutex::new(ChatHistory::with_capacity(config.history_turns)),
            config,
        }
    }

    /// Answer one query.
    ///
    /// An empty query is rejected with [`RagError::EmptyQuery`] and leaves the
    /// history untouched, as does any retrieval or generation failure.
    pub async fn respond(&self, query: &str) -> RagResult<String> {
        if query.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let mut history = self.history.lock().await;

        let query_embedding = self
            .embedder
            .embed_one(query)
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        let hits = self.index.search(&query_embedding, self.config.top_k)?;
        debug!(
            hits = hits.len(),
            best_score = hits.first().map(|h| h.score).unwrap_or(0.0),
            "Retrieved context"
        );
        let context = format_context(hits.iter().map(|h| h.chunk.text()));

        let prompt = render_prompt(&history.render_transcript(), &context, query);

        let answer = match self.llm.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Generation failed, history unchanged");
                return Err(RagError::Generation(e.to_string()));
            }
        };

        history.push_exchange(query, answer.as_str());
        info!(
            history_turns = history.len(),
            answer_chars = answer.len(),
            "Recorded exchange"
        );

        Ok(answer)
    }

    /// Snapshot of the current history.
    pub async fn history(&self) -> ChatHistory {
        self.history.lock().await.clone()
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_models::{KnowledgeChunk, Role, NO_HISTORY_PLACEHOLDER};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Embeds text by counting two keywords.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.matches("star").count() as f32 + 0.01,
                        t.matches("planet").count() as f32 + 0.01,
                    ]
                })
                .collect())
        }
    }

    /// Records prompts and answers with a counter.
    #[derive(Default)]
    struct RecordingLlm {
        prompts: StdMutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl LanguageModel for RecordingLlm {
        async fn generate(&self, prompt: &str) -> RagResult<String> {
            if self.fail {
                return Err(RagError::ServiceUnavailable("down".into()));
            }
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            Ok(format!("answer {}", prompts.len()))
        }
    }

    /// Answers after a delay, echoing the query it was asked.
    struct SlowEchoLlm;

    #[async_trait]
    impl LanguageModel for SlowEchoLlm {
        async fn generate(&self, prompt: &str) -> RagResult<String> {
            let question = prompt
                .split("User Input: ")
                .nth(1)
                .and_then(|rest| rest.lines().next())
                .unwrap_or_default()
                .to_string();
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok(format!("ans-{question}"))
        }
    }

    fn engine_with(llm: Arc<dyn LanguageModel>) -> ConversationEngine {
        let index = VectorIndex::new(vec![
            KnowledgeChunk::new("stars are hot", vec![1.0, 0.0]),
            KnowledgeChunk::new("planets orbit", vec![0.0, 1.0]),
        ])
        .unwrap();
        ConversationEngine::new(
            Arc::new(index),
            Arc::new(KeywordEmbedder),
            llm,
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_first_prompt_has_placeholder_history_and_context() {
        let llm = Arc::new(RecordingLlm::default());
        let engine = engine_with(llm.clone());

        let answer = engine.respond("tell me about a star").await.unwrap();
        assert_eq!(answer, "answer 1");

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[0].contains(NO_HISTORY_PLACEHOLDER));
        assert!(prompts[0].contains("Retrieved Context: stars are hot\n\nplanets orbit"));
        assert!(prompts[0].contains("User Input: tell me about a star"));
    }

    #[tokio::test]
    async fn test_history_flows_into_next_prompt() {
        let llm = Arc::new(RecordingLlm::default());
        let engine = engine_with(llm.clone());

        engine.respond("first").await.unwrap();
        engine.respond("second").await.unwrap();

        let prompts = llm.prompts.lock().unwrap();
        assert!(prompts[1].contains("User: first\nAssistant: answer 1"));
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let llm = Arc::new(RecordingLlm::default());
        let engine = engine_with(llm);

        for i in 1..=6 {
            engine.respond(&format!("q{i}")).await.unwrap();
        }

        let history = engine.history().await;
        assert_eq!(history.len(), 10);
        let oldest = history.oldest().unwrap();
        assert_eq!(oldest.role, Role::User);
        assert_eq!(oldest.content, "q2");
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_mutation() {
        let llm = Arc::new(RecordingLlm::default());
        let engine = engine_with(llm.clone());
        engine.respond("hello").await.unwrap();

        let err = engine.respond("").await.unwrap_err();
        assert!(matches!(err, RagError::EmptyQuery));
        assert_eq!(err.to_string(), "Input cannot be empty.");
        assert_eq!(engine.history().await.len(), 2);
        assert_eq!(llm.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_history() {
        let llm = Arc::new(RecordingLlm {
            fail: true,
            ..Default::default()
        });
        let engine = engine_with(llm);

        let err = engine.respond("hello").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
        assert!(engine.history().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_queries_keep_exchanges_paired() {
        let engine = Arc::new(engine_with(Arc::new(SlowEchoLlm)));

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.respond(&format!("q{i}")).await })
            })
            .collect();
        for task in tasks {
            let query_answer = task.await.unwrap().unwrap();
            assert!(query_answer.starts_with("ans-q"));
        }

        let history = engine.history().await;
        assert_eq!(history.len(), 10);

        let turns: Vec<_> = history.turns().collect();
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("ans-{}", pair[0].content));
        }
    }
}
