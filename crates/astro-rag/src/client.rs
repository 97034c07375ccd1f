//! Ollama HTTP client.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OllamaConfig;
use crate::error::{RagError, RagResult};
use crate::retry::{retry_async, RetryConfig};

/// Text embedding backend.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input in input order.
    async fn embed(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> RagResult<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::InvalidResponse("no embedding returned".to_string()))
    }
}

/// Text generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> RagResult<String>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    http: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> RagResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RagError::Network)?;

        Ok(Self { http, config })
    }

    fn retry_config(&self, operation: &'static str) -> RetryConfig {
        RetryConfig::new(operation).with_max_retries(self.config.max_retries)
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> RagResult<Response> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(RagError::Network)?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::ServiceUnavailable(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::RequestFailed(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.config.embed_model,
            input: texts,
        };

        let response = retry_async(
            &self.retry_config("ollama_embed"),
            RagError::is_retryable,
            || self.post_json("/api/embed", &request),
        )
        .await?;

        let parsed: EmbedResponse = response.json().await?;
        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> RagResult<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let result = retry_async(
            &self.retry_config("ollama_chat"),
            RagError::is_retryable,
            || self.post_json("/api/chat", &request),
        )
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                metrics::counter!("astro_llm_requests_total", "status" => "error").increment(1);
                return Err(e);
            }
        };

        let parsed: ChatResponse = response.json().await?;
        metrics::counter!("astro_llm_requests_total", "status" => "ok").increment(1);

        Ok(parsed.message.content)
    }
}
