//! Router tests against fake services.

use std::path::Path;
use std::sync::{Arc, Mutex};

use astro_api::{create_router, ApiConfig, AppState};
use astro_media::{MediaDecoder, MediaError, MediaResult, ScratchDir};
use astro_ml::{Inference, MlResult};
use astro_models::{AudioBuffer, EncodedFrame, KnowledgeChunk};
use astro_pipeline::{ServiceParts, ServiceRegistry, ServicesConfig};
use astro_rag::{Embedder, LanguageModel, RagError, RagResult, VectorIndex};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Decodes nothing: no frames, no audio stream.
struct SilentDecoder;

#[async_trait]
impl MediaDecoder for SilentDecoder {
    async fn extract_frames(&self, _video: &Path) -> MediaResult<Vec<EncodedFrame>> {
        Ok(Vec::new())
    }

    async fn extract_audio(&self, video: &Path, _output: &Path) -> MediaResult<AudioBuffer> {
        Err(MediaError::NoAudioStream(video.to_path_buf()))
    }
}

struct UniformModel(usize);

impl Inference for UniformModel {
    fn infer(&self, _shape: &[usize], _data: Vec<f32>) -> MlResult<Vec<f32>> {
        Ok(vec![1.0 / self.0 as f32; self.0])
    }
}

struct ConstEmbedder;

#[async_trait]
impl Embedder for ConstEmbedder {
    async fn embed(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }
}

#[derive(Default)]
struct EchoLlm {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl LanguageModel for EchoLlm {
    async fn generate(&self, prompt: &str) -> RagResult<String> {
        if self.fail {
            return Err(RagError::ServiceUnavailable("connection refused".into()));
        }
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("You seem to be doing fine.".to_string())
    }
}

struct TestApp {
    router: Router,
    llm: Arc<EchoLlm>,
    _scratch: TempDir,
}

fn ready_app(llm: EchoLlm) -> TestApp {
    let scratch = tempfile::tempdir().unwrap();
    let llm = Arc::new(llm);

    let parts = ServiceParts {
        decoder: Arc::new(SilentDecoder),
        facial_model: Arc::new(UniformModel(7)),
        speech_model: Arc::new(UniformModel(8)),
        embedder: Arc::new(ConstEmbedder),
        llm: llm.clone(),
        index: Arc::new(
            VectorIndex::new(vec![KnowledgeChunk::new("Breathe slowly.", vec![1.0, 0.0])]).unwrap(),
        ),
        scratch: ScratchDir::create(scratch.path()).unwrap(),
    };
    let registry = ServiceRegistry::new(parts, &ServicesConfig::default());

    TestApp {
        router: create_router(AppState::ready(ApiConfig::default(), registry), None),
        llm,
        _scratch: scratch,
    }
}

fn unavailable_app() -> Router {
    create_router(
        AppState::unavailable(ApiConfig::default(), "model file missing"),
        None,
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn chat_request(message: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chatbot_text")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::json!({ "message": message }).to_string()))
        .unwrap()
}

const BOUNDARY: &str = "astro-test-boundary";

fn multipart_request(video: Option<&[u8]>, user_text: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(video) = video {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"session.webm\"\r\nContent-Type: video/webm\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(video);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(text) = user_text {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_text\"\r\n\r\n{text}\r\n")
                .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/process_multimodal")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = unavailable_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reports_index_size() {
    let app = ready_app(EchoLlm::default());
    let response = app
        .router
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["knowledge_chunks"], 1);
}

#[tokio::test]
async fn test_ready_reports_startup_fault() {
    let response = unavailable_app()
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["error"], "model file missing");
}

#[tokio::test]
async fn test_requests_get_503_when_degraded() {
    let response = unavailable_app().oneshot(chat_request("hello")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["detail"], "dependency unavailable");
}

#[tokio::test]
async fn test_chatbot_text() {
    let app = ready_app(EchoLlm::default());
    let response = app.router.oneshot(chat_request("I feel tired")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["response"],
        "You seem to be doing fine."
    );
    let prompts = app.llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("I feel tired"));
    assert!(prompts[0].contains("Breathe slowly."));
}

#[tokio::test]
async fn test_chatbot_text_rejects_empty_message() {
    let app = ready_app(EchoLlm::default());
    let response = app.router.oneshot(chat_request("")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["detail"], "Input cannot be empty.");
    assert!(app.llm.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_failure_maps_to_bad_gateway() {
    let app = ready_app(EchoLlm {
        fail: true,
        ..Default::default()
    });
    let response = app.router.oneshot(chat_request("hello")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_process_multimodal() {
    let app = ready_app(EchoLlm::default());
    let response = app
        .router
        .oneshot(multipart_request(Some(b"not really webm"), Some("How am I doing?")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await["final_response"],
        "You seem to be doing fine."
    );

    let prompts = app.llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Detected Speech Tone: audio_error"));
    assert!(prompts[0].contains("Detected Facial Expression: no_frames_detected"));
    assert!(prompts[0].contains("'How am I doing?'"));
}

#[tokio::test]
async fn test_process_multimodal_without_text() {
    let app = ready_app(EchoLlm::default());
    let response = app
        .router
        .oneshot(multipart_request(Some(b"clip"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = app.llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("'No text message provided.'"));
}

#[tokio::test]
async fn test_process_multimodal_requires_video() {
    let app = ready_app(EchoLlm::default());
    let response = app
        .router
        .oneshot(multipart_request(None, Some("hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.llm.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let response = unavailable_app()
        .oneshot(
            Request::get("/health")
                .header("X-Request-ID", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let response = unavailable_app()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let response = unavailable_app()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
