//! Pipeline behaviour with fake decoder, models and language model.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use astro_media::{MediaDecoder, MediaError, MediaResult, ScratchDir};
use astro_ml::{Inference, MlResult};
use astro_models::{AudioBuffer, EncodedFrame, KnowledgeChunk, MediaRequest, Role};
use astro_pipeline::{PipelineConfig, ServiceParts, ServiceRegistry, ServicesConfig};
use astro_rag::{Embedder, LanguageModel, RagError, RagResult, VectorIndex};
use async_trait::async_trait;
use image::{GrayImage, ImageOutputFormat, Luma};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum FrameMode {
    /// PNG frames whose brightness encodes the facial class
    Class(u8),
    Empty,
    Fail,
    Panic,
    Hang,
}

#[derive(Clone, Copy)]
enum AudioMode {
    Ok,
    Fail,
    Hang,
}

struct FakeDecoder {
    frames: FrameMode,
    audio: AudioMode,
}

fn png_frame(index: usize, class: u8) -> EncodedFrame {
    let img = GrayImage::from_pixel(16, 16, Luma([class]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
    EncodedFrame::new(index, out.into_inner())
}

#[async_trait]
impl MediaDecoder for FakeDecoder {
    async fn extract_frames(&self, video: &Path) -> MediaResult<Vec<EncodedFrame>> {
        assert!(video.exists(), "video must be staged before extraction");
        match self.frames {
            FrameMode::Class(class) => Ok((0..5).map(|i| png_frame(i, class)).collect()),
            FrameMode::Empty => Ok(Vec::new()),
            FrameMode::Fail => Err(MediaError::invalid_video("corrupt container")),
            FrameMode::Panic => panic!("decoder blew up"),
            FrameMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<AudioBuffer> {
        assert!(video.exists(), "video must be staged before extraction");
        // Leave an artifact behind so cleanup is observable.
        tokio::fs::write(output, b"raw pcm").await?;
        match self.audio {
            AudioMode::Ok => {
                let samples = (0..22_050).map(|i| (i as f32 * 0.03).sin() * 0.2).collect();
                Ok(AudioBuffer::new(samples, 22_050))
            }
            AudioMode::Fail => Err(MediaError::NoAudioStream(video.to_path_buf())),
            AudioMode::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(MediaError::EmptyAudio)
            }
        }
    }
}

/// Facial model: one-hot on the brightness of the first pixel.
struct BrightnessModel;

impl Inference for BrightnessModel {
    fn infer(&self, _shape: &[usize], data: Vec<f32>) -> MlResult<Vec<f32>> {
        let class = (data[0] * 255.0).round() as usize;
        let mut scores = vec![0.0; 7];
        scores[class.min(6)] = 1.0;
        Ok(scores)
    }
}

/// Speech model: always "calm".
struct CalmModel;

impl Inference for CalmModel {
    fn infer(&self, _shape: &[usize], _data: Vec<f32>) -> MlResult<Vec<f32>> {
        Ok(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
    }
}

struct FlatEmbedder;

#[async_trait]
impl Embedder for FlatEmbedder {
    async fn embed(&self, texts: &[String]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 1.0]).collect())
    }
}

#[derive(Default)]
struct RecordingLlm {
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait]
impl LanguageModel for RecordingLlm {
    async fn generate(&self, prompt: &str) -> RagResult<String> {
        if self.fail {
            return Err(RagError::ServiceUnavailable("ollama down".into()));
        }
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(prompt.to_string());
        Ok(format!("reply #{}", prompts.len()))
    }
}

impl RecordingLlm {
    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    registry: ServiceRegistry,
    llm: Arc<RecordingLlm>,
    scratch_root: TempDir,
}

impl Harness {
    fn new(frames: FrameMode, audio: AudioMode) -> Self {
        Self::with(frames, audio, RecordingLlm::default(), PipelineConfig::default())
    }

    fn with(frames: FrameMode, audio: AudioMode, llm: RecordingLlm, pipeline: PipelineConfig) -> Self {
        let scratch_root = tempfile::tempdir().unwrap();
        let llm = Arc::new(llm);

        let index = VectorIndex::new(vec![
            KnowledgeChunk::new("Deep breaths help.", vec![1.0, 0.0]),
            KnowledgeChunk::new("Rest is productive.", vec![0.0, 1.0]),
        ])
        .unwrap();

        let parts = ServiceParts {
            decoder: Arc::new(FakeDecoder { frames, audio }),
            facial_model: Arc::new(BrightnessModel),
            speech_model: Arc::new(CalmModel),
            embedder: Arc::new(FlatEmbedder),
            llm: llm.clone(),
            index: Arc::new(index),
            scratch: ScratchDir::create(scratch_root.path()).unwrap(),
        };

        let config = ServicesConfig {
            pipeline,
            ..Default::default()
        };

        Self {
            registry: ServiceRegistry::new(parts, &config),
            llm,
            scratch_root,
        }
    }

    fn scratch_entries(&self) -> usize {
        std::fs::read_dir(self.scratch_root.path()).unwrap().count()
    }
}

fn request(text: &str) -> MediaRequest {
    MediaRequest::new(b"fake webm bytes".to_vec(), text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_end_to_end_happy_face_calm_voice() {
    // facial index 3 = Happy
    let harness = Harness::new(FrameMode::Class(3), AudioMode::Ok);
    let pipeline = harness.registry.pipeline();

    let reply = pipeline.process(request("How am I doing?")).await.unwrap();
    assert!(!reply.is_empty());

    let prompt = harness.llm.last_prompt();
    assert!(prompt.contains("Detected Speech Tone: calm"));
    assert!(prompt.contains("Detected Facial Expression: Happy"));
    assert!(prompt.contains("'How am I doing?'"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_zero_frames_does_not_affect_speech() {
    let harness = Harness::new(FrameMode::Empty, AudioMode::Ok);

    harness.registry.pipeline().process(request("hi")).await.unwrap();

    let prompt = harness.llm.last_prompt();
    assert!(prompt.contains("Detected Facial Expression: no_frames_detected"));
    assert!(prompt.contains("Detected Speech Tone: calm"));
}

#[tokio::test]
async fn test_branch_failures_become_sentinels() {
    let harness = Harness::new(FrameMode::Fail, AudioMode::Fail);

    let reply = harness.registry.pipeline().process(request("")).await.unwrap();
    assert!(!reply.is_empty());

    let prompt = harness.llm.last_prompt();
    assert!(prompt.contains("Detected Speech Tone: audio_error"));
    assert!(prompt.contains("Detected Facial Expression: video_error"));
    assert!(prompt.contains("'No text message provided.'"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_panicking_branch_is_isolated() {
    let harness = Harness::new(FrameMode::Panic, AudioMode::Ok);

    harness.registry.pipeline().process(request("hello")).await.unwrap();

    let prompt = harness.llm.last_prompt();
    assert!(prompt.contains("Detected Facial Expression: video_error"));
    assert!(prompt.contains("Detected Speech Tone: calm"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_branch_timeout_becomes_sentinel() {
    let harness = Harness::with(
        FrameMode::Hang,
        AudioMode::Hang,
        RecordingLlm::default(),
        PipelineConfig {
            max_parallel_branches: 2,
            branch_timeout: Duration::from_millis(200),
        },
    );

    harness.registry.pipeline().process(request("still there?")).await.unwrap();

    let prompt = harness.llm.last_prompt();
    assert!(prompt.contains("Detected Speech Tone: audio_error"));
    assert!(prompt.contains("Detected Facial Expression: video_error"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_scratch_dir_empty_after_every_call() {
    let modes = [
        (FrameMode::Class(6), AudioMode::Ok),
        (FrameMode::Fail, AudioMode::Ok),
        (FrameMode::Class(0), AudioMode::Fail),
        (FrameMode::Empty, AudioMode::Fail),
    ];

    for (frames, audio) in modes {
        let harness = Harness::new(frames, audio);
        let pipeline = harness.registry.pipeline();
        for i in 0..3 {
            pipeline.process(request(&format!("call {i}"))).await.unwrap();
            assert_eq!(harness.scratch_entries(), 0);
        }
    }
}

#[tokio::test]
async fn test_concurrent_requests_share_the_pool() {
    let harness = Harness::with(
        FrameMode::Class(3),
        AudioMode::Ok,
        RecordingLlm::default(),
        PipelineConfig {
            max_parallel_branches: 1,
            branch_timeout: Duration::from_secs(30),
        },
    );
    let pipeline = harness.registry.pipeline();

    let (a, b) = tokio::join!(
        pipeline.process(request("first")),
        pipeline.process(request("second"))
    );
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(harness.llm.prompts.lock().unwrap().len(), 2);
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn test_history_keeps_last_five_exchanges() {
    let harness = Harness::new(FrameMode::Empty, AudioMode::Ok);
    let pipeline = harness.registry.pipeline();

    for i in 1..=6 {
        pipeline.chat(&format!("q{i}")).await.unwrap();
    }

    let history = pipeline.engine().history().await;
    assert_eq!(history.len(), 10);
    let oldest = history.oldest().unwrap();
    assert_eq!(oldest.role, Role::User);
    assert_eq!(oldest.content, "q2");
}

#[tokio::test]
async fn test_empty_chat_is_rejected_without_mutation() {
    let harness = Harness::new(FrameMode::Empty, AudioMode::Ok);
    let pipeline = harness.registry.pipeline();

    let err = pipeline.chat("").await.unwrap_err();
    assert!(err.is_empty_query());
    assert_eq!(err.to_string(), "Input cannot be empty.");
    assert_eq!(pipeline.engine().history().await.len(), 0);
    assert!(harness.llm.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_failure_is_reported_and_history_untouched() {
    let harness = Harness::with(
        FrameMode::Class(3),
        AudioMode::Ok,
        RecordingLlm {
            fail: true,
            ..Default::default()
        },
        PipelineConfig::default(),
    );
    let pipeline = harness.registry.pipeline();

    let err = pipeline.process(request("hello")).await.unwrap_err();
    assert!(err.to_string().contains("Generation failed"));
    assert!(pipeline.engine().history().await.is_empty());
    assert_eq!(harness.scratch_entries(), 0);
}
