//! Service registry: everything a request needs, built once at startup.

use std::sync::Arc;

use astro_media::{MediaDecoder, ScratchDir};
use astro_ml::{FacialEmotionClassifier, Inference, SpeechEmotionClassifier};
use astro_rag::{ConversationEngine, Embedder, LanguageModel, VectorIndex};
use tracing::info;

use crate::config::ServicesConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::extractor::SignalExtractor;
use crate::pipeline::MultimodalPipeline;

/// Pre-built components. Production code gets these from
/// [`ServiceRegistry::initialize`]; tests supply fakes.
pub struct ServiceParts {
    pub decoder: Arc<dyn MediaDecoder>,
    pub facial_model: Arc<dyn Inference>,
    pub speech_model: Arc<dyn Inference>,
    pub embedder: Arc<dyn Embedder>,
    pub llm: Arc<dyn LanguageModel>,
    pub index: Arc<VectorIndex>,
    pub scratch: ScratchDir,
}

/// Shared, immutable handle to the running services.
#[derive(Clone)]
pub struct ServiceRegistry {
    pipeline: Arc<MultimodalPipeline>,
}

impl ServiceRegistry {
    /// Wire up a registry from ready components.
    pub fn new(parts: ServiceParts, config: &ServicesConfig) -> Self {
        let facial = Arc::new(FacialEmotionClassifier::new(parts.facial_model));
        let speech = Arc::new(SpeechEmotionClassifier::new(parts.speech_model));

        let extractor = SignalExtractor::new(
            parts.decoder,
            facial,
            speech,
            parts.scratch,
            &config.pipeline,
        );

        let engine = Arc::new(ConversationEngine::new(
            parts.index,
            parts.embedder,
            parts.llm,
            config.engine.clone(),
        ));

        Self {
            pipeline: Arc::new(MultimodalPipeline::new(extractor, engine)),
        }
    }

    /// Load models, check tooling and build the knowledge index.
    ///
    /// Any failure is a startup fault; the caller decides whether to keep
    /// serving in a degraded state.
    #[cfg(feature = "onnx")]
    pub async fn initialize(config: &ServicesConfig) -> PipelineResult<Self> {
        use astro_media::{check_ffmpeg, check_ffprobe, FfmpegDecoder};
        use astro_ml::OrtModel;
        use astro_rag::{build_index, OllamaClient};

        let ffmpeg = check_ffmpeg().map_err(|e| PipelineError::startup(e.to_string()))?;
        check_ffprobe().map_err(|e| PipelineError::startup(e.to_string()))?;
        info!(ffmpeg = %ffmpeg.display(), "FFmpeg found");

        let scratch = ScratchDir::create(&config.media.scratch_dir).map_err(|e| {
            PipelineError::startup(format!(
                "scratch dir {}: {}",
                config.media.scratch_dir.display(),
                e
            ))
        })?;

        let ml = config.ml.clone();
        let (facial_model, speech_model) = tokio::task::spawn_blocking(move || {
            let facial = OrtModel::load(&ml.facial_model_path, ml.ort_threads)?;
            let speech = OrtModel::load(&ml.speech_model_path, ml.ort_threads)?;
            Ok::<_, astro_ml::MlError>((facial, speech))
        })
        .await
        .map_err(|e| PipelineError::startup(format!("model loader panicked: {}", e)))?
        .map_err(|e| PipelineError::startup(format!("model load: {}", e)))?;
        info!("Emotion models loaded");

        let client = Arc::new(
            OllamaClient::new(config.ollama.clone())
                .map_err(|e| PipelineError::startup(format!("ollama client: {}", e)))?,
        );
        let index = build_index(&config.index, client.as_ref())
            .await
            .map_err(|e| PipelineError::startup(e.to_string()))?;

        let parts = ServiceParts {
            decoder: Arc::new(FfmpegDecoder::new(&config.media)),
            facial_model: Arc::new(facial_model),
            speech_model: Arc::new(speech_model),
            embedder: client.clone(),
            llm: client,
            index: Arc::new(index),
            scratch,
        };

        info!("All services initialised");
        Ok(Self::new(parts, config))
    }

    /// Without an inference backend compiled in, startup always fails.
    #[cfg(not(feature = "onnx"))]
    pub async fn initialize(_config: &ServicesConfig) -> PipelineResult<Self> {
        Err(PipelineError::startup("built without the onnx feature"))
    }

    pub fn pipeline(&self) -> Arc<MultimodalPipeline> {
        self.pipeline.clone()
    }
}
