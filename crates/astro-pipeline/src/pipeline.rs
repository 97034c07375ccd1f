//! Request orchestration.

use std::sync::Arc;

use astro_media::ScratchKind;
use astro_models::{EmotionSignal, MediaRequest, SignalSource};
use astro_rag::ConversationEngine;
use tracing::Instrument;

use crate::error::PipelineResult;
use crate::extractor::SignalExtractor;
use crate::fusion::fuse;
use crate::logging::RequestLogger;

/// The two request entry points: multimodal analysis and text chat.
#[derive(Clone)]
pub struct MultimodalPipeline {
    extractor: SignalExtractor,
    engine: Arc<ConversationEngine>,
}

impl MultimodalPipeline {
    pub fn new(extractor: SignalExtractor, engine: Arc<ConversationEngine>) -> Self {
        Self { extractor, engine }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Analyse a recorded clip and answer the fused query.
    ///
    /// Per-branch faults surface as sentinel labels inside the query; only
    /// the conversation engine can fail the request.
    pub async fn process(&self, request: MediaRequest) -> PipelineResult<String> {
        let logger = RequestLogger::new("multimodal");
        self.process_with_logger(request, logger).await
    }

    pub async fn process_with_logger(
        &self,
        request: MediaRequest,
        logger: RequestLogger,
    ) -> PipelineResult<String> {
        let span = logger.create_span();
        async move {
            logger.log_start(&format!(
                "{} video bytes, text: {}",
                request.video_bytes.len(),
                request.has_text()
            ));

            let (speech, facial) = match self
                .extractor
                .scratch()
                .materialize(ScratchKind::Video, &request.video_bytes)
                .await
            {
                Ok(video) => {
                    let signals = self.extractor.extract_signals(video.path()).await;
                    video.release();
                    signals
                }
                Err(e) => {
                    logger.log_warning(&format!("could not stage upload: {}", e));
                    (
                        EmotionSignal::failed(SignalSource::Speech),
                        EmotionSignal::failed(SignalSource::Facial),
                    )
                }
            };

            logger.log_progress(&format!(
                "speech={} ({}), facial={} ({})",
                speech.label(),
                speech.status().as_str(),
                facial.label(),
                facial.status().as_str()
            ));

            let query = fuse(&speech, &facial, &request.user_text);

            match self.engine.respond(query.as_str()).await {
                Ok(answer) => {
                    logger.log_completion(&format!("{} chars", answer.len()));
                    Ok(answer)
                }
                Err(e) => {
                    logger.log_error(&e.to_string());
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Text-only chat.
    pub async fn chat(&self, message: &str) -> PipelineResult<String> {
        let logger = RequestLogger::new("chat");
        self.chat_with_logger(message, logger).await
    }

    pub async fn chat_with_logger(&self, message: &str, logger: RequestLogger) -> PipelineResult<String> {
        let span = logger.create_span();
        async move {
            logger.log_start(&format!("{} chars", message.len()));

            match self.engine.respond(message).await {
                Ok(answer) => {
                    logger.log_completion(&format!("{} chars", answer.len()));
                    Ok(answer)
                }
                Err(e) => {
                    logger.log_warning(&e.to_string());
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
