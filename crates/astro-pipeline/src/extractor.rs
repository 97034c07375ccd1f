//! Parallel signal extraction.
//!
//! The speech and facial branches run as separate tasks gated by one
//! semaphore shared across all requests. Each branch always yields an
//! [`EmotionSignal`]: decode failures, panics and timeouts are turned into
//! sentinel labels before the join, so neither branch can fail the other.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use astro_media::{MediaDecoder, ScratchDir, ScratchKind};
use astro_ml::{FacialEmotionClassifier, SpeechEmotionClassifier};
use astro_models::{EmotionSignal, Sentinel, SignalSource};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::config::PipelineConfig;

/// Runs both extraction branches for one video.
#[derive(Clone)]
pub struct SignalExtractor {
    decoder: Arc<dyn MediaDecoder>,
    facial: Arc<FacialEmotionClassifier>,
    speech: Arc<SpeechEmotionClassifier>,
    scratch: ScratchDir,
    permits: Arc<Semaphore>,
    branch_timeout: Duration,
}

impl SignalExtractor {
    pub fn new(
        decoder: Arc<dyn MediaDecoder>,
        facial: Arc<FacialEmotionClassifier>,
        speech: Arc<SpeechEmotionClassifier>,
        scratch: ScratchDir,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            decoder,
            facial,
            speech,
            scratch,
            permits: Arc::new(Semaphore::new(config.max_parallel_branches.max(1))),
            branch_timeout: config.branch_timeout,
        }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Extract `(speech, facial)` signals from a video on disk.
    ///
    /// Both branches are always awaited; there is no early return.
    pub async fn extract_signals(&self, video: &Path) -> (EmotionSignal, EmotionSignal) {
        let speech_task = tokio::spawn(self.clone().run_branch(
            SignalSource::Speech,
            self.clone().speech_branch(video.to_path_buf()),
        ));
        let facial_task = tokio::spawn(self.clone().run_branch(
            SignalSource::Facial,
            self.clone().facial_branch(video.to_path_buf()),
        ));

        let (speech, facial) = tokio::join!(speech_task, facial_task);

        let speech = speech.unwrap_or_else(|e| {
            warn!(error = %e, "Speech branch task failed");
            EmotionSignal::failed(SignalSource::Speech)
        });
        let facial = facial.unwrap_or_else(|e| {
            warn!(error = %e, "Facial branch task failed");
            EmotionSignal::failed(SignalSource::Facial)
        });

        for signal in [&speech, &facial] {
            metrics::counter!(
                "astro_signal_total",
                "source" => signal.source().as_str(),
                "status" => signal.status().as_str()
            )
            .increment(1);
        }

        (speech, facial)
    }

    /// Gate a branch on the shared pool and bound it in time.
    async fn run_branch<F>(self, source: SignalSource, branch: F) -> EmotionSignal
    where
        F: Future<Output = EmotionSignal>,
    {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => return EmotionSignal::failed(source),
        };

        match tokio::time::timeout(self.branch_timeout, branch).await {
            Ok(signal) => signal,
            Err(_) => {
                warn!(
                    source = source.as_str(),
                    timeout_secs = self.branch_timeout.as_secs(),
                    "Extraction branch timed out"
                );
                EmotionSignal::failed(source)
            }
        }
    }

    async fn speech_branch(self, video: PathBuf) -> EmotionSignal {
        let decoder = self.decoder.clone();
        let audio = self
            .scratch
            .with_scratch_file(ScratchKind::Audio, |output| async move {
                decoder.extract_audio(&video, &output).await
            })
            .await;

        let audio = match audio {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "Audio extraction failed");
                return EmotionSignal::speech(Sentinel::AudioError);
            }
        };

        debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            "Classifying speech"
        );

        let speech = self.speech.clone();
        match tokio::task::spawn_blocking(move || speech.classify_audio(&audio)).await {
            Ok(label) => EmotionSignal::speech(label),
            Err(e) => {
                warn!(error = %e, "Speech classification task failed");
                EmotionSignal::speech(Sentinel::AudioError)
            }
        }
    }

    async fn facial_branch(self, video: PathBuf) -> EmotionSignal {
        let frames = match self.decoder.extract_frames(&video).await {
            Ok(frames) => frames,
            Err(e) => {
                warn!(error = %e, "Frame extraction failed");
                return EmotionSignal::facial(Sentinel::VideoError);
            }
        };

        if frames.is_empty() {
            debug!("No frames decoded");
            return EmotionSignal::facial(Sentinel::NoFramesDetected);
        }

        debug!(frames = frames.len(), "Classifying frames");

        let facial = self.facial.clone();
        match tokio::task::spawn_blocking(move || facial.classify_sequence(&frames)).await {
            Ok(label) => EmotionSignal::facial(label),
            Err(e) => {
                warn!(error = %e, "Facial classification task failed");
                EmotionSignal::facial(Sentinel::VideoError)
            }
        }
    }
}
