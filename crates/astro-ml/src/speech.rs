//! Speech emotion classifier.

use std::sync::Arc;

use astro_models::{AudioBuffer, EmotionLabel, Sentinel, SpeechEmotion};
use tracing::warn;

use crate::error::{MlError, MlResult};
use crate::inference::{argmax, Inference};
use crate::preprocess::{MfccExtractor, MFCC_FRAMES, N_MFCC};

/// Sample rate the speech model was trained on.
pub const SPEECH_SAMPLE_RATE: u32 = 22_050;

/// Classifies an audio clip into one of eight speech emotions.
#[derive(Clone)]
pub struct SpeechEmotionClassifier {
    model: Arc<dyn Inference>,
    mfcc: Arc<MfccExtractor>,
}

impl std::fmt::Debug for SpeechEmotionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechEmotionClassifier")
            .field("mfcc", &self.mfcc)
            .finish_non_exhaustive()
    }
}

impl SpeechEmotionClassifier {
    pub fn new(model: Arc<dyn Inference>) -> Self {
        Self {
            model,
            mfcc: Arc::new(MfccExtractor::new(SPEECH_SAMPLE_RATE)),
        }
    }

    /// Classify a clip. Every failure collapses to [`Sentinel::Error`].
    pub fn classify_audio(&self, buffer: &AudioBuffer) -> EmotionLabel {
        match self.try_classify(buffer) {
            Ok(label) => EmotionLabel::Speech(label),
            Err(e) => {
                warn!(error = %e, "Speech classification failed");
                EmotionLabel::Sentinel(Sentinel::Error)
            }
        }
    }

    /// Classify a clip, surfacing the failure reason.
    pub fn try_classify(&self, buffer: &AudioBuffer) -> MlResult<SpeechEmotion> {
        if buffer.is_empty() {
            return Err(MlError::preprocess("empty audio"));
        }
        if buffer.sample_rate == 0 {
            return Err(MlError::preprocess("sample rate is zero"));
        }

        let samples = resample_linear(&buffer.samples, buffer.sample_rate, SPEECH_SAMPLE_RATE);
        let features = self.mfcc.features(&samples)?;
        let scores = self.model.infer(&[1, N_MFCC, MFCC_FRAMES, 1], features)?;

        if scores.len() != SpeechEmotion::ALL.len() {
            return Err(MlError::invalid_output(format!(
                "expected {} scores, got {}",
                SpeechEmotion::ALL.len(),
                scores.len()
            )));
        }

        argmax(&scores)
            .and_then(SpeechEmotion::from_index)
            .ok_or_else(|| MlError::invalid_output("no finite score"))
    }
}

/// Linear-interpolation resampler. Identity when the rates match.
fn resample_linear(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.len() < 2 {
        return samples.to_vec();
    }

    let ratio = from as f64 / to as f64;
    let out_len = ((samples.len() as f64) / ratio).round().max(1.0) as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] * (1.0 - frac) + samples[next] * frac
        })
        .collect()
}
