//! Facial expression classifier.

use std::sync::Arc;

use astro_models::{EmotionLabel, EncodedFrame, FacialEmotion, Sentinel};
use tracing::{debug, warn};

use crate::error::{MlError, MlResult};
use crate::inference::{argmax, Inference};
use crate::preprocess::{frame_to_tensor, FACE_INPUT_SIZE};

/// Classifies frames into one of seven facial expressions.
#[derive(Clone)]
pub struct FacialEmotionClassifier {
    model: Arc<dyn Inference>,
}

impl std::fmt::Debug for FacialEmotionClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacialEmotionClassifier").finish_non_exhaustive()
    }
}

impl FacialEmotionClassifier {
    pub fn new(model: Arc<dyn Inference>) -> Self {
        Self { model }
    }

    /// Classify one encoded frame.
    pub fn classify_frame(&self, image_bytes: &[u8]) -> MlResult<FacialEmotion> {
        let input = frame_to_tensor(image_bytes)?;
        let side = FACE_INPUT_SIZE as usize;
        let scores = self.model.infer(&[1, side, side, 1], input)?;

        if scores.len() != FacialEmotion::ALL.len() {
            return Err(MlError::invalid_output(format!(
                "expected {} scores, got {}",
                FacialEmotion::ALL.len(),
                scores.len()
            )));
        }

        argmax(&scores)
            .and_then(FacialEmotion::from_index)
            .ok_or_else(|| MlError::invalid_output("no finite score"))
    }

    /// Majority vote over a frame sequence.
    ///
    /// Frames that fail to classify are skipped. Ties go to the label seen
    /// first. No successful frame yields [`Sentinel::NoSignal`].
    pub fn classify_sequence(&self, frames: &[EncodedFrame]) -> EmotionLabel {
        let mut votes: Vec<(FacialEmotion, usize)> = Vec::new();
        let mut failed = 0usize;

        for frame in frames {
            match self.classify_frame(&frame.data) {
                Ok(label) => match votes.iter_mut().find(|(l, _)| *l == label) {
                    Some((_, count)) => *count += 1,
                    None => votes.push((label, 1)),
                },
                Err(e) => {
                    failed += 1;
                    debug!(frame = frame.index, error = %e, "Frame classification failed");
                }
            }
        }

        if failed > 0 {
            warn!(failed, total = frames.len(), "Some frames could not be classified");
        }

        // `votes` is in first-seen order; only a strictly larger count
        // replaces the leader.
        let mut winner: Option<(FacialEmotion, usize)> = None;
        for (label, count) in votes {
            match winner {
                Some((_, best)) if count <= best => {}
                _ => winner = Some((label, count)),
            }
        }

        match winner {
            Some((label, _)) => EmotionLabel::Facial(label),
            None => EmotionLabel::Sentinel(Sentinel::NoSignal),
        }
    }
}
