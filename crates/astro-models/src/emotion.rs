//! Emotion label sets.
//!
//! Each classifier has its own closed label set, declared in the exact order
//! of the model's output vector:
//!
//! - `FacialEmotion`: 7 classes from the facial expression model
//! - `SpeechEmotion`: 8 classes from the speech tone model
//!
//! `Sentinel` covers the reserved non-semantic labels that signal an
//! extraction failure without aborting the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Facial expression classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FacialEmotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl FacialEmotion {
    /// All labels in model output order.
    pub const ALL: &'static [FacialEmotion] = &[
        FacialEmotion::Angry,
        FacialEmotion::Disgust,
        FacialEmotion::Fear,
        FacialEmotion::Happy,
        FacialEmotion::Sad,
        FacialEmotion::Surprise,
        FacialEmotion::Neutral,
    ];

    /// Map a model output index to its label.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacialEmotion::Angry => "Angry",
            FacialEmotion::Disgust => "Disgust",
            FacialEmotion::Fear => "Fear",
            FacialEmotion::Happy => "Happy",
            FacialEmotion::Sad => "Sad",
            FacialEmotion::Surprise => "Surprise",
            FacialEmotion::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for FacialEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Speech tone classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpeechEmotion {
    Angry,
    Calm,
    Disgust,
    Fearful,
    Happy,
    Neutral,
    Sad,
    Surprised,
}

impl SpeechEmotion {
    /// All labels in model output order.
    pub const ALL: &'static [SpeechEmotion] = &[
        SpeechEmotion::Angry,
        SpeechEmotion::Calm,
        SpeechEmotion::Disgust,
        SpeechEmotion::Fearful,
        SpeechEmotion::Happy,
        SpeechEmotion::Neutral,
        SpeechEmotion::Sad,
        SpeechEmotion::Surprised,
    ];

    /// Map a model output index to its label.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechEmotion::Angry => "angry",
            SpeechEmotion::Calm => "calm",
            SpeechEmotion::Disgust => "disgust",
            SpeechEmotion::Fearful => "fearful",
            SpeechEmotion::Happy => "happy",
            SpeechEmotion::Neutral => "neutral",
            SpeechEmotion::Sad => "sad",
            SpeechEmotion::Surprised => "surprised",
        }
    }
}

impl fmt::Display for SpeechEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reserved labels reported when a branch cannot produce an emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    /// Classifier ran but no input produced a usable prediction.
    NoSignal,
    /// Classifier preprocessing or inference failed.
    Error,
    /// Audio branch failed before classification.
    AudioError,
    /// Video branch failed before classification.
    VideoError,
    /// The video decoded to zero frames.
    NoFramesDetected,
}

impl Sentinel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentinel::NoSignal => "no_signal",
            Sentinel::Error => "error",
            Sentinel::AudioError => "audio_error",
            Sentinel::VideoError => "video_error",
            Sentinel::NoFramesDetected => "no_frames_detected",
        }
    }

    /// Returns true if the sentinel reports a fault rather than an absence.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Sentinel::Error | Sentinel::AudioError | Sentinel::VideoError
        )
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label carried by an emotion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EmotionLabel {
    Facial(FacialEmotion),
    Speech(SpeechEmotion),
    Sentinel(Sentinel),
}

impl EmotionLabel {
    /// Returns true if this is a real emotion rather than a sentinel.
    pub fn is_emotion(&self) -> bool {
        !matches!(self, EmotionLabel::Sentinel(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Facial(e) => e.as_str(),
            EmotionLabel::Speech(e) => e.as_str(),
            EmotionLabel::Sentinel(s) => s.as_str(),
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<FacialEmotion> for EmotionLabel {
    fn from(e: FacialEmotion) -> Self {
        EmotionLabel::Facial(e)
    }
}

impl From<SpeechEmotion> for EmotionLabel {
    fn from(e: SpeechEmotion) -> Self {
        EmotionLabel::Speech(e)
    }
}

impl From<Sentinel> for EmotionLabel {
    fn from(s: Sentinel) -> Self {
        EmotionLabel::Sentinel(s)
    }
}
