//! Emotion signals produced by the extraction branches.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::emotion::{EmotionLabel, Sentinel};

/// Which branch produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    Speech,
    Facial,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Speech => "speech",
            SignalSource::Facial => "facial",
        }
    }
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Ok,
    NoSignal,
    Error,
}

impl SignalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Ok => "ok",
            SignalStatus::NoSignal => "no_signal",
            SignalStatus::Error => "error",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One emotion reading from one branch.
///
/// The status is derived from the label, so a signal can never claim `ok`
/// while carrying a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionSignal {
    source: SignalSource,
    label: EmotionLabel,
    status: SignalStatus,
}

impl EmotionSignal {
    /// Create a signal from a branch label.
    pub fn new(source: SignalSource, label: impl Into<EmotionLabel>) -> Self {
        let label = label.into();
        let status = match label {
            EmotionLabel::Facial(_) | EmotionLabel::Speech(_) => SignalStatus::Ok,
            EmotionLabel::Sentinel(s) if s.is_fault() => SignalStatus::Error,
            EmotionLabel::Sentinel(_) => SignalStatus::NoSignal,
        };
        Self {
            source,
            label,
            status,
        }
    }

    /// Speech signal.
    pub fn speech(label: impl Into<EmotionLabel>) -> Self {
        Self::new(SignalSource::Speech, label)
    }

    /// Facial signal.
    pub fn facial(label: impl Into<EmotionLabel>) -> Self {
        Self::new(SignalSource::Facial, label)
    }

    /// Signal for a branch that failed outright.
    pub fn failed(source: SignalSource) -> Self {
        let sentinel = match source {
            SignalSource::Speech => Sentinel::AudioError,
            SignalSource::Facial => Sentinel::VideoError,
        };
        Self::new(source, sentinel)
    }

    pub fn source(&self) -> SignalSource {
        self.source
    }

    pub fn label(&self) -> EmotionLabel {
        self.label
    }

    pub fn status(&self) -> SignalStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == SignalStatus::Ok
    }
}
