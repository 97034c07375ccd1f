//! Emotion classifiers for the two signal sources.
//!
//! - [`FacialEmotionClassifier`]: 48x48 grayscale frames, majority vote
//!   over a frame sequence
//! - [`SpeechEmotionClassifier`]: 40 MFCCs over 174 frames of 22.05 kHz audio
//!
//! Both wrap an [`Inference`] backend. The default backend is ONNX Runtime
//! (`onnx` feature); tests substitute fixed-score fakes.

pub mod config;
pub mod error;
pub mod facial;
pub mod inference;
pub mod preprocess;
pub mod speech;

pub use config::MlConfig;
pub use error::{MlError, MlResult};
pub use facial::FacialEmotionClassifier;
pub use inference::{argmax, Inference};
pub use speech::SpeechEmotionClassifier;

#[cfg(feature = "onnx")]
pub use inference::OrtModel;
