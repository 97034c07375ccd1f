//! Classifier configuration.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct MlConfig {
    /// ONNX export of the facial expression model
    pub facial_model_path: PathBuf,
    /// ONNX export of the speech emotion model
    pub speech_model_path: PathBuf,
    /// Intra-op threads per session (0 = runtime default)
    pub ort_threads: usize,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            facial_model_path: PathBuf::from("models/facial_expression.onnx"),
            speech_model_path: PathBuf::from("models/speech_emotion.onnx"),
            ort_threads: 0,
        }
    }
}

impl MlConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            facial_model_path: std::env::var("FACIAL_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.facial_model_path),
            speech_model_path: std::env::var("SPEECH_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.speech_model_path),
            ort_threads: std::env::var("ORT_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ort_threads),
        }
    }
}
