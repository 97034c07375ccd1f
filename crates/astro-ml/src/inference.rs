//! Model inference backends.

use crate::error::MlResult;

/// A loaded model that maps one input tensor to a flat score vector.
///
/// Implementations are blocking and must be safe to share across threads;
/// callers run them on the blocking pool.
pub trait Inference: Send + Sync {
    /// Run the model on a row-major tensor of the given shape.
    fn infer(&self, shape: &[usize], data: Vec<f32>) -> MlResult<Vec<f32>>;
}

/// Index of the highest score. Ties resolve to the lowest index.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &s) in scores.iter().enumerate() {
        if s.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(feature = "onnx")]
pub use ort_backend::OrtModel;

#[cfg(feature = "onnx")]
mod ort_backend {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use ort::session::builder::GraphOptimizationLevel;
    use ort::session::Session;
    use ort::value::{Tensor, Value};
    use tracing::info;

    use super::Inference;
    use crate::error::{MlError, MlResult};

    /// ONNX Runtime session behind a mutex (`Session::run` needs `&mut`).
    pub struct OrtModel {
        session: Mutex<Session>,
        output_name: String,
        path: PathBuf,
    }

    impl std::fmt::Debug for OrtModel {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OrtModel")
                .field("path", &self.path)
                .field("output_name", &self.output_name)
                .finish()
        }
    }

    impl OrtModel {
        /// Load an ONNX model from disk.
        pub fn load(model_path: &Path, intra_threads: usize) -> MlResult<Self> {
            if !model_path.exists() {
                return Err(MlError::ModelNotFound(model_path.to_path_buf()));
            }

            let model_bytes = std::fs::read(model_path)
                .map_err(|e| MlError::model_load(format!("Failed to read model file: {}", e)))?;

            let mut builder = Session::builder()
                .map_err(|e| MlError::model_load(format!("Failed to create session builder: {}", e)))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| MlError::model_load(format!("Failed to set optimization level: {}", e)))?;

            if intra_threads > 0 {
                builder = builder
                    .with_intra_threads(intra_threads)
                    .map_err(|e| MlError::model_load(format!("Failed to set threads: {}", e)))?;
            }

            #[cfg(all(target_os = "linux", feature = "cuda"))]
            {
                use ort::execution_providers::CUDAExecutionProvider;
                if let Ok(cuda_builder) = builder
                    .clone()
                    .with_execution_providers([CUDAExecutionProvider::default().build()])
                {
                    if let Ok(session) = cuda_builder.commit_from_memory(&model_bytes) {
                        info!(path = %model_path.display(), "Using CUDA execution provider");
                        return Self::from_session(session, model_path);
                    }
                }
            }

            let session = builder
                .commit_from_memory(&model_bytes)
                .map_err(|e| MlError::model_load(format!("Failed to load ONNX model: {}", e)))?;

            info!(path = %model_path.display(), "Loaded ONNX model on CPU");
            Self::from_session(session, model_path)
        }

        fn from_session(session: Session, path: &Path) -> MlResult<Self> {
            let output_name = session
                .outputs
                .first()
                .map(|o| o.name.clone())
                .ok_or_else(|| MlError::model_load("Model declares no outputs"))?;

            Ok(Self {
                session: Mutex::new(session),
                output_name,
                path: path.to_path_buf(),
            })
        }
    }

    impl Inference for OrtModel {
        fn infer(&self, shape: &[usize], data: Vec<f32>) -> MlResult<Vec<f32>> {
            let input = Tensor::from_array((shape.to_vec(), data.into_boxed_slice()))
                .map(Value::from)
                .map_err(|e| MlError::inference(format!("Failed to create tensor: {}", e)))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| MlError::inference("Session lock poisoned"))?;

            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| MlError::inference(format!("ONNX inference failed: {}", e)))?;

            let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
                MlError::invalid_output(format!("Missing {} tensor", self.output_name))
            })?;

            let (_, scores) = output
                .try_extract_tensor::<f32>()
                .map_err(|e| MlError::invalid_output(format!("Failed to extract tensor: {}", e)))?;

            Ok(scores.to_vec())
        }
    }
}
