//! Multimodal emotion pipeline.
//!
//! Turns one uploaded video plus optional text into a single assistant
//! reply:
//! 1. The video is written to a scratch file
//! 2. Speech and facial emotion are extracted in parallel, each branch
//!    degrading to a sentinel label on failure
//! 3. Both labels and the user text are fused into one query
//! 4. The query goes through the retrieval engine

pub mod config;
pub mod error;
pub mod extractor;
pub mod fusion;
pub mod logging;
pub mod pipeline;
pub mod services;

pub use config::{PipelineConfig, ServicesConfig};
pub use error::{PipelineError, PipelineResult};
pub use extractor::SignalExtractor;
pub use fusion::{fuse, NO_TEXT_PLACEHOLDER};
pub use logging::RequestLogger;
pub use pipeline::MultimodalPipeline;
pub use services::{ServiceParts, ServiceRegistry};
