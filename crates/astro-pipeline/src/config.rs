//! Pipeline configuration.

use std::time::Duration;

use astro_media::MediaConfig;
use astro_ml::MlConfig;
use astro_rag::{EngineConfig, IndexConfig, OllamaConfig};

/// Signal extraction settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Extraction branches allowed to run at once, across all requests
    pub max_parallel_branches: usize,
    /// Upper bound on one extraction branch
    pub branch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_branches: 4,
            branch_timeout: Duration::from_secs(120),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            max_parallel_branches: std::env::var("PIPELINE_MAX_PARALLEL_BRANCHES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(4),
            branch_timeout: Duration::from_secs(
                std::env::var("PIPELINE_BRANCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
        }
    }
}

/// Everything needed to bring the services up.
#[derive(Debug, Clone, Default)]
pub struct ServicesConfig {
    pub media: MediaConfig,
    pub ml: MlConfig,
    pub ollama: OllamaConfig,
    pub index: IndexConfig,
    pub engine: EngineConfig,
    pub pipeline: PipelineConfig,
}

impl ServicesConfig {
    pub fn from_env() -> Self {
        Self {
            media: MediaConfig::from_env(),
            ml: MlConfig::from_env(),
            ollama: OllamaConfig::from_env(),
            index: IndexConfig::from_env(),
            engine: EngineConfig::from_env(),
            pipeline: PipelineConfig::from_env(),
        }
    }
}
