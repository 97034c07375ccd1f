//! Application state.

use std::sync::Arc;

use astro_pipeline::{MultimodalPipeline, ServiceRegistry};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Whether the services came up at startup.
#[derive(Clone)]
pub enum Availability {
    Ready(ServiceRegistry),
    /// Startup fault; the server keeps answering probes.
    Unavailable(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub services: Arc<Availability>,
}

impl AppState {
    pub fn ready(config: ApiConfig, registry: ServiceRegistry) -> Self {
        Self {
            config,
            services: Arc::new(Availability::Ready(registry)),
        }
    }

    pub fn unavailable(config: ApiConfig, reason: impl Into<String>) -> Self {
        Self {
            config,
            services: Arc::new(Availability::Unavailable(reason.into())),
        }
    }

    /// The request pipeline, or 503 when startup failed.
    pub fn pipeline(&self) -> ApiResult<Arc<MultimodalPipeline>> {
        match self.services.as_ref() {
            Availability::Ready(registry) => Ok(registry.pipeline()),
            Availability::Unavailable(reason) => Err(ApiError::unavailable(reason.clone())),
        }
    }
}
