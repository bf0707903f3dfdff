use std::sync::Arc;

use bbm_core::registry::JobRegistry;
use bbm_engine::TranslationEngine;
use bbm_worker::JobWorker;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (upload/output directories, limits).
    pub config: Arc<ServerConfig>,
    /// Every job known to this process, active and completed.
    pub registry: Arc<JobRegistry>,
    /// Spawns one background thread per submitted job.
    pub worker: Arc<JobWorker>,
}

impl AppState {
    /// Wire a fresh registry and worker around `engine`.
    pub fn new(config: ServerConfig, engine: Arc<dyn TranslationEngine>) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let worker = Arc::new(JobWorker::new(
            Arc::clone(&registry),
            engine,
            config.output_dir.clone(),
        ));
        Self {
            config: Arc::new(config),
            registry,
            worker,
        }
    }
}
