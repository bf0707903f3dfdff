use bbm_engine::EngineError;

/// Why a job ended in the `error` state.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The job configuration cannot be run; the engine was never started.
    #[error("{0}")]
    Configuration(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Engine panicked: {0}")]
    EnginePanicked(String),

    #[error("Failed to move output {from} to {to}: {source}")]
    Relocate {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
}
