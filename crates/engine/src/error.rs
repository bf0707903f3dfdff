/// Failure raised by a [`TranslationEngine`](crate::TranslationEngine) run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Failed(String),
}

impl EngineError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
