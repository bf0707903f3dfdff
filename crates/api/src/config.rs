use std::path::PathBuf;

/// Default ceiling for a multipart upload: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8002`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body in bytes (default: 100 MiB).
    pub max_upload_bytes: usize,
    /// Where uploaded documents are stored, one subdirectory per job.
    pub upload_dir: PathBuf,
    /// Where finished artifacts are moved to.
    pub output_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                          |
    /// |------------------------|----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                        |
    /// | `PORT`                 | `8002`                           |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`          |
    /// | `REQUEST_TIMEOUT_SECS` | `60`                             |
    /// | `MAX_UPLOAD_BYTES`     | `104857600`                      |
    /// | `UPLOAD_DIR`           | `$TMPDIR/bbm_uploads_<random>`   |
    /// | `OUTPUT_DIR`           | `$TMPDIR/bbm_outputs_<random>`   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8002".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let upload_dir = dir_from_env("UPLOAD_DIR", "bbm_uploads_");
        let output_dir = dir_from_env("OUTPUT_DIR", "bbm_outputs_");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            upload_dir,
            output_dir,
        }
    }

    /// Create the upload and output directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.output_dir)
    }
}

/// Absolute directory from `var`, or a fresh uniquely named directory under
/// the system temp dir.
fn dir_from_env(var: &str, temp_prefix: &str) -> PathBuf {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            let path = PathBuf::from(raw.trim());
            if path.is_absolute() {
                path
            } else {
                std::env::current_dir()
                    .expect("Current directory must be readable")
                    .join(path)
            }
        }
        _ => std::env::temp_dir().join(format!("{temp_prefix}{}", uuid::Uuid::new_v4().simple())),
    }
}
