use std::path::PathBuf;

use catalog_worker::ImportConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight imports, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory where uploaded and assembled CSV files are stored.
    pub upload_dir: PathBuf,
    /// Directory holding per-upload chunk folders.
    pub chunk_dir: PathBuf,
    /// Largest accepted request body in bytes (default: 100 MB).
    pub max_upload_bytes: usize,
    /// Run imports inside the API process (default: `true`). When `false`,
    /// jobs stay pending until a `catalog-worker` process claims them.
    pub inline_worker: bool,
    /// Import runner tuning.
    pub import: ImportConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:4200`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `UPLOAD_DIR`            | `uploads`                  |
    /// | `UPLOAD_CHUNKS_DIR`     | `upload_chunks`            |
    /// | `MAX_UPLOAD_BYTES`      | `104857600`                |
    /// | `IMPORT_INLINE_WORKER`  | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let chunk_dir = PathBuf::from(
            std::env::var("UPLOAD_CHUNKS_DIR").unwrap_or_else(|_| "upload_chunks".into()),
        );

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| (100 * 1024 * 1024).to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let inline_worker = std::env::var("IMPORT_INLINE_WORKER")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(true);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            upload_dir,
            chunk_dir,
            max_upload_bytes,
            inline_worker,
            import: ImportConfig::from_env(),
        }
    }
}
