use std::time::Duration;

/// Tuning knobs for the import runner.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Write progress to the job row every this many rows (default: `100`).
    pub progress_every: u64,
    /// Rows upserted per database transaction (default: `500`).
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            progress_every: 100,
            batch_size: 500,
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default |
    /// |-------------------------|---------|
    /// | `IMPORT_PROGRESS_EVERY` | `100`   |
    /// | `IMPORT_BATCH_SIZE`     | `500`   |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let progress_every: u64 = std::env::var("IMPORT_PROGRESS_EVERY")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("IMPORT_PROGRESS_EVERY must be a valid u64")
            })
            .unwrap_or(defaults.progress_every)
            .max(1);

        let batch_size: usize = std::env::var("IMPORT_BATCH_SIZE")
            .ok()
            .map(|v| v.parse().expect("IMPORT_BATCH_SIZE must be a valid usize"))
            .unwrap_or(defaults.batch_size)
            .max(1);

        Self {
            progress_every,
            batch_size,
        }
    }
}

/// Polling interval of the standalone worker (`WORKER_POLL_INTERVAL_SECS`, default `5`).
pub fn poll_interval_from_env() -> Duration {
    let secs: u64 = std::env::var("WORKER_POLL_INTERVAL_SECS")
        .unwrap_or_else(|_| "5".into())
        .parse()
        .expect("WORKER_POLL_INTERVAL_SECS must be a valid u64");
    Duration::from_secs(secs.max(1))
}
