use catalog_core::product_csv::LayoutError;

/// Everything that can fail an import job.
///
/// The `Display` text is stored verbatim as the job's error message.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Import task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Import queue is closed")]
    QueueClosed,
}
