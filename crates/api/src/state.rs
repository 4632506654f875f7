use std::sync::Arc;

use catalog_worker::ImportQueue;

use crate::config::ServerConfig;
use crate::storage::UploadStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Upload and chunk directories.
    pub storage: UploadStorage,
    /// Hand-off to the in-process import dispatcher. `None` when imports are
    /// left to the standalone worker.
    pub import_queue: Option<ImportQueue>,
}
