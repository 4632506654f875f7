//! Liveness endpoint, mounted at the root.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Where imports started by this process are run.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportWorker {
    /// The API's own dispatcher picks jobs up as they are created.
    Inline,
    /// Jobs wait in the database for a `catalog-worker` process.
    External,
}

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub import_worker: ImportWorker,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = catalog_db::health_check(&state.pool).await.is_ok();
    let import_worker = if state.import_queue.is_some() {
        ImportWorker::Inline
    } else {
        ImportWorker::External
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        import_worker,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
