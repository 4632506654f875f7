use axum::routing::{get, post};
use axum::Router;

use crate::handlers::upload;
use crate::state::AppState;

/// Routes mounted at `/upload`.
///
/// ```text
/// POST   /                    -> upload_csv
/// GET    /status/{job_id}     -> job_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::upload_csv))
        .route("/status/{job_id}", get(upload::job_status))
}
