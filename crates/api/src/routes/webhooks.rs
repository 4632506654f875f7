use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{id}/test",
        post(webhook::test_post).get(webhook::test_get),
    )
}
