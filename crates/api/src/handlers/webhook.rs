//! Webhook test endpoints. Nothing is delivered.

use axum::extract::Path;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;

/// Webhook ids are integers; anything else names no webhook.
fn parse_webhook_id(raw: &str) -> AppResult<DbId> {
    raw.parse()
        .map_err(|_| AppError::Core(CoreError::not_found("Webhook", raw)))
}

/// POST /api/v1/webhooks/{id}/test
pub async fn test_post(Path(id): Path<String>) -> AppResult<Json<MessageResponse>> {
    let id = parse_webhook_id(&id)?;
    tracing::info!(webhook_id = id, "Webhook test requested");
    Ok(Json(MessageResponse::new(format!(
        "Webhook {id} test successful"
    ))))
}

/// GET /api/v1/webhooks/{id}/test
pub async fn test_get(Path(id): Path<String>) -> AppResult<Json<MessageResponse>> {
    let id = parse_webhook_id(&id)?;
    Ok(Json(MessageResponse::new(format!("Webhook {id} test (GET)"))))
}
