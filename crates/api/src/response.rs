//! Shared response body types for API handlers.
//!
//! Prefer these over ad-hoc `serde_json::json!` bodies so the wire shape
//! is checked at compile time.

use catalog_core::types::JobId;
use serde::Serialize;

/// `{ "message": "..." }`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{ "message": "...", "job_id": "<uuid>" }`, returned with 202 when an
/// import has been queued.
#[derive(Debug, Serialize)]
pub struct JobAccepted {
    pub message: &'static str,
    pub job_id: JobId,
}

/// `{ "status": "ok" }`.
#[derive(Debug, Serialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl Default for StatusOk {
    fn default() -> Self {
        Self { status: "ok" }
    }
}
