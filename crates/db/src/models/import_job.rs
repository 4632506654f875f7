//! Import job entity model and DTOs.

use catalog_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{ImportJobStatus, StatusId};

/// A row from the `import_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportJob {
    pub id: DbId,
    pub job_uid: JobId,
    pub status_id: StatusId,
    pub source: String,
    pub file_path: String,
    pub processed_rows: i64,
    pub total_rows: Option<i64>,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ImportJob {
    /// Typed status. `None` only if the lookup table and enum disagree.
    pub fn status(&self) -> Option<ImportJobStatus> {
        ImportJobStatus::from_id(self.status_id)
    }
}

/// DTO for enqueuing a new import job.
#[derive(Debug, Clone)]
pub struct CreateImportJob {
    pub job_uid: JobId,
    /// `upload` or `chunked`.
    pub source: String,
    pub file_path: String,
}
