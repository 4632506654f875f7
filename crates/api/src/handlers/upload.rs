//! Handlers for CSV uploads and import job status.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::import_status::JOB_SOURCE_UPLOAD;
use catalog_core::types::JobId;
use catalog_db::models::import_job::{CreateImportJob, ImportJob};
use catalog_db::models::status::ImportJobStatus;
use catalog_db::repositories::ImportJobRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::JobAccepted;
use crate::state::AppState;
use crate::storage;

/// Multipart field carrying the CSV file.
const FILE_FIELD: &str = "file";

/// POST /api/v1/upload
///
/// Stores the `file` field and queues an import. Responds before the
/// import starts.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<JobAccepted>)> {
    let mut stored = None;
    if let Err(e) = read_upload(&state, &mut multipart, &mut stored).await {
        if let Some(path) = &stored {
            state.storage.discard(path).await;
        }
        return Err(e);
    }

    let path = stored.ok_or_else(|| AppError::BadRequest("CSV file required".to_string()))?;
    let job_id = match start_import(&state, &path, JOB_SOURCE_UPLOAD).await {
        Ok(job_id) => job_id,
        Err(e) => {
            state.storage.discard(&path).await;
            return Err(e);
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            message: "Upload started",
            job_id,
        }),
    ))
}

/// Store the first `file` field into `stored`, skipping everything else.
///
/// `stored` is set as soon as the file is on disk so the caller can remove
/// it if a later field fails.
async fn read_upload(
    state: &AppState,
    multipart: &mut Multipart,
    stored: &mut Option<PathBuf>,
) -> AppResult<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) || stored.is_some() {
            continue;
        }
        let dest = state.storage.new_upload_path(field.file_name())?;
        let bytes = storage::write_field(field, &dest).await?;
        tracing::debug!(path = %dest.display(), bytes, "Stored uploaded CSV");
        *stored = Some(dest);
    }
    Ok(())
}

/// Create a pending import job for `path` and hand it to the dispatcher.
///
/// Without an in-process dispatcher the job waits for a `catalog-worker`
/// to claim it.
pub(crate) async fn start_import(state: &AppState, path: &FsPath, source: &str) -> AppResult<JobId> {
    let job = ImportJobRepo::create(
        &state.pool,
        &CreateImportJob {
            job_uid: uuid::Uuid::new_v4(),
            source: source.to_string(),
            file_path: path.to_string_lossy().into_owned(),
        },
    )
    .await?;
    tracing::info!(job_id = %job.job_uid, source, file = %job.file_path, "Import job created");

    if let Some(queue) = &state.import_queue {
        if let Err(e) = queue.enqueue(job.job_uid).await {
            ImportJobRepo::fail(&state.pool, job.id, "Import queue unavailable").await?;
            return Err(e.into());
        }
    }

    Ok(job.job_uid)
}

/// `meta` of a running job.
#[derive(Debug, Serialize)]
pub struct ProgressMeta {
    pub current: i64,
    /// `null` until the file has been counted.
    pub total: Option<i64>,
}

/// `info` of a failed job.
#[derive(Debug, Serialize)]
pub struct FailureInfo {
    pub error: String,
}

/// Body of `GET /upload/status/{job_id}`, tagged by `status`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum JobStatusResponse {
    Pending,
    Progress { meta: ProgressMeta },
    Success { result: serde_json::Value },
    Failure { info: FailureInfo },
}

impl JobStatusResponse {
    fn from_job(job: ImportJob) -> AppResult<Self> {
        let status = job.status().ok_or_else(|| {
            AppError::InternalError(format!(
                "Import job {} has unknown status id {}",
                job.job_uid, job.status_id
            ))
        })?;
        tracing::debug!(job_id = %job.job_uid, status = status.label(), "Polled import job");

        Ok(match status {
            ImportJobStatus::Pending => Self::Pending,
            ImportJobStatus::Progress => Self::Progress {
                meta: ProgressMeta {
                    current: job.processed_rows,
                    total: job.total_rows,
                },
            },
            ImportJobStatus::Success => Self::Success {
                result: job.result.unwrap_or(serde_json::Value::Null),
            },
            ImportJobStatus::Failure => Self::Failure {
                info: FailureInfo {
                    error: job
                        .error_message
                        .unwrap_or_else(|| "Import failed".to_string()),
                },
            },
        })
    }
}

/// GET /api/v1/upload/status/{job_id}
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Response> {
    let job_uid: JobId = job_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid job id '{job_id}'")))?;

    let job = ImportJobRepo::find_by_uid(&state.pool, job_uid)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Import job", job_uid)))?;

    let body = JobStatusResponse::from_job(job)?;
    let status = match body {
        JobStatusResponse::Pending => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bodies_are_tagged() {
        let pending = serde_json::to_value(JobStatusResponse::Pending).unwrap();
        assert_eq!(pending, serde_json::json!({"status": "PENDING"}));

        let progress = serde_json::to_value(JobStatusResponse::Progress {
            meta: ProgressMeta {
                current: 10,
                total: Some(40),
            },
        })
        .unwrap();
        assert_eq!(
            progress,
            serde_json::json!({"status": "PROGRESS", "meta": {"current": 10, "total": 40}})
        );

        let failure = serde_json::to_value(JobStatusResponse::Failure {
            info: FailureInfo {
                error: "boom".into(),
            },
        })
        .unwrap();
        assert_eq!(
            failure,
            serde_json::json!({"status": "FAILURE", "info": {"error": "boom"}})
        );
    }
}
