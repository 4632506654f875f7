//! Handlers for chunked uploads.
//!
//! A client sends a file as numbered chunks under one `uploadId`, then
//! calls finalize to stitch them together and start an import.

use std::path::PathBuf;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::import_status::JOB_SOURCE_CHUNKED;
use catalog_core::uploads::{parse_chunk_index, validate_upload_id};

use crate::error::{AppError, AppResult};
use crate::extract::FormFields;
use crate::handlers::upload::start_import;
use crate::response::{JobAccepted, StatusOk};
use crate::state::AppState;
use crate::storage::{self, UploadStorage};

const CHUNK_FIELDS_REQUIRED: &str = "uploadId, index and chunk required";
const FINALIZE_FIELDS_REQUIRED: &str = "uploadId and filename required";

/// Fields of one `upload-chunk` request. The chunk body is streamed to a
/// staging file as soon as it is seen, since it may precede the other
/// fields.
#[derive(Debug, Default)]
struct ChunkForm {
    upload_id: Option<String>,
    index: Option<String>,
    staged: Option<PathBuf>,
}

async fn read_chunk_form(
    storage: &UploadStorage,
    multipart: &mut Multipart,
    form: &mut ChunkForm,
) -> AppResult<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "uploadId" => {
                form.upload_id = Some(read_text(field).await?);
            }
            "index" => {
                form.index = Some(read_text(field).await?);
            }
            "chunk" => {
                if let Some(previous) = form.staged.take() {
                    storage.discard(&previous).await;
                }
                let staged = storage.staging_path();
                storage::write_field(field, &staged).await?;
                form.staged = Some(staged);
            }
            // `filename` is only needed at finalize.
            _ => {}
        }
    }
    Ok(())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(text.trim().to_string())
}

/// POST /api/v1/products/upload-chunk
pub async fn upload_chunk(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<StatusOk>> {
    let storage = &state.storage;
    let mut form = ChunkForm::default();

    if let Err(e) = read_chunk_form(storage, &mut multipart, &mut form).await {
        if let Some(staged) = &form.staged {
            storage.discard(staged).await;
        }
        return Err(e);
    }

    let (upload_id, index, staged) = match (form.upload_id, form.index, form.staged) {
        (Some(upload_id), Some(index), Some(staged))
            if !upload_id.is_empty() && !index.is_empty() =>
        {
            (upload_id, index, staged)
        }
        (_, _, staged) => {
            if let Some(staged) = staged {
                storage.discard(&staged).await;
            }
            return Err(AppError::BadRequest(CHUNK_FIELDS_REQUIRED.to_string()));
        }
    };

    let committed = match validate_upload_id(&upload_id).and_then(|()| parse_chunk_index(&index)) {
        Ok(index) => storage.commit_chunk(&staged, &upload_id, index).await,
        Err(e) => Err(e.into()),
    };
    if let Err(e) = committed {
        storage.discard(&staged).await;
        return Err(e);
    }

    tracing::debug!(upload_id = %upload_id, index = %index, "Stored upload chunk");
    Ok(Json(StatusOk::default()))
}

/// POST /api/v1/products/upload-finalize
///
/// Accepts `uploadId`, `filename` and an optional `overwrite` flag as a
/// urlencoded, multipart or JSON body.
pub async fn finalize_upload(
    State(state): State<AppState>,
    fields: FormFields,
) -> AppResult<(StatusCode, Json<JobAccepted>)> {
    let (Some(upload_id), Some(file_name)) = (fields.get("uploadId"), fields.get("filename"))
    else {
        return Err(AppError::BadRequest(FINALIZE_FIELDS_REQUIRED.to_string()));
    };
    let overwrite = fields.flag("overwrite");

    let path = state
        .storage
        .assemble(upload_id, file_name, overwrite)
        .await?;
    let job_id = start_import(&state, &path, JOB_SOURCE_CHUNKED).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobAccepted {
            message: "finalized",
            job_id,
        }),
    ))
}
