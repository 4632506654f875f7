//! Repository for the `import_jobs` table.
//!
//! Uses `ImportJobStatus` from `models::status` for all status transitions.
//! Clients only ever see `job_uid`; the BIGSERIAL `id` stays internal.

use catalog_core::types::{DbId, JobId};
use sqlx::PgPool;

use crate::models::import_job::{CreateImportJob, ImportJob};
use crate::models::status::ImportJobStatus;

/// Column list for `import_jobs` queries.
const COLUMNS: &str = "\
    id, job_uid, status_id, source, file_path, \
    processed_rows, total_rows, result, error_message, \
    started_at, completed_at, created_at, updated_at";

/// Provides lifecycle operations for CSV import jobs.
pub struct ImportJobRepo;

impl ImportJobRepo {
    /// Create a new pending job. Returns immediately with the job row.
    pub async fn create(pool: &PgPool, input: &CreateImportJob) -> Result<ImportJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO import_jobs (job_uid, status_id, source, file_path) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(input.job_uid)
            .bind(ImportJobStatus::Pending.id())
            .bind(&input.source)
            .bind(&input.file_path)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its public identifier.
    pub async fn find_by_uid(pool: &PgPool, job_uid: JobId) -> Result<Option<ImportJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM import_jobs WHERE job_uid = $1");
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(job_uid)
            .fetch_optional(pool)
            .await
    }

    /// Atomically move a specific pending job into `Progress`.
    ///
    /// Returns `None` if the job does not exist or was already claimed,
    /// so a job is processed at most once.
    pub async fn claim(pool: &PgPool, job_uid: JobId) -> Result<Option<ImportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE import_jobs \
             SET status_id = $2, started_at = NOW() \
             WHERE job_uid = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(job_uid)
            .bind(ImportJobStatus::Progress.id())
            .bind(ImportJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Atomically claim the oldest pending job.
    ///
    /// Uses `SELECT FOR UPDATE SKIP LOCKED` so several workers polling the
    /// same table never double-claim.
    pub async fn claim_next(pool: &PgPool) -> Result<Option<ImportJob>, sqlx::Error> {
        let query = format!(
            "UPDATE import_jobs \
             SET status_id = $1, started_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM import_jobs \
                 WHERE status_id = $2 \
                 ORDER BY created_at ASC, id ASC \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&query)
            .bind(ImportJobStatus::Progress.id())
            .bind(ImportJobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Record the number of data rows once the file has been counted.
    pub async fn set_total(pool: &PgPool, id: DbId, total_rows: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE import_jobs SET total_rows = $2 WHERE id = $1")
            .bind(id)
            .bind(total_rows)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update the processed-row counter.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        processed_rows: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE import_jobs SET processed_rows = $2 WHERE id = $1")
            .bind(id)
            .bind(processed_rows)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Mark a job as succeeded with its result payload.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        processed_rows: i64,
        result: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE import_jobs \
             SET status_id = $2, processed_rows = $3, result = $4, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ImportJobStatus::Success.id())
        .bind(processed_rows)
        .bind(result)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a job as failed with an error message.
    ///
    /// No automatic retry is performed. Rows upserted before the failure
    /// stay in place.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE import_jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(ImportJobStatus::Failure.id())
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }
}
