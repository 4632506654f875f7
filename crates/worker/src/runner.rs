//! Runs a single CSV import job end to end.
//!
//! The file is read twice: a counting pass so clients get a `total`, then
//! the import pass. Parsing uses the synchronous `csv` reader on a blocking
//! thread and hands batches to the async upserter over a bounded channel,
//! so a slow database applies backpressure to the parser.

use std::fs::File;
use std::path::{Path, PathBuf};

use catalog_core::import_status::{IMPORT_COMPLETED_MESSAGE, MAX_REPORTED_SKIPPED_ROWS};
use catalog_core::product_csv::{self, ColumnMap, ProductRow, SkipReason};
use catalog_db::models::import_job::ImportJob;
use catalog_db::repositories::{ImportJobRepo, ProductRepo};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::config::ImportConfig;
use crate::error::ImportError;

/// Batches buffered between the parser thread and the upserter.
const CHANNEL_CAPACITY: usize = 4;

/// One data record after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRecord {
    Row(ProductRow),
    Skipped { line: u64, reason: SkipReason },
}

/// A record that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the file where the record starts.
    pub line: u64,
    pub reason: &'static str,
}

/// Final tally of an import, stored as the job result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub current: u64,
    pub total: u64,
    pub status: &'static str,
    pub created: u64,
    pub updated: u64,
    pub skipped: u64,
    /// First [`MAX_REPORTED_SKIPPED_ROWS`] skipped records.
    pub skipped_rows: Vec<SkippedRow>,
}

impl ImportSummary {
    fn new(total: u64) -> Self {
        Self {
            total,
            status: IMPORT_COMPLETED_MESSAGE,
            ..Default::default()
        }
    }

    fn record_skip(&mut self, line: u64, reason: SkipReason) {
        self.skipped += 1;
        if self.skipped_rows.len() < MAX_REPORTED_SKIPPED_ROWS {
            self.skipped_rows.push(SkippedRow {
                line,
                reason: reason.as_str(),
            });
        }
    }

    /// JSON form stored in `import_jobs.result`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "current": self.current,
            "total": self.total,
            "status": self.status,
            "created": self.created,
            "updated": self.updated,
            "skipped": self.skipped,
            "skipped_rows": self.skipped_rows,
        })
    }
}

/// Run an already-claimed job and record its outcome on the job row.
///
/// Never returns an error: failures are written to the job as `FAILURE`.
pub async fn process_job(pool: &PgPool, job: &ImportJob, config: &ImportConfig) {
    tracing::info!(job_id = %job.job_uid, file = %job.file_path, "Import started");

    match run_import(pool, job, config).await {
        Ok(summary) => {
            tracing::info!(
                job_id = %job.job_uid,
                total = summary.total,
                created = summary.created,
                updated = summary.updated,
                skipped = summary.skipped,
                "Import completed",
            );
            if let Err(e) =
                ImportJobRepo::complete(pool, job.id, summary.current as i64, &summary.to_json())
                    .await
            {
                tracing::error!(job_id = %job.job_uid, error = %e, "Failed to mark import completed");
            }
        }
        Err(err) => {
            tracing::error!(job_id = %job.job_uid, error = %err, "Import failed");
            if let Err(e) = ImportJobRepo::fail(pool, job.id, &err.to_string()).await {
                tracing::error!(job_id = %job.job_uid, error = %e, "Failed to mark import failed");
            }
        }
    }
}

/// Count, parse and upsert the job's file, reporting progress as it goes.
pub async fn run_import(
    pool: &PgPool,
    job: &ImportJob,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let path = PathBuf::from(&job.file_path);

    let count_path = path.clone();
    let total = tokio::task::spawn_blocking(move || count_file(&count_path)).await??;
    ImportJobRepo::set_total(pool, job.id, total as i64).await?;
    tracing::debug!(job_id = %job.job_uid, total, "Counted import rows");

    let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
    let batch_size = config.batch_size.max(1);
    let parser = tokio::task::spawn_blocking(move || parse_file(&path, batch_size, tx));

    let progress_every = config.progress_every.max(1);
    let mut summary = ImportSummary::new(total);
    let mut rows = Vec::with_capacity(batch_size);

    // Rows are flushed at every progress boundary as well as at the end of
    // each batch, so `processed_rows` never runs ahead of the database.
    while let Some(batch) = rx.recv().await {
        for record in batch {
            match record {
                ParsedRecord::Row(row) => rows.push(row),
                ParsedRecord::Skipped { line, reason } => summary.record_skip(line, reason),
            }
            summary.current += 1;

            if summary.current % progress_every == 0 {
                flush_rows(pool, &mut rows, &mut summary).await?;
                ImportJobRepo::update_progress(pool, job.id, summary.current as i64).await?;
                tracing::debug!(
                    job_id = %job.job_uid,
                    current = summary.current,
                    total,
                    "Import progress",
                );
            }
        }
        flush_rows(pool, &mut rows, &mut summary).await?;
    }

    // The channel closes when the parser finishes or gives up; its result
    // says which.
    parser.await??;

    ImportJobRepo::update_progress(pool, job.id, summary.current as i64).await?;
    Ok(summary)
}

/// Upsert the buffered rows, if any, and add their counts to `summary`.
async fn flush_rows(
    pool: &PgPool,
    rows: &mut Vec<ProductRow>,
    summary: &mut ImportSummary,
) -> Result<(), ImportError> {
    if rows.is_empty() {
        return Ok(());
    }
    let counts = ProductRepo::upsert_batch(pool, rows.as_slice()).await?;
    summary.created += counts.created;
    summary.updated += counts.updated;
    rows.clear();
    Ok(())
}

/// Count the data records in a CSV file.
pub fn count_file(path: &Path) -> Result<u64, ImportError> {
    let file = File::open(path)?;
    Ok(product_csv::count_records(file)?)
}

/// Parse a CSV file into batches of [`ParsedRecord`], sending each batch
/// down `tx`.
///
/// Runs on a blocking thread. Stops quietly if the receiver is dropped.
pub fn parse_file(
    path: &Path,
    batch_size: usize,
    tx: mpsc::Sender<Vec<ParsedRecord>>,
) -> Result<(), ImportError> {
    let file = File::open(path)?;
    let mut reader = product_csv::reader_builder().from_reader(file);
    let columns = ColumnMap::from_headers(reader.headers()?)?;

    let mut batch = Vec::with_capacity(batch_size);
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        batch.push(match product_csv::parse_record(&columns, &record) {
            Ok(row) => ParsedRecord::Row(row),
            Err(reason) => ParsedRecord::Skipped { line, reason },
        });

        if batch.len() >= batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            if tx.blocking_send(full).is_err() {
                return Ok(());
            }
        }
    }

    if !batch.is_empty() {
        let _ = tx.blocking_send(batch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use assert_matches::assert_matches;
    use catalog_core::product_csv::LayoutError;

    use super::*;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn collect(path: &Path, batch_size: usize) -> (Result<(), ImportError>, Vec<Vec<ParsedRecord>>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = parse_file(path, batch_size, tx);
        let mut batches = Vec::new();
        while let Ok(batch) = rx.try_recv() {
            batches.push(batch);
        }
        (result, batches)
    }

    #[test]
    fn parse_file_batches_rows_and_skips() {
        let file = csv_file("sku,name,description\nA-1,Alpha,first\n,NoSku,\nB-2,Beta,\nC-3,,x\n");
        let (result, batches) = collect(file.path(), 2);

        assert!(result.is_ok());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].len(), 2);

        assert_eq!(
            batches[0][0],
            ParsedRecord::Row(ProductRow {
                sku: "a-1".into(),
                name: "Alpha".into(),
                description: Some("first".into()),
            })
        );
        assert_eq!(
            batches[0][1],
            ParsedRecord::Skipped {
                line: 3,
                reason: SkipReason::BlankSku
            }
        );
        assert_matches!(batches[1][0], ParsedRecord::Row(_));
        assert_eq!(
            batches[1][1],
            ParsedRecord::Skipped {
                line: 5,
                reason: SkipReason::BlankName
            }
        );
    }

    #[test]
    fn parse_file_rejects_missing_column() {
        let file = csv_file("name,description\nAlpha,first\n");
        let (result, batches) = collect(file.path(), 10);

        assert_matches!(
            result,
            Err(ImportError::Layout(LayoutError::MissingColumn("sku")))
        );
        assert!(batches.is_empty());
    }

    #[test]
    fn parse_file_reports_missing_file() {
        let (tx, _rx) = mpsc::channel(1);
        let result = parse_file(Path::new("/definitely/not/here.csv"), 10, tx);
        assert_matches!(result, Err(ImportError::Io(_)));
    }

    #[test]
    fn parse_file_stops_when_receiver_dropped() {
        let file = csv_file("sku,name\na,A\nb,B\nc,C\n");
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert!(parse_file(file.path(), 1, tx).is_ok());
    }

    #[test]
    fn count_file_counts_data_rows() {
        let file = csv_file("sku,name\na,A\nb,B\n");
        assert_eq!(count_file(file.path()).unwrap(), 2);
    }

    #[test]
    fn summary_caps_reported_skips() {
        let mut summary = ImportSummary::new(100);
        for line in 0..(MAX_REPORTED_SKIPPED_ROWS as u64 + 5) {
            summary.record_skip(line, SkipReason::BlankSku);
        }
        assert_eq!(summary.skipped, MAX_REPORTED_SKIPPED_ROWS as u64 + 5);
        assert_eq!(summary.skipped_rows.len(), MAX_REPORTED_SKIPPED_ROWS);

        let json = summary.to_json();
        assert_eq!(json["status"], "Task completed!");
        assert_eq!(json["skipped_rows"][0]["reason"], "blank_sku");
    }
}
