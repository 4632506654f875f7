//! Database polling loop for the standalone worker.
//!
//! Claims pending jobs with `SKIP LOCKED`, so it can run next to the
//! API's in-process dispatcher or as several replicas.

use std::time::Duration;

use catalog_db::repositories::ImportJobRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::ImportConfig;
use crate::runner;

/// Drain pending jobs every `interval` until `cancel` fires.
///
/// Jobs are processed one at a time; a failing job never stops the loop.
pub async fn run(pool: PgPool, config: ImportConfig, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Import poller started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Import poller stopping");
                break;
            }
            _ = ticker.tick() => {
                let drained = drain_pending(&pool, &config, &cancel).await;
                if drained > 0 {
                    tracing::info!(drained, "Import poller: processed pending jobs");
                }
            }
        }
    }
}

/// Claim and process pending jobs until none are left. Returns how many ran.
pub async fn drain_pending(pool: &PgPool, config: &ImportConfig, cancel: &CancellationToken) -> u64 {
    let mut processed = 0;

    while !cancel.is_cancelled() {
        match ImportJobRepo::claim_next(pool).await {
            Ok(Some(job)) => {
                runner::process_job(pool, &job, config).await;
                processed += 1;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Import poller: failed to claim job");
                break;
            }
        }
    }

    processed
}
