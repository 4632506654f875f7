//! In-process import queue.
//!
//! The API enqueues the id of every job it creates; [`run_dispatcher`]
//! claims each one and spawns a task per job. There is no coordination
//! between jobs beyond the claim.
//!
//! The channel does not survive a restart, so the dispatcher first claims
//! whatever is still `PENDING` in the database.

use std::sync::Arc;

use catalog_core::types::JobId;
use catalog_db::models::import_job::ImportJob;
use catalog_db::repositories::ImportJobRepo;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::runner;

/// Pending job ids buffered before `enqueue` waits.
const QUEUE_CAPACITY: usize = 1024;

/// Sending half of the import queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ImportQueue {
    tx: mpsc::Sender<JobId>,
}

impl ImportQueue {
    /// Create a queue and the receiver to hand to [`run_dispatcher`].
    pub fn new() -> (Self, mpsc::Receiver<JobId>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        (Self { tx }, rx)
    }

    /// Hand a freshly created job to the dispatcher.
    pub async fn enqueue(&self, job_uid: JobId) -> Result<(), ImportError> {
        self.tx
            .send(job_uid)
            .await
            .map_err(|_| ImportError::QueueClosed)
    }
}

/// Receive job ids and run each claimed job on its own task.
///
/// Stops accepting work when `cancel` fires or every [`ImportQueue`] is
/// dropped, then waits for in-flight imports to finish.
pub async fn run_dispatcher(
    pool: PgPool,
    mut rx: mpsc::Receiver<JobId>,
    config: Arc<ImportConfig>,
    cancel: CancellationToken,
) {
    tracing::info!(
        progress_every = config.progress_every,
        batch_size = config.batch_size,
        "Import dispatcher started"
    );

    let tracker = TaskTracker::new();

    let resumed = resume_pending(&pool, &config, &tracker, &cancel).await;
    if resumed > 0 {
        tracing::info!(resumed, "Resumed pending import jobs");
    }

    loop {
        let job_uid = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Import dispatcher stopping");
                break;
            }
            received = rx.recv() => match received {
                Some(job_uid) => job_uid,
                None => {
                    tracing::info!("Import queue closed, dispatcher stopping");
                    break;
                }
            },
        };

        let job = match ImportJobRepo::claim(&pool, job_uid).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::debug!(job_id = %job_uid, "Import job already claimed, skipping");
                continue;
            }
            Err(e) => {
                tracing::error!(job_id = %job_uid, error = %e, "Failed to claim import job");
                continue;
            }
        };

        spawn_job(&tracker, &pool, &config, job);
    }

    tracker.close();
    tracker.wait().await;
    tracing::info!("Import dispatcher stopped");
}

/// Claim every job left `PENDING` by an earlier process and spawn it.
async fn resume_pending(
    pool: &PgPool,
    config: &Arc<ImportConfig>,
    tracker: &TaskTracker,
    cancel: &CancellationToken,
) -> u64 {
    let mut resumed = 0;

    while !cancel.is_cancelled() {
        match ImportJobRepo::claim_next(pool).await {
            Ok(Some(job)) => {
                spawn_job(tracker, pool, config, job);
                resumed += 1;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to claim pending import job");
                break;
            }
        }
    }

    resumed
}

fn spawn_job(tracker: &TaskTracker, pool: &PgPool, config: &Arc<ImportConfig>, job: ImportJob) {
    let pool = pool.clone();
    let config = Arc::clone(config);
    tracker.spawn(async move {
        runner::process_job(&pool, &job, &config).await;
    });
}
