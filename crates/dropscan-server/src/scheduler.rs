//! Background job scheduler.
//!
//! Registers the periodic sweep and the daily retention cleanup on a
//! [`JobScheduler`] started with the server.

use std::sync::Arc;

use dropscan_core::{AppConfig, ScanTrigger};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::sweeps::{StartOutcome, SweepWorker};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    worker: Arc<SweepWorker>,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_sweep_job(&scheduler, worker, &config.scan_cron).await?;
    register_retention_job(&scheduler, pool, &config.retention_cron, config.retention_days).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Starts a sweep on every tick unless one is still running.
async fn register_sweep_job(
    scheduler: &JobScheduler,
    worker: Arc<SweepWorker>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let worker = Arc::clone(&worker);
        Box::pin(async move {
            match worker.start(ScanTrigger::Cron).await {
                StartOutcome::Started { scan_id } => {
                    tracing::info!(%scan_id, "scheduler: periodic sweep started");
                }
                StartOutcome::AlreadyRunning { scan_id } => {
                    tracing::info!(%scan_id, "scheduler: previous sweep still running; tick skipped");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: periodic sweep registered");
    Ok(())
}

/// Deletes snapshots older than `retention_days` on every tick.
async fn register_retention_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    schedule: &str,
    retention_days: u32,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        Box::pin(async move {
            match dropscan_db::delete_snapshots_older_than(&pool, retention_days).await {
                Ok(deleted) => {
                    tracing::info!(deleted, retention_days, "scheduler: retention cleanup complete");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: retention cleanup failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, retention_days, "scheduler: retention cleanup registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_cron_expression_is_rejected() {
        let scheduler = JobScheduler::new().await.expect("scheduler");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://dropscan@127.0.0.1:1/dropscan")
            .expect("lazy pool");

        let result = register_retention_job(&scheduler, pool, "not a cron line", 7).await;
        assert!(result.is_err());
    }
}
