//! Background sweep worker.
//!
//! At most one sweep runs at a time. Each sweep gets a child of the worker's
//! shutdown token and a `watch` channel that receives its [`SweepReport`]
//! when it finishes, however it finishes.

use std::sync::Arc;
use std::time::Duration;

use dropscan_core::{EnrichedProduct, ScanTrigger};
use dropscan_db::SweepTally;
use dropscan_pipeline::{ScanScheduler, SweepReport};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// How long [`SweepWorker::shutdown`] waits for a cancelled sweep to wind down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    Started { scan_id: Uuid },
    AlreadyRunning { scan_id: Uuid },
}

impl StartOutcome {
    #[must_use]
    pub fn scan_id(self) -> Uuid {
        match self {
            StartOutcome::Started { scan_id } | StartOutcome::AlreadyRunning { scan_id } => scan_id,
        }
    }
}

struct ActiveSweep {
    scan_id: Uuid,
    cancel: CancellationToken,
    done: watch::Receiver<Option<SweepReport>>,
}

impl ActiveSweep {
    fn is_finished(&self) -> bool {
        self.done.borrow().is_some()
    }
}

pub struct SweepWorker {
    scheduler: Arc<ScanScheduler>,
    pool: PgPool,
    shutdown: CancellationToken,
    active: Mutex<Option<ActiveSweep>>,
}

impl SweepWorker {
    #[must_use]
    pub fn new(scheduler: Arc<ScanScheduler>, pool: PgPool) -> Self {
        Self {
            scheduler,
            pool,
            shutdown: CancellationToken::new(),
            active: Mutex::new(None),
        }
    }

    /// Starts a sweep in the background unless one is already running.
    ///
    /// Scan-run bookkeeping is best effort: if the `scan_runs` row cannot be
    /// written the sweep still runs under a fresh scan id.
    pub async fn start(&self, trigger: ScanTrigger) -> StartOutcome {
        let mut active = self.active.lock().await;
        if let Some(sweep) = active.as_ref().filter(|s| !s.is_finished()) {
            tracing::info!(
                scan_id = %sweep.scan_id,
                trigger = %trigger,
                "sweep already running; trigger ignored"
            );
            return StartOutcome::AlreadyRunning {
                scan_id: sweep.scan_id,
            };
        }

        let (run_id, scan_id) = self.open_run(trigger).await;
        let cancel = self.shutdown.child_token();
        let (tx, rx) = watch::channel(None);

        let scheduler = Arc::clone(&self.scheduler);
        let pool = self.pool.clone();
        let sweep_cancel = cancel.clone();
        tokio::spawn(async move {
            let task = tokio::spawn(async move { scheduler.run(scan_id, &sweep_cancel).await });
            let report = match task.await {
                Ok(report) => {
                    if let Some(id) = run_id {
                        close_run(&pool, id, &report).await;
                    }
                    report
                }
                Err(e) => {
                    tracing::error!(%scan_id, error = %e, "sweep task aborted");
                    if let Some(id) = run_id {
                        if let Err(db_err) =
                            dropscan_db::fail_scan_run(&pool, id, &format!("sweep task aborted: {e}")).await
                        {
                            tracing::error!(%scan_id, error = %db_err, "failed to record aborted sweep");
                        }
                    }
                    SweepReport {
                        scan_id,
                        ..SweepReport::default()
                    }
                }
            };
            tx.send_replace(Some(report));
        });

        tracing::info!(%scan_id, trigger = %trigger, "sweep started");
        *active = Some(ActiveSweep {
            scan_id,
            cancel,
            done: rx,
        });
        StartOutcome::Started { scan_id }
    }

    /// The scan id of the sweep currently in progress, if any.
    pub async fn running(&self) -> Option<Uuid> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|s| !s.is_finished())
            .map(|s| s.scan_id)
    }

    /// Completion signal for `scan_id`, if it is the most recent sweep.
    pub async fn subscribe(&self, scan_id: Uuid) -> Option<watch::Receiver<Option<SweepReport>>> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|s| s.scan_id == scan_id)
            .map(|s| s.done.clone())
    }

    /// Asks the running sweep to stop after its current category.
    ///
    /// Returns `false` when `scan_id` is not the running sweep.
    pub async fn cancel(&self, scan_id: Uuid) -> bool {
        let active = self.active.lock().await;
        match active.as_ref() {
            Some(sweep) if sweep.scan_id == scan_id && !sweep.is_finished() => {
                sweep.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Names of the source tiers the sweep resolves against.
    #[must_use]
    pub fn tier_names(&self) -> Vec<String> {
        self.scheduler
            .resolver()
            .tier_names()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Synthetic preview of the first category. No network, no store.
    #[must_use]
    pub fn preview(&self, n: usize) -> Vec<EnrichedProduct> {
        self.scheduler.preview(n)
    }

    /// Cancels any running sweep and waits briefly for it to record its outcome.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let done = self.active.lock().await.as_ref().map(|s| s.done.clone());
        if let Some(done) = done {
            if tokio::time::timeout(SHUTDOWN_GRACE, wait_for_report(done))
                .await
                .is_err()
            {
                tracing::warn!("sweep did not finish within the shutdown grace period");
            }
        }
    }

    async fn open_run(&self, trigger: ScanTrigger) -> (Option<i64>, Uuid) {
        let run = match dropscan_db::create_scan_run(&self.pool, trigger).await {
            Ok(run) => run,
            Err(e) => {
                tracing::error!(error = %e, "could not record scan run; sweeping untracked");
                return (None, Uuid::new_v4());
            }
        };
        if let Err(e) = dropscan_db::start_scan_run(&self.pool, run.id).await {
            tracing::error!(scan_id = %run.public_id, error = %e, "could not mark scan run running");
            return (None, run.public_id);
        }
        (Some(run.id), run.public_id)
    }
}

/// Waits until the channel carries a report.
pub async fn wait_for_report(
    mut done: watch::Receiver<Option<SweepReport>>,
) -> Option<SweepReport> {
    done.wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|report| report.clone())
}

async fn close_run(pool: &PgPool, run_id: i64, report: &SweepReport) {
    let tally = SweepTally {
        persisted: report.total_persisted(),
        resolved: report.total_resolved(),
        failed_chunks: report.failed_chunks(),
        cancelled: report.cancelled,
    };
    if let Err(e) = dropscan_db::close_scan_run(pool, run_id, tally).await {
        tracing::error!(scan_id = %report.scan_id, error = %e, "failed to record sweep outcome");
    }
}

#[cfg(test)]
#[path = "sweeps_test.rs"]
mod tests;
