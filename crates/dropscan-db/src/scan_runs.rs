//! Database operations for `scan_runs`.
//!
//! Lifecycle: `queued` → `running` → `succeeded` | `failed` | `cancelled`.
//! Every transition is a guarded `UPDATE ... WHERE status = ...`; a row in
//! the wrong state yields [`DbError::InvalidScanRunTransition`].

use chrono::{DateTime, Utc};
use dropscan_core::ScanTrigger;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `scan_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SCAN_RUN_COLUMNS: &str = "id, public_id, trigger_source, status, started_at, completed_at, \
                                records_processed, error_message, created_at";

/// Creates a new scan run in `queued` status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_scan_run(pool: &PgPool, trigger: ScanTrigger) -> Result<ScanRunRow, DbError> {
    let row = sqlx::query_as::<_, ScanRunRow>(&format!(
        "INSERT INTO scan_runs (public_id, trigger_source, status) \
         VALUES ($1, $2, 'queued') \
         RETURNING {SCAN_RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(trigger.as_str())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a queued run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScanRunTransition`] if the run is not queued, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_scan_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scan_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScanRunTransition {
            id,
            expected_status: "queued",
        });
    }
    Ok(())
}

/// Marks a running run as `succeeded` with its persisted snapshot count.
///
/// # Errors
///
/// Returns [`DbError::InvalidScanRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_scan_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scan_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScanRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Marks a running run as `failed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidScanRunTransition`] if the run is not running,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_scan_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scan_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScanRunTransition {
            id,
            expected_status: "running",
        });
    }
    Ok(())
}

/// Marks a queued or running run as `cancelled`, keeping what it persisted.
///
/// # Errors
///
/// Returns [`DbError::InvalidScanRunTransition`] if the run already finished,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn cancel_scan_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scan_runs \
         SET status = 'cancelled', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidScanRunTransition {
            id,
            expected_status: "queued or running",
        });
    }
    Ok(())
}

/// Counts from a finished sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepTally {
    pub persisted: usize,
    pub resolved: usize,
    pub failed_chunks: usize,
    pub cancelled: bool,
}

/// The terminal state a sweep's run is moved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunClosure {
    Succeeded { records_processed: i32 },
    Failed { error_message: String },
    Cancelled { records_processed: i32 },
}

impl SweepTally {
    /// A cancelled sweep stays cancelled. A sweep that resolved products but
    /// persisted none failed. Anything else, an empty sweep included,
    /// succeeded.
    #[must_use]
    pub fn closure(&self) -> RunClosure {
        let records_processed = i32::try_from(self.persisted).unwrap_or(i32::MAX);
        if self.cancelled {
            RunClosure::Cancelled { records_processed }
        } else if self.persisted == 0 && self.resolved > 0 {
            RunClosure::Failed {
                error_message: format!(
                    "no snapshots persisted; {} chunks rejected",
                    self.failed_chunks
                ),
            }
        } else {
            RunClosure::Succeeded { records_processed }
        }
    }
}

/// Moves a run to the terminal state its sweep earned.
///
/// # Errors
///
/// Returns [`DbError::InvalidScanRunTransition`] if the run already finished,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn close_scan_run(
    pool: &PgPool,
    id: i64,
    tally: SweepTally,
) -> Result<RunClosure, DbError> {
    let closure = tally.closure();
    match &closure {
        RunClosure::Succeeded { records_processed } => {
            complete_scan_run(pool, id, *records_processed).await?;
        }
        RunClosure::Failed { error_message } => fail_scan_run(pool, id, error_message).await?,
        RunClosure::Cancelled { records_processed } => {
            cancel_scan_run(pool, id, *records_processed).await?;
        }
    }
    Ok(closure)
}

/// Fetches a run by its public UUID.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such run exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_scan_run(pool: &PgPool, public_id: Uuid) -> Result<ScanRunRow, DbError> {
    sqlx::query_as::<_, ScanRunRow>(&format!(
        "SELECT {SCAN_RUN_COLUMNS} FROM scan_runs WHERE public_id = $1"
    ))
    .bind(public_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_scan_runs(pool: &PgPool, limit: i64) -> Result<Vec<ScanRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ScanRunRow>(&format!(
        "SELECT {SCAN_RUN_COLUMNS} FROM scan_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Marks runs left `queued` or `running` by a previous process as `failed`.
///
/// Returns how many rows were updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn fail_abandoned_scan_runs(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE scan_runs \
         SET status = 'failed', completed_at = NOW(), \
             error_message = 'abandoned: process exited before the run finished' \
         WHERE status IN ('queued', 'running')",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
