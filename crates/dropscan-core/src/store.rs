//! Snapshot store boundary.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::product::EnrichedProduct;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("rejected batch of {count} products: {reason}")]
    Rejected { count: usize, reason: String },
}

/// What started a scan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    ApiRefresh,
    ApiDeepScan,
    Cron,
    Cli,
}

impl ScanTrigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScanTrigger::ApiRefresh => "api-refresh",
            ScanTrigger::ApiDeepScan => "api-deep-scan",
            ScanTrigger::Cron => "cron",
            ScanTrigger::Cli => "cli",
        }
    }
}

impl std::fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only persistence for enriched product snapshots.
///
/// Implementations must never overwrite earlier rows for the same identity
/// key; each call appends one row per product, tagged with `scan_id`.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist one chunk of products, returning how many rows were accepted.
    async fn insert_batch(
        &self,
        scan_id: Uuid,
        products: &[EnrichedProduct],
    ) -> Result<usize, StoreError>;
}
