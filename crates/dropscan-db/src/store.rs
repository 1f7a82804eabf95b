use async_trait::async_trait;
use dropscan_core::{EnrichedProduct, SnapshotStore, StoreError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::snapshots::insert_product_snapshots;
use crate::DbError;

/// [`SnapshotStore`] backed by the `product_snapshots` table.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn insert_batch(
        &self,
        scan_id: Uuid,
        products: &[EnrichedProduct],
    ) -> Result<usize, StoreError> {
        match insert_product_snapshots(&self.pool, scan_id, products).await {
            Ok(written) => Ok(usize::try_from(written).unwrap_or(usize::MAX)),
            Err(e) => Err(to_store_error(e, products.len())),
        }
    }
}

fn to_store_error(err: DbError, count: usize) -> StoreError {
    match err {
        DbError::Sqlx(sqlx::Error::Database(db)) => StoreError::Rejected {
            count,
            reason: db.message().to_owned(),
        },
        other => StoreError::Unavailable(other.to_string()),
    }
}
