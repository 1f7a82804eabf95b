use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScanRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScanRunItem {
    scan_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    records_processed: i32,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<dropscan_db::ScanRunRow> for ScanRunItem {
    fn from(row: dropscan_db::ScanRunRow) -> Self {
        Self {
            scan_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            records_processed: row.records_processed,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_scan_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScanRunsQuery>,
) -> Result<Json<ApiResponse<Vec<ScanRunItem>>>, ApiError> {
    let rows = dropscan_db::list_scan_runs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(ScanRunItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_scan_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scan_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ScanRunItem>>, ApiError> {
    let row = match dropscan_db::get_scan_run(&state.pool, scan_id).await {
        Ok(row) => row,
        Err(dropscan_db::DbError::NotFound) => {
            return Err(ApiError::new(
                req_id.0,
                "not_found",
                format!("scan run {scan_id} not found"),
            ));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    };

    Ok(Json(ApiResponse {
        data: ScanRunItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
