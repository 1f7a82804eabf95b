//! Sweep trigger endpoints. Both answer immediately; the sweep itself runs
//! on the [`SweepWorker`](crate::sweeps::SweepWorker).

use axum::{extract::State, http::StatusCode, Extension, Json};
use dropscan_core::{EnrichedProduct, ScanTrigger};
use serde::Serialize;

use crate::middleware::RequestId;
use crate::sweeps::StartOutcome;

use super::{ApiResponse, AppState, ResponseMeta};

/// Products returned synchronously by `POST /refresh`.
pub(super) const PREVIEW_SIZE: usize = 6;

#[derive(Debug, Serialize)]
pub(super) struct RefreshData {
    #[serde(flatten)]
    outcome: StartOutcome,
    preview: Vec<EnrichedProduct>,
}

pub(super) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<RefreshData>>) {
    let outcome = state.worker.start(ScanTrigger::ApiRefresh).await;
    let preview = state.worker.preview(PREVIEW_SIZE);
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: RefreshData { outcome, preview },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub(super) async fn deep_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<StartOutcome>>) {
    let outcome = state.worker.start(ScanTrigger::ApiDeepScan).await;
    (
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: outcome,
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}
