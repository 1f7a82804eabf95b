use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

/// One stored snapshot as returned by the read API.
#[derive(Debug, Serialize)]
pub(super) struct SnapshotItem {
    identity_key: String,
    scan_id: Uuid,
    name: String,
    category: String,
    source: String,
    tier: String,
    is_synthetic: bool,
    price: Decimal,
    image_url: Option<String>,
    velocity_score: i16,
    saturation_score: i16,
    demand_signal: String,
    weekly_growth: f64,
    reddit_mentions: i32,
    sentiment_score: i16,
    themes: serde_json::Value,
    social_signals: serde_json::Value,
    faqs: serde_json::Value,
    competitors: serde_json::Value,
    reddit_threads: serde_json::Value,
    captured_at: DateTime<Utc>,
}

impl From<dropscan_db::ProductSnapshotRow> for SnapshotItem {
    fn from(row: dropscan_db::ProductSnapshotRow) -> Self {
        Self {
            identity_key: row.identity_key,
            scan_id: row.scan_id,
            name: row.name,
            category: row.category,
            source: row.source,
            tier: row.tier,
            is_synthetic: row.is_synthetic,
            price: row.price,
            image_url: row.image_url,
            velocity_score: row.velocity_score,
            saturation_score: row.saturation_score,
            demand_signal: row.demand_signal,
            weekly_growth: row.weekly_growth,
            reddit_mentions: row.reddit_mentions,
            sentiment_score: row.sentiment_score,
            themes: row.themes,
            social_signals: row.social_signals,
            faqs: row.faqs,
            competitors: row.competitors,
            reddit_threads: row.reddit_threads,
            captured_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Latest snapshot per product, optionally narrowed to one category.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let rows =
        dropscan_db::list_latest_snapshots(&state.pool, category, normalize_limit(query.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SnapshotItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn product_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(identity_key): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<SnapshotItem>>>, ApiError> {
    if !is_identity_key(&identity_key) {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "identity key must be 32 lowercase hex characters",
        ));
    }

    let rows =
        dropscan_db::list_snapshot_history(&state.pool, &identity_key, normalize_limit(query.limit))
            .await
            .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if rows.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no snapshots for {identity_key}"),
        ));
    }

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(SnapshotItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn is_identity_key(key: &str) -> bool {
    key.len() == 32 && key.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
