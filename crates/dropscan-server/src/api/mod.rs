mod analyze;
mod products;
mod scan_runs;
mod triggers;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use dropscan_analysis::AnalysisOrchestrator;
use dropscan_core::AppConfig;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::middleware::{
    require_api_key, spend_request_budget, tag_request, ApiKeys, RequestBudget, RequestId,
    REQUEST_ID_HEADER,
};
use crate::sweeps::SweepWorker;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub worker: Arc<SweepWorker>,
    pub analyzer: Arc<AnalysisOrchestrator>,
    pub providers: Arc<Vec<ProviderStatus>>,
}

/// Whether an AI provider has the credentials it needs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: String,
    pub configured: bool,
}

impl ProviderStatus {
    /// Primary then secondary, matching the orchestrator chain order.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Vec<Self> {
        vec![
            Self {
                name: "primary".to_owned(),
                configured: config.ai_primary_api_key.is_some(),
            },
            Self {
                name: "secondary".to_owned(),
                configured: config.ai_secondary_api_key.is_some(),
            },
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    sweep_running: Option<Uuid>,
    source_tiers: Vec<String>,
    ai_providers: Vec<ProviderStatus>,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &dropscan_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Routes behind an API key. Unauthenticated callers are turned away before
/// they spend from the request budget.
fn protected_router(keys: ApiKeys, budget: RequestBudget) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(products::list_products))
        .route(
            "/api/v1/products/{identity_key}/history",
            get(products::product_history),
        )
        .route("/api/v1/scan-runs", get(scan_runs::list_scan_runs))
        .route("/api/v1/scan-runs/{scan_id}", get(scan_runs::get_scan_run))
        .route("/api/ai/analyze", get(analyze::analyze))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(keys, require_api_key))
                .layer(axum::middleware::from_fn_with_state(
                    budget,
                    spend_request_budget,
                )),
        )
}

pub fn build_app(state: AppState, keys: ApiKeys, budget: RequestBudget) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/refresh", post(triggers::refresh))
        .route("/deep-scan", post(triggers::deep_scan));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(keys, budget))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(tag_request)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let database_ok = match dropscan_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            false
        }
    };

    let data = HealthData {
        status: if database_ok { "ok" } else { "degraded" },
        database: if database_ok { "ok" } else { "unavailable" },
        sweep_running: state.worker.running().await,
        source_tiers: state.worker.tier_names(),
        ai_providers: state.providers.as_ref().clone(),
    };
    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ApiResponse { data, meta }))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
