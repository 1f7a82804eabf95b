use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dropscan_analysis::{static_fallback, Analysis, AnalysisRequest, STATIC_FALLBACK_SOURCE};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

const DEFAULT_REGION: &str = "US";
const UNKNOWN_PRICE: &str = "unknown";

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeQuery {
    pub product: Option<String>,
    pub price: Option<String>,
    pub region: Option<String>,
}

impl AnalyzeQuery {
    fn into_request(self) -> AnalysisRequest {
        let non_blank =
            |v: Option<String>| v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());
        AnalysisRequest::new(
            non_blank(self.product).unwrap_or_default(),
            non_blank(self.price).unwrap_or_else(|| UNKNOWN_PRICE.to_owned()),
            non_blank(self.region).unwrap_or_else(|| DEFAULT_REGION.to_owned()),
        )
    }
}

/// Always answers 200 with a structurally valid analysis.
///
/// A request without a product name skips the providers and gets the
/// static fallback directly.
pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AnalyzeQuery>,
) -> Json<ApiResponse<Analysis>> {
    let request = query.into_request();
    let analysis = if request.product_name.is_empty() {
        Analysis {
            result: static_fallback(&request, &[]),
            source: STATIC_FALLBACK_SOURCE.to_owned(),
        }
    } else {
        state.analyzer.analyze(&request).await
    };

    Json(ApiResponse {
        data: analysis,
        meta: ResponseMeta::new(req_id.0),
    })
}
