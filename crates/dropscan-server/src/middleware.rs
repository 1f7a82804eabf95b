//! Request tagging and access control for the HTTP surface.
//!
//! `/health`, `/refresh` and `/deep-scan` are public. The product, scan-run
//! and analysis routes require one of the configured API keys and share a
//! per-minute request budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dropscan_core::{AppConfig, Environment};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id for one request, stored as a request extension and echoed
/// in every response envelope.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer keys accepted on the protected routes.
#[derive(Clone)]
pub struct ApiKeys {
    keys: Arc<[String]>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("count", &self.keys.len())
            .finish()
    }
}

impl ApiKeys {
    /// Keys from `DROPSCAN_API_KEYS`.
    ///
    /// An empty key set leaves the protected routes open, which is only
    /// allowed in development.
    ///
    /// # Errors
    ///
    /// Returns an error when no keys are configured outside development.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.api_keys.is_empty() {
            if config.env != Environment::Development {
                anyhow::bail!(
                    "DROPSCAN_API_KEYS is required when DROPSCAN_ENV is {}",
                    config.env
                );
            }
            tracing::warn!("DROPSCAN_API_KEYS is empty; read routes are open in development");
        }
        Ok(Self::new(config.api_keys.clone()))
    }

    #[must_use]
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys: keys.into() }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.keys.is_empty()
    }

    fn accepts(&self, presented: &str) -> bool {
        // Compare against every key so timing does not reveal which one matched.
        self.keys.iter().fold(false, |hit, key| {
            hit | bool::from(key.as_bytes().ct_eq(presented.as_bytes()))
        })
    }
}

#[derive(Debug)]
struct BudgetWindow {
    opened_at: Instant,
    spent: u32,
}

/// Fixed-window request budget shared by every protected route.
#[derive(Debug, Clone)]
pub struct RequestBudget {
    per_window: u32,
    window: Duration,
    current: Arc<Mutex<BudgetWindow>>,
}

impl RequestBudget {
    #[must_use]
    pub fn new(per_window: u32, window: Duration) -> Self {
        Self {
            per_window,
            window,
            current: Arc::new(Mutex::new(BudgetWindow {
                opened_at: Instant::now(),
                spent: 0,
            })),
        }
    }

    #[must_use]
    pub fn per_minute(per_minute: u32) -> Self {
        Self::new(per_minute, Duration::from_secs(60))
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::per_minute(config.api_rate_limit_per_minute)
    }

    /// Spend one request, or return `false` when the window is used up.
    async fn try_spend(&self) -> bool {
        let mut current = self.current.lock().await;
        if current.opened_at.elapsed() >= self.window {
            current.opened_at = Instant::now();
            current.spent = 0;
        }
        if current.spent >= self.per_window {
            return false;
        }
        current.spent += 1;
        true
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Reuse the caller's `x-request-id` or mint a UUID, then echo it back.
pub async fn tag_request(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

pub async fn require_api_key(State(keys): State<ApiKeys>, req: Request, next: Next) -> Response {
    if keys.is_open() {
        return next.run(req).await;
    }
    let presented = bearer_token(req.headers().get(AUTHORIZATION));
    if presented.is_some_and(|token| keys.accepts(token)) {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "rejected request without a valid api key");
    ApiError::new(
        request_id_of(&req),
        "unauthorized",
        "missing or invalid bearer token",
    )
    .into_response()
}

pub async fn spend_request_budget(
    State(budget): State<RequestBudget>,
    req: Request,
    next: Next,
) -> Response {
    if budget.try_spend().await {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), limit = budget.per_window, "request budget exhausted");
    ApiError::new(
        request_id_of(&req),
        "rate_limited",
        "request budget exhausted; retry after the current minute",
    )
    .into_response()
}

fn bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
