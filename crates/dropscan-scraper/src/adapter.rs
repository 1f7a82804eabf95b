//! The source adapter boundary consumed by the cascade resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dropscan_core::RawListing;
use thiserror::Error;

use crate::error::ScraperError;

/// Why one adapter call produced nothing.
///
/// Every variant is a soft failure: the resolver moves to the next tier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterFailure {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("blocked or rate limited: {0}")]
    Blocked(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unparsable response: {0}")]
    Unparsable(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl From<ScraperError> for AdapterFailure {
    fn from(err: ScraperError) -> Self {
        match err {
            ScraperError::Http(e) if e.is_timeout() => AdapterFailure::Transport(format!(
                "request timed out: {e}"
            )),
            ScraperError::Http(e) => AdapterFailure::Transport(e.to_string()),
            ScraperError::RateLimited { domain, .. } => AdapterFailure::Blocked(domain),
            ScraperError::UnexpectedStatus { status: 403, url } => AdapterFailure::Blocked(url),
            ScraperError::UnexpectedStatus { status, .. } => AdapterFailure::Status(status),
            ScraperError::NotFound { .. } => AdapterFailure::Status(404),
            e @ (ScraperError::Deserialize { .. }
            | ScraperError::Xml { .. }
            | ScraperError::InvalidUrl { .. }) => AdapterFailure::Unparsable(e.to_string()),
            ScraperError::NotConfigured { what } => AdapterFailure::NotConfigured(what),
        }
    }
}

/// One external catalog.
///
/// `search` must not panic; every network, parse, or configuration problem
/// is reported as an [`AdapterFailure`]. Listings with a non-positive price
/// must not be returned. Retry policy beyond an adapter's own fetch stages
/// belongs to the caller.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier used in logs and `RawListing::source`.
    fn source_id(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RawListing>, AdapterFailure>;
}

/// An adapter registered at one position of the cascade.
#[derive(Clone)]
pub struct Tier {
    pub name: String,
    pub adapter: Arc<dyn SourceAdapter>,
    /// Upper bound for one `search` call, enforced by the resolver.
    pub timeout: Duration,
}

impl Tier {
    pub fn new(
        name: impl Into<String>,
        adapter: Arc<dyn SourceAdapter>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            adapter,
            timeout,
        }
    }
}

impl std::fmt::Debug for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tier")
            .field("name", &self.name)
            .field("source_id", &self.adapter.source_id())
            .field("timeout", &self.timeout)
            .finish()
    }
}
