//! The boundary between the orchestrator and a text-generation backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One product to analyse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub product_name: String,
    /// Free-form price as entered by the caller (`"$24.99"`, `"24.99"`).
    pub price: String,
    pub region: String,
}

impl AnalysisRequest {
    #[must_use]
    pub fn new(
        product_name: impl Into<String>,
        price: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            price: price.into(),
            region: region.into(),
        }
    }
}

#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Short name used in logs and returned as the analysis source.
    fn name(&self) -> &str;

    /// Upper bound the orchestrator allows for one [`complete`](Self::complete) call.
    fn timeout(&self) -> Duration;

    /// Raw generated text for `request`. Extraction is the caller's job.
    async fn complete(&self, request: &AnalysisRequest) -> Result<String, ProviderError>;
}
