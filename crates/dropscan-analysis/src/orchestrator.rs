//! Ordered provider chain ending in a static fallback.
//!
//! Providers are tried in order. The first one whose text yields a valid
//! analysis wins; a timeout, transport error, bad status, or unparsable reply
//! moves on to the next. When every provider fails the caller still gets a
//! structurally valid [`AnalysisResult`].

use std::sync::Arc;

use dropscan_core::{normalized_name, AnalysisResult, AppConfig, Recommendation};
use serde::Serialize;

use crate::chat::ChatCompletionProvider;
use crate::error::ProviderError;
use crate::extract::parse_analysis;
use crate::gemini::GeminiProvider;
use crate::provider::{AnalysisProvider, AnalysisRequest};

/// Source name reported when no provider produced the result.
pub const STATIC_FALLBACK_SOURCE: &str = "static-fallback";

/// Viability score of the static fallback result.
pub const FALLBACK_VIABILITY_SCORE: u8 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub result: AnalysisResult,
    /// Name of the provider that produced `result`, or [`STATIC_FALLBACK_SOURCE`].
    pub source: String,
}

impl Analysis {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == STATIC_FALLBACK_SOURCE
    }
}

pub struct AnalysisOrchestrator {
    providers: Vec<Arc<dyn AnalysisProvider>>,
}

impl AnalysisOrchestrator {
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn AnalysisProvider>>) -> Self {
        Self { providers }
    }

    /// Primary chat-completion provider followed by the Gemini provider.
    ///
    /// Providers without an API key stay in the chain and fail immediately
    /// with [`ProviderError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let primary = ChatCompletionProvider::new(
            config.ai_primary_url.clone(),
            config.ai_primary_model.clone(),
            config.ai_primary_api_key.clone(),
            std::time::Duration::from_secs(config.ai_primary_timeout_secs),
        )?;
        let secondary = GeminiProvider::new(
            &config.ai_secondary_url,
            config.ai_secondary_model.clone(),
            config.ai_secondary_api_key.clone(),
            std::time::Duration::from_secs(config.ai_secondary_timeout_secs),
        )?;
        Ok(Self::new(vec![Arc::new(primary), Arc::new(secondary)]))
    }

    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_owned()).collect()
    }

    /// Runs the chain. Never fails.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Analysis {
        let mut failed = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            match attempt(provider.as_ref(), request).await {
                Ok(result) => {
                    tracing::info!(
                        provider = provider.name(),
                        product = %request.product_name,
                        viability = result.viability_score,
                        "analysis produced"
                    );
                    return Analysis {
                        result,
                        source: provider.name().to_owned(),
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        product = %request.product_name,
                        error = %e,
                        "analysis provider failed"
                    );
                    failed.push(provider.name().to_owned());
                }
            }
        }

        Analysis {
            result: static_fallback(request, &failed),
            source: STATIC_FALLBACK_SOURCE.to_owned(),
        }
    }
}

async fn attempt(
    provider: &dyn AnalysisProvider,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, ProviderError> {
    let timeout = provider.timeout();
    let text = tokio::time::timeout(timeout, provider.complete(request))
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;
    parse_analysis(&text, &request.product_name)
}

/// The conservative result returned when every provider failed.
#[must_use]
pub fn static_fallback(request: &AnalysisRequest, failed: &[String]) -> AnalysisResult {
    let service = if failed.is_empty() {
        "AI analysis service".to_owned()
    } else {
        format!("AI analysis service ({})", failed.join(", "))
    };
    AnalysisResult {
        actual_full_name: normalized_name(&request.product_name).to_owned(),
        viability_score: FALLBACK_VIABILITY_SCORE,
        recommendation: Recommendation::Skip,
        top_risks: vec![format!(
            "{service} unavailable; this score is a default, not an assessment"
        )],
        suggestions: vec![
            "Retry the analysis later".to_owned(),
            "Validate demand with a small test order before committing".to_owned(),
        ],
        reasoning: "Automated analysis could not be completed, so a conservative default was returned."
            .to_owned(),
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
