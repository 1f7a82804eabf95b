//! One-off product inspection: AI analysis and enrichment signals.

use dropscan_analysis::{AnalysisOrchestrator, AnalysisRequest};
use dropscan_core::{AppConfig, EnrichedProduct, RawListing};
use dropscan_pipeline::EnrichmentEngine;

/// # Errors
///
/// Returns an error if a provider client cannot be built or the result
/// cannot be serialized. Provider failures fall back to the static answer.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    name: &str,
    price: Option<&str>,
    region: &str,
) -> anyhow::Result<()> {
    let orchestrator = AnalysisOrchestrator::from_config(config)?;
    let request = AnalysisRequest::new(name, price.unwrap_or("unknown"), region);
    let analysis = orchestrator.analyze(&request).await;
    if analysis.is_fallback() {
        tracing::warn!(product = %name, "no provider answered; showing static fallback");
    }
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

/// Enrichment for a single ad-hoc listing, tagged with the `cli` source.
///
/// # Errors
///
/// Returns an error when the name is blank or the price is not positive.
pub(crate) fn enrich_one(name: &str, price: f64) -> anyhow::Result<EnrichedProduct> {
    let listing = RawListing::new(name, price, None, "cli", "uncategorized")
        .ok_or_else(|| anyhow::anyhow!("invalid listing: name must be non-blank and price > 0"))?
        .with_tier("cli");
    Ok(EnrichmentEngine::new().enrich(&listing))
}

/// # Errors
///
/// See [`enrich_one`].
pub(crate) fn run_enrich(name: &str, price: f64) -> anyhow::Result<()> {
    let product = enrich_one(name, price)?;
    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}
