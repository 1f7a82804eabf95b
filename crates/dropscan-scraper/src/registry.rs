//! Builds the cascade tiers from application config.

use std::sync::Arc;
use std::time::Duration;

use dropscan_core::AppConfig;

use crate::adapter::{SourceAdapter, Tier};
use crate::client::HttpFetcher;
use crate::error::ScraperError;
use crate::shopify::ShopifyAdapter;
use crate::storefront::{RenderProxy, StorefrontAdapter};
use crate::trends::TrendsFeed;

/// One tier per configured retailer search page, then one per Shopify store.
///
/// Storefront tiers get the render timeout on top of the request timeout,
/// since one search may run both the render and the direct stage.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if an HTTP client cannot be built.
pub fn build_tiers(config: &AppConfig) -> Result<Vec<Tier>, ScraperError> {
    let fetcher = Arc::new(build_fetcher(config)?);
    let render_timeout = Duration::from_secs(config.scraper_render_timeout_secs);
    let request_timeout = Duration::from_secs(config.scraper_request_timeout_secs);
    let render = RenderProxy::new(
        config.render_url.clone(),
        config.render_token.clone(),
        render_timeout,
    )?;
    if !render.is_configured() {
        tracing::info!("render proxy not configured, storefront tiers fetch directly");
    }

    let mut tiers = Vec::new();
    for retailer in &config.retailer_search_urls {
        let adapter = StorefrontAdapter::new(retailer, Arc::clone(&fetcher), render.clone());
        tiers.push(Tier::new(
            retailer.name.clone(),
            Arc::new(adapter),
            render_timeout + request_timeout,
        ));
    }
    for store in &config.shopify_stores {
        let adapter = ShopifyAdapter::new(store, Arc::clone(&fetcher));
        let name = adapter.source_id().to_owned();
        tiers.push(Tier::new(name, Arc::new(adapter), request_timeout));
    }

    tracing::info!(tiers = tiers.len(), "source tiers registered");
    Ok(tiers)
}

/// The trending-keyword feed configured for the sweep.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
pub fn build_trends_feed(config: &AppConfig) -> Result<TrendsFeed, ScraperError> {
    Ok(TrendsFeed::new(
        config.trends_feed_url.clone(),
        Arc::new(build_fetcher(config)?),
    ))
}

/// # Errors
///
/// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
pub fn build_fetcher(config: &AppConfig) -> Result<HttpFetcher, ScraperError> {
    HttpFetcher::new(
        config.scraper_request_timeout_secs,
        &config.scraper_user_agent,
        config.scraper_max_retries,
        config.scraper_retry_backoff_base_secs,
    )
}
