//! Retailer search-page adapter.
//!
//! Each configured retailer is a URL template with a `{query}` placeholder.
//! The page is fetched through the render proxy first and, if that stage
//! fails or finds nothing, directly with a browser header profile. Products
//! are read from the page's JSON-LD.

pub mod jsonld;
pub mod render;

use std::sync::Arc;

use async_trait::async_trait;
use dropscan_core::{RawListing, RetailerSearchUrl};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::adapter::{AdapterFailure, SourceAdapter};
use crate::client::{HttpFetcher, RequestProfile};
use crate::error::ScraperError;

pub use jsonld::{extract_products, ProductCandidate};
pub use render::RenderProxy;

pub struct StorefrontAdapter {
    source_id: String,
    url_template: String,
    fetcher: Arc<HttpFetcher>,
    render: RenderProxy,
}

impl StorefrontAdapter {
    #[must_use]
    pub fn new(
        retailer: &RetailerSearchUrl,
        fetcher: Arc<HttpFetcher>,
        render: RenderProxy,
    ) -> Self {
        Self {
            source_id: retailer.name.clone(),
            url_template: retailer.url_template.clone(),
            fetcher,
            render,
        }
    }

    /// Substitutes the percent-encoded query into the retailer template.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let encoded = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC).to_string();
        self.url_template.replace("{query}", &encoded)
    }

    fn to_listings(
        &self,
        candidates: Vec<ProductCandidate>,
        category: &str,
        limit: usize,
    ) -> Vec<RawListing> {
        candidates
            .into_iter()
            .filter_map(|c| {
                RawListing::new(c.name, c.price?, c.image_url, self.source_id.clone(), category)
            })
            .take(limit)
            .collect()
    }

    async fn fetch_rendered(&self, url: &str) -> Result<Vec<ProductCandidate>, ScraperError> {
        let html = self.render.render(url).await?;
        Ok(extract_products(&html))
    }

    async fn fetch_direct(&self, url: &str) -> Result<Vec<ProductCandidate>, ScraperError> {
        let html = self.fetcher.get_text(url, RequestProfile::Browser).await?;
        Ok(extract_products(&html))
    }
}

#[async_trait]
impl SourceAdapter for StorefrontAdapter {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    async fn search(
        &self,
        query: &str,
        category: &str,
        limit: usize,
    ) -> Result<Vec<RawListing>, AdapterFailure> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let url = self.search_url(query);

        if self.render.is_configured() {
            match self.fetch_rendered(&url).await {
                Ok(candidates) => {
                    let listings = self.to_listings(candidates, category, limit);
                    if !listings.is_empty() {
                        return Ok(listings);
                    }
                    tracing::debug!(
                        source = %self.source_id,
                        %url,
                        "rendered page had no priced products"
                    );
                }
                Err(e) => {
                    tracing::debug!(source = %self.source_id, %url, error = %e, "render stage failed");
                }
            }
        }

        let candidates = self.fetch_direct(&url).await.map_err(AdapterFailure::from)?;
        Ok(self.to_listings(candidates, category, limit))
    }
}
