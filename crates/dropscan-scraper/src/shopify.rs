//! Shopify predictive-search adapter.
//!
//! Every Shopify storefront exposes `/search/suggest.json`, which returns up
//! to ten products for a free-text query without authentication.

use std::sync::Arc;

use async_trait::async_trait;
use dropscan_core::RawListing;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::adapter::{AdapterFailure, SourceAdapter};
use crate::client::{extract_domain, extract_store_origin, HttpFetcher, RequestProfile};
use crate::error::ScraperError;
use crate::storefront::jsonld::parse_price;

/// Shopify caps predictive search results at this many products.
pub const SHOPIFY_SUGGEST_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    resources: SuggestResources,
}

#[derive(Debug, Deserialize)]
struct SuggestResources {
    results: SuggestResults,
}

#[derive(Debug, Default, Deserialize)]
struct SuggestResults {
    #[serde(default)]
    products: Vec<SuggestProduct>,
}

#[derive(Debug, Deserialize)]
struct SuggestProduct {
    title: String,
    /// A decimal string on most stores, a number on some themes.
    #[serde(default)]
    price: serde_json::Value,
    #[serde(default)]
    image: Option<String>,
}

pub struct ShopifyAdapter {
    source_id: String,
    origin: String,
    fetcher: Arc<HttpFetcher>,
}

impl ShopifyAdapter {
    /// Builds an adapter for the store at `store_url` (any URL on the store).
    #[must_use]
    pub fn new(store_url: &str, fetcher: Arc<HttpFetcher>) -> Self {
        let origin = extract_store_origin(store_url);
        Self {
            source_id: format!("shopify:{}", extract_domain(&origin)),
            origin,
            fetcher,
        }
    }

    #[must_use]
    pub fn suggest_url(&self, query: &str, limit: usize) -> String {
        let q = utf8_percent_encode(query.trim(), NON_ALPHANUMERIC);
        format!(
            "{}/search/suggest.json?q={q}&resources[type]=product&resources[limit]={}",
            self.origin,
            limit.min(SHOPIFY_SUGGEST_LIMIT)
        )
    }

    async fn fetch(
        &self,
        url: &str,
        profile: RequestProfile,
    ) -> Result<SuggestResponse, ScraperError> {
        let body = self.fetcher.get_text(url, profile).await?;
        serde_json::from_str(&body).map_err(|source| ScraperError::Deserialize {
            context: url.to_owned(),
            source,
        })
    }

    fn to_listing(&self, product: SuggestProduct, category: &str) -> Option<RawListing> {
        let price = parse_price(&product.price)?;
        let image_url = product.image.map(|img| absolutize(&self.origin, &img));
        RawListing::new(product.title, price, image_url, self.source_id.clone(), category)
    }
}

/// Shopify returns protocol-relative (`//cdn...`) and path-relative URLs.
fn absolutize(origin: &str, url: &str) -> String {
    if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        url.to_owned()
    }
}

#[async_trait]
impl SourceAdapter for ShopifyAdapter {
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
        let url = self.suggest_url(query, limit);

        let response = match self.fetch(&url, RequestProfile::Default).await {
            Ok(r) => r,
            Err(e) => {
                let failure = AdapterFailure::from(e);
                if !matches!(failure, AdapterFailure::Blocked(_)) {
                    return Err(failure);
                }
                tracing::debug!(source = %self.source_id, "blocked with default profile, retrying as browser");
                self.fetch(&url, RequestProfile::Browser)
                    .await
                    .map_err(AdapterFailure::from)?
            }
        };

        let products = response.resources.results.products;
        let listings = products
            .into_iter()
            .filter_map(|p| self.to_listing(p, category))
            .take(limit)
            .collect();
        Ok(listings)
    }
}
