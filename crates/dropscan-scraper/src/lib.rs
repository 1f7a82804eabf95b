//! Product source adapters for the discovery cascade.
//!
//! Adapters implement [`SourceAdapter`] and are wrapped in a [`Tier`] by
//! [`build_tiers`]. Failures never escape as errors past the adapter
//! boundary; they are reported as [`AdapterFailure`] for the resolver to log.

pub mod adapter;
pub mod client;
pub mod error;
pub(crate) mod rate_limit;
pub mod registry;
pub mod shopify;
pub mod storefront;
pub mod trends;

pub use adapter::{AdapterFailure, SourceAdapter, Tier};
pub use client::{HttpFetcher, RequestProfile};
pub use error::ScraperError;
pub use registry::{build_fetcher, build_tiers, build_trends_feed};
pub use shopify::ShopifyAdapter;
pub use storefront::{RenderProxy, StorefrontAdapter};
pub use trends::{NoTrends, TrendingSource, TrendsFeed};
