//! Shared domain types and configuration for dropscan.
//!
//! Every other crate in the workspace speaks in these types: the scraper
//! produces [`RawListing`]s, the pipeline turns them into
//! [`EnrichedProduct`]s, and the store boundary persists them.

pub mod analysis;
pub mod app_config;
pub mod categories;
pub mod config;
pub mod listing;
pub mod product;
pub mod store;

use thiserror::Error;

pub use analysis::{AnalysisResult, Recommendation};
pub use app_config::{AppConfig, Environment, RetailerSearchUrl};
pub use categories::{
    configured_categories, default_categories, load_categories, CategoriesFile, Category,
    MAX_SEARCH_TERMS,
};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use listing::{is_storable_price, Query, RawListing, MAX_PRICE, MIN_PRICE, SYNTHETIC_TIER};
pub use product::{
    identity_key, normalized_name, Competitor, DemandSignal, EnrichedProduct, Faq, MarketSignals,
    RedditComment, RedditThread, SocialSignal, PLACEHOLDER_NAME,
};
pub use store::{ScanTrigger, SnapshotStore, StoreError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("categories validation failed: {0}")]
    Validation(String),
}
