use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// One retailer search page registered as a cascade tier.
///
/// `url_template` contains a literal `{query}` placeholder that is replaced
/// with the percent-encoded query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetailerSearchUrl {
    pub name: String,
    pub url_template: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub categories_path: Option<PathBuf>,
    /// Bearer keys for the read API. Empty means the API is open.
    pub api_keys: Vec<String>,
    pub api_rate_limit_per_minute: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scraper_request_timeout_secs: u64,
    pub scraper_render_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub render_url: Option<String>,
    pub render_token: Option<String>,
    pub retailer_search_urls: Vec<RetailerSearchUrl>,
    pub shopify_stores: Vec<String>,
    pub trends_feed_url: String,
    pub scan_target: usize,
    pub scan_hard_cap: usize,
    pub scan_chunk_size: usize,
    pub scan_category_delay_ms: u64,
    pub scan_concurrent_tiers: bool,
    pub scan_cron: String,
    pub retention_days: u32,
    pub retention_cron: String,
    pub ai_primary_url: String,
    pub ai_primary_model: String,
    pub ai_primary_api_key: Option<String>,
    pub ai_primary_timeout_secs: u64,
    pub ai_secondary_url: String,
    pub ai_secondary_model: String,
    pub ai_secondary_api_key: Option<String>,
    pub ai_secondary_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("categories_path", &self.categories_path)
            .field("api_keys", &format!("[{} redacted]", self.api_keys.len()))
            .field("api_rate_limit_per_minute", &self.api_rate_limit_per_minute)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field(
                "scraper_render_timeout_secs",
                &self.scraper_render_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field("render_url", &self.render_url)
            .field(
                "render_token",
                &self.render_token.as_ref().map(|_| "[redacted]"),
            )
            .field("retailer_search_urls", &self.retailer_search_urls)
            .field("shopify_stores", &self.shopify_stores)
            .field("trends_feed_url", &self.trends_feed_url)
            .field("scan_target", &self.scan_target)
            .field("scan_hard_cap", &self.scan_hard_cap)
            .field("scan_chunk_size", &self.scan_chunk_size)
            .field("scan_category_delay_ms", &self.scan_category_delay_ms)
            .field("scan_concurrent_tiers", &self.scan_concurrent_tiers)
            .field("scan_cron", &self.scan_cron)
            .field("retention_days", &self.retention_days)
            .field("retention_cron", &self.retention_cron)
            .field("ai_primary_url", &self.ai_primary_url)
            .field("ai_primary_model", &self.ai_primary_model)
            .field(
                "ai_primary_api_key",
                &self.ai_primary_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ai_primary_timeout_secs", &self.ai_primary_timeout_secs)
            .field("ai_secondary_url", &self.ai_secondary_url)
            .field("ai_secondary_model", &self.ai_secondary_model)
            .field(
                "ai_secondary_api_key",
                &self.ai_secondary_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ai_secondary_timeout_secs", &self.ai_secondary_timeout_secs)
            .finish()
    }
}
