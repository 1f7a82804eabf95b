use crate::app_config::{AppConfig, Environment, RetailerSearchUrl};
use crate::ConfigError;

const DEFAULT_TRENDS_FEED_URL: &str = "https://trends.google.com/trending/rss?geo=US";
const DEFAULT_AI_PRIMARY_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_AI_SECONDARY_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if required vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `FOO=` in a .env file disables a tier.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("DROPSCAN_ENV", "development"))?;

    let bind_addr = parse_addr("DROPSCAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("DROPSCAN_LOG_LEVEL", "info");
    let categories_path = optional("DROPSCAN_CATEGORIES_PATH").map(PathBuf::from);
    let api_keys = optional("DROPSCAN_API_KEYS")
        .map(|raw| split_list(&raw))
        .unwrap_or_default();
    let api_rate_limit_per_minute = parse_u32("DROPSCAN_API_RATE_LIMIT_PER_MINUTE", "120")?;
    if api_rate_limit_per_minute == 0 {
        return Err(invalid(
            "DROPSCAN_API_RATE_LIMIT_PER_MINUTE",
            "rate limit must be at least 1".to_string(),
        ));
    }

    let db_max_connections = parse_u32("DROPSCAN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("DROPSCAN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("DROPSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_u64("DROPSCAN_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    let scraper_render_timeout_secs = parse_u64("DROPSCAN_SCRAPER_RENDER_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "DROPSCAN_SCRAPER_USER_AGENT",
        "dropscan/0.1 (product-research)",
    );
    let scraper_max_retries = parse_u32("DROPSCAN_SCRAPER_MAX_RETRIES", "1")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("DROPSCAN_SCRAPER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let render_url = optional("DROPSCAN_RENDER_URL");
    let render_token = optional("DROPSCAN_RENDER_TOKEN");
    let retailer_search_urls = optional("DROPSCAN_RETAILER_SEARCH_URLS")
        .map(|raw| parse_retailer_search_urls(&raw))
        .transpose()?
        .unwrap_or_default();
    let shopify_stores = optional("DROPSCAN_SHOPIFY_STORES")
        .map(|raw| split_list(&raw))
        .unwrap_or_default();
    let trends_feed_url = or_default("DROPSCAN_TRENDS_FEED_URL", DEFAULT_TRENDS_FEED_URL);

    let scan_target = parse_usize("DROPSCAN_SCAN_TARGET", "40")?;
    let scan_hard_cap = parse_usize("DROPSCAN_SCAN_HARD_CAP", "60")?;
    if scan_hard_cap < scan_target {
        return Err(invalid(
            "DROPSCAN_SCAN_HARD_CAP",
            format!("hard cap {scan_hard_cap} is below the scan target {scan_target}"),
        ));
    }
    let scan_chunk_size = parse_usize("DROPSCAN_SCAN_CHUNK_SIZE", "50")?;
    if scan_chunk_size == 0 {
        return Err(invalid(
            "DROPSCAN_SCAN_CHUNK_SIZE",
            "chunk size must be at least 1".to_string(),
        ));
    }
    let scan_category_delay_ms = parse_u64("DROPSCAN_SCAN_CATEGORY_DELAY_MS", "5000")?;
    let scan_concurrent_tiers = parse_bool("DROPSCAN_SCAN_CONCURRENT_TIERS", "false")?;
    let scan_cron = or_default("DROPSCAN_SCAN_CRON", "0 0 */6 * * *");
    let retention_days = parse_u32("DROPSCAN_RETENTION_DAYS", "7")?;
    let retention_cron = or_default("DROPSCAN_RETENTION_CRON", "0 30 3 * * *");

    let ai_primary_url = or_default("DROPSCAN_AI_PRIMARY_URL", DEFAULT_AI_PRIMARY_URL);
    let ai_primary_model = or_default("DROPSCAN_AI_PRIMARY_MODEL", "gpt-4o-mini");
    let ai_primary_api_key = optional("DROPSCAN_AI_PRIMARY_API_KEY");
    let ai_primary_timeout_secs = parse_u64("DROPSCAN_AI_PRIMARY_TIMEOUT_SECS", "20")?;
    let ai_secondary_url = or_default("DROPSCAN_AI_SECONDARY_URL", DEFAULT_AI_SECONDARY_URL);
    let ai_secondary_model = or_default("DROPSCAN_AI_SECONDARY_MODEL", "gemini-1.5-flash");
    let ai_secondary_api_key = optional("DROPSCAN_AI_SECONDARY_API_KEY");
    let ai_secondary_timeout_secs = parse_u64("DROPSCAN_AI_SECONDARY_TIMEOUT_SECS", "20")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        categories_path,
        api_keys,
        api_rate_limit_per_minute,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_render_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        render_url,
        render_token,
        retailer_search_urls,
        shopify_stores,
        trends_feed_url,
        scan_target,
        scan_hard_cap,
        scan_chunk_size,
        scan_category_delay_ms,
        scan_concurrent_tiers,
        scan_cron,
        retention_days,
        retention_cron,
        ai_primary_url,
        ai_primary_model,
        ai_primary_api_key,
        ai_primary_timeout_secs,
        ai_secondary_url,
        ai_secondary_model,
        ai_secondary_api_key,
        ai_secondary_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DROPSCAN_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse `name=https://host/search?q={query}` pairs separated by commas.
fn parse_retailer_search_urls(raw: &str) -> Result<Vec<RetailerSearchUrl>, ConfigError> {
    split_list(raw)
        .into_iter()
        .map(|entry| {
            let invalid = |reason: &str| ConfigError::InvalidEnvVar {
                var: "DROPSCAN_RETAILER_SEARCH_URLS".to_string(),
                reason: format!("entry \"{entry}\": {reason}"),
            };
            let (name, template) = entry
                .split_once('=')
                .ok_or_else(|| invalid("expected name=url"))?;
            let name = name.trim();
            let template = template.trim();
            if name.is_empty() {
                return Err(invalid("retailer name is empty"));
            }
            if !template.contains("{query}") {
                return Err(invalid("url template has no {query} placeholder"));
            }
            Ok(RetailerSearchUrl {
                name: name.to_string(),
                url_template: template.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
