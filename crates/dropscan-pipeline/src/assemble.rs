//! Builds a ready-to-run [`ScanScheduler`] from [`AppConfig`].

use std::sync::Arc;
use std::time::Duration;

use dropscan_core::{AppConfig, Category, SnapshotStore};
use dropscan_scraper::{build_tiers, build_trends_feed, ScraperError};

use crate::cascade::CascadeResolver;
use crate::sweep::{ScanScheduler, SweepConfig};
use crate::synthetic::SyntheticGenerator;

impl SweepConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, categories: Vec<Category>) -> Self {
        Self {
            categories,
            target: config.scan_target,
            hard_cap: config.scan_hard_cap,
            chunk_size: config.scan_chunk_size,
            pacing: Duration::from_millis(config.scan_category_delay_ms),
        }
    }
}

/// Source tiers from config plus a generator over `categories`.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if an HTTP client cannot be built.
pub fn build_resolver(
    config: &AppConfig,
    categories: &[Category],
) -> Result<CascadeResolver, ScraperError> {
    let tiers = build_tiers(config)?;
    Ok(CascadeResolver::new(tiers, SyntheticGenerator::new(categories))
        .with_concurrent_tiers(config.scan_concurrent_tiers))
}

/// # Errors
///
/// Returns [`ScraperError::Http`] if an HTTP client cannot be built.
pub fn build_scan_scheduler(
    config: &AppConfig,
    categories: Vec<Category>,
    store: Arc<dyn SnapshotStore>,
) -> Result<ScanScheduler, ScraperError> {
    let resolver = build_resolver(config, &categories)?;
    let trends = build_trends_feed(config)?;
    Ok(ScanScheduler::new(
        Arc::new(resolver),
        store,
        Arc::new(trends),
        SweepConfig::from_app_config(config, categories),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dropscan_core::{build_app_config, default_categories};

    use super::*;
    use crate::test_support::RecordingStore;

    fn app_config(vars: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        build_app_config(|key| map.get(key).cloned().ok_or(std::env::VarError::NotPresent))
            .expect("config")
    }

    #[test]
    fn sweep_config_follows_app_config() {
        let config = app_config(&[
            ("DATABASE_URL", "postgres://example"),
            ("DROPSCAN_SCAN_TARGET", "12"),
            ("DROPSCAN_SCAN_HARD_CAP", "20"),
            ("DROPSCAN_SCAN_CHUNK_SIZE", "5"),
            ("DROPSCAN_SCAN_CATEGORY_DELAY_MS", "250"),
        ]);
        let sweep = SweepConfig::from_app_config(&config, default_categories());
        assert_eq!((sweep.target, sweep.hard_cap, sweep.chunk_size), (12, 20, 5));
        assert_eq!(sweep.pacing, Duration::from_millis(250));
        assert_eq!(sweep.categories.len(), 8);
    }

    #[test]
    fn resolver_registers_configured_tiers_in_order() {
        let config = app_config(&[
            ("DATABASE_URL", "postgres://example"),
            (
                "DROPSCAN_RETAILER_SEARCH_URLS",
                "bigbox=https://bigbox.example/search?q={query}",
            ),
            ("DROPSCAN_SHOPIFY_STORES", "https://lamps.example"),
        ]);
        let resolver = build_resolver(&config, &default_categories()).expect("resolver");
        assert_eq!(
            resolver.tier_names(),
            vec!["bigbox", "shopify:lamps.example"]
        );
    }

    #[test]
    fn scheduler_preview_needs_no_network() {
        let config = app_config(&[("DATABASE_URL", "postgres://example")]);
        let scheduler = build_scan_scheduler(
            &config,
            default_categories(),
            Arc::new(RecordingStore::default()),
        )
        .expect("scheduler");
        let preview = scheduler.preview(6);
        assert_eq!(preview.len(), 6);
        assert!(preview.iter().all(|p| p.listing.category == "electronics"));
    }
}
