//! Category sweep: query building, resolution, enrichment, chunked
//! persistence, and pacing.

use std::sync::Arc;
use std::time::Duration;

use dropscan_core::{Category, EnrichedProduct, SnapshotStore, MAX_SEARCH_TERMS};
use dropscan_scraper::TrendingSource;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cascade::CascadeResolver;
use crate::enrich::EnrichmentEngine;

/// Trending keywords requested per sweep. Each category borrows at most one.
const TRENDING_KEYWORDS: usize = 8;

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub categories: Vec<Category>,
    /// Listings wanted per category.
    pub target: usize,
    pub hard_cap: usize,
    /// Products per `insert_batch` call. Zero is treated as one.
    pub chunk_size: usize,
    /// Sleep between categories.
    pub pacing: Duration,
}

/// Outcome for one category of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: String,
    pub queries: Vec<String>,
    pub real: usize,
    pub synthetic: usize,
    pub persisted: usize,
    pub failed_chunks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scan_id: Uuid,
    pub categories: Vec<CategoryReport>,
    pub cancelled: bool,
}

impl SweepReport {
    #[must_use]
    pub fn total_persisted(&self) -> usize {
        self.categories.iter().map(|c| c.persisted).sum()
    }

    #[must_use]
    pub fn total_resolved(&self) -> usize {
        self.categories.iter().map(|c| c.real + c.synthetic).sum()
    }

    #[must_use]
    pub fn failed_chunks(&self) -> usize {
        self.categories.iter().map(|c| c.failed_chunks).sum()
    }
}

/// Drives one sweep over the configured categories.
///
/// Categories run one after another. A category that yields nothing, or a
/// chunk the store rejects, is logged and the sweep moves on.
pub struct ScanScheduler {
    resolver: Arc<CascadeResolver>,
    enricher: EnrichmentEngine,
    store: Arc<dyn SnapshotStore>,
    trends: Arc<dyn TrendingSource>,
    config: SweepConfig,
}

impl ScanScheduler {
    #[must_use]
    pub fn new(
        resolver: Arc<CascadeResolver>,
        store: Arc<dyn SnapshotStore>,
        trends: Arc<dyn TrendingSource>,
        config: SweepConfig,
    ) -> Self {
        Self {
            resolver,
            enricher: EnrichmentEngine::new(),
            store,
            trends,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    #[must_use]
    pub fn resolver(&self) -> &CascadeResolver {
        &self.resolver
    }

    /// Runs a full sweep, stopping between categories once `cancel` fires.
    pub async fn run(&self, scan_id: Uuid, cancel: &CancellationToken) -> SweepReport {
        let trending = self.trends.trending_keywords(TRENDING_KEYWORDS).await;
        tracing::info!(
            %scan_id,
            categories = self.config.categories.len(),
            trending = trending.len(),
            "sweep started"
        );

        let mut report = SweepReport {
            scan_id,
            ..SweepReport::default()
        };

        for (index, category) in self.config.categories.iter().enumerate() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if index > 0 && !self.pace(cancel).await {
                report.cancelled = true;
                break;
            }

            let trend = (!trending.is_empty()).then(|| trending[index % trending.len()].as_str());
            let queries = build_queries(category, trend);
            let category_report = self.sweep_category(scan_id, category, queries).await;
            report.categories.push(category_report);
        }

        tracing::info!(
            %scan_id,
            resolved = report.total_resolved(),
            persisted = report.total_persisted(),
            failed_chunks = report.failed_chunks(),
            cancelled = report.cancelled,
            "sweep finished"
        );
        report
    }

    /// Resolves and enriches one category without persisting anything.
    pub async fn resolve_category(
        &self,
        category: &Category,
        trend: Option<&str>,
    ) -> Vec<EnrichedProduct> {
        let queries = build_queries(category, trend);
        let resolution = self
            .resolver
            .resolve_category(&category.slug, &queries, self.config.target, self.config.hard_cap)
            .await;
        resolution
            .listings
            .iter()
            .map(|l| self.enricher.enrich(l))
            .collect()
    }

    /// Up to `n` enriched synthetic products for the first category.
    ///
    /// Touches no network and no store, so callers can return it immediately.
    #[must_use]
    pub fn preview(&self, n: usize) -> Vec<EnrichedProduct> {
        let Some(category) = self.config.categories.first() else {
            return Vec::new();
        };
        self.resolver
            .generator()
            .generate(&category.slug, 0, n)
            .iter()
            .map(|l| self.enricher.enrich(l))
            .collect()
    }

    async fn sweep_category(
        &self,
        scan_id: Uuid,
        category: &Category,
        queries: Vec<String>,
    ) -> CategoryReport {
        let slug = category.slug.as_str();
        let resolution = self
            .resolver
            .resolve_category(slug, &queries, self.config.target, self.config.hard_cap)
            .await;

        let mut report = CategoryReport {
            category: slug.to_owned(),
            queries,
            real: resolution.real_count,
            synthetic: resolution.synthetic_count,
            ..CategoryReport::default()
        };

        if resolution.listings.is_empty() {
            tracing::warn!(category = slug, "category produced no listings");
            return report;
        }

        let products: Vec<EnrichedProduct> = resolution
            .listings
            .iter()
            .map(|l| self.enricher.enrich(l))
            .collect();

        for (chunk_index, chunk) in products.chunks(self.config.chunk_size.max(1)).enumerate() {
            match self.store.insert_batch(scan_id, chunk).await {
                Ok(accepted) => report.persisted += accepted,
                Err(e) => {
                    report.failed_chunks += 1;
                    tracing::error!(
                        category = slug,
                        chunk = chunk_index,
                        size = chunk.len(),
                        error = %e,
                        "snapshot chunk not persisted"
                    );
                }
            }
        }

        tracing::info!(
            category = slug,
            real = report.real,
            synthetic = report.synthetic,
            persisted = report.persisted,
            "category swept"
        );
        report
    }

    /// Sleeps for the pacing interval. Returns `false` if cancelled meanwhile.
    async fn pace(&self, cancel: &CancellationToken) -> bool {
        if self.config.pacing.is_zero() {
            return true;
        }
        tokio::select! {
            () = cancel.cancelled() => false,
            () = tokio::time::sleep(self.config.pacing) => true,
        }
    }
}

/// Two to three queries for one category: up to two search templates, a
/// template derived from the category name when only one is configured,
/// and the trending keyword when it adds something new.
#[must_use]
pub fn build_queries(category: &Category, trend: Option<&str>) -> Vec<String> {
    fn push_unique(queries: &mut Vec<String>, candidate: &str) {
        let candidate = candidate.trim();
        if !candidate.is_empty() && !queries.iter().any(|q| q.eq_ignore_ascii_case(candidate)) {
            queries.push(candidate.to_owned());
        }
    }

    let mut queries = Vec::with_capacity(MAX_SEARCH_TERMS + 1);
    for term in &category.search_terms {
        if queries.len() == MAX_SEARCH_TERMS {
            break;
        }
        push_unique(&mut queries, term);
    }

    let name = category.name.trim().to_lowercase();
    for derived in [format!("best selling {name}"), format!("trending {name}")] {
        if queries.len() >= MAX_SEARCH_TERMS {
            break;
        }
        push_unique(&mut queries, &derived);
    }

    if let Some(keyword) = trend {
        push_unique(&mut queries, keyword);
    }
    queries
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod tests;
