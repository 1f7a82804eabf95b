//! Multi-tier source resolution with synthetic fill.
//!
//! Tiers are tried in registration order until the quota is met. Any tier
//! failure is logged and skipped. Whatever deficit remains afterwards is
//! filled by the [`SyntheticGenerator`], so a resolution always reaches its
//! target unless the hard cap forbids it.

use std::collections::HashSet;

use dropscan_core::{identity_key, Query, RawListing};
use dropscan_scraper::{AdapterFailure, Tier};
use futures::future::join_all;

use crate::quota::QuotaTracker;
use crate::synthetic::SyntheticGenerator;

/// What one tier contributed to a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    /// The tier answered. `returned` is what it sent, `accepted` what was kept
    /// after validation, deduplication, and the quota.
    Delivered { returned: usize, accepted: usize },
    Failed(AdapterFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub tier: String,
    pub query: String,
    pub outcome: TierOutcome,
}

/// Result of resolving one query or one category.
///
/// `listings` holds every real listing first, in tier order, followed by the
/// synthetic fill.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub listings: Vec<RawListing>,
    pub real_count: usize,
    pub synthetic_count: usize,
    pub tier_reports: Vec<TierReport>,
}

pub struct CascadeResolver {
    tiers: Vec<Tier>,
    generator: SyntheticGenerator,
    concurrent: bool,
}

/// Mutable state shared by every query of one resolution.
struct Accumulator {
    quota: QuotaTracker,
    seen: HashSet<String>,
    real: Vec<RawListing>,
    reports: Vec<TierReport>,
}

impl Accumulator {
    fn new(target: usize, hard_cap: usize) -> Self {
        Self {
            quota: QuotaTracker::new(target, hard_cap),
            seen: HashSet::new(),
            real: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Keeps listings in source order until the quota is met.
    fn absorb(&mut self, tier: &str, query: &str, listings: Vec<RawListing>) {
        let returned = listings.len();
        let mut accepted = 0;
        for listing in listings {
            if self.quota.is_satisfied() {
                break;
            }
            if !listing.is_acceptable() {
                continue;
            }
            if !self.seen.insert(identity_key(&listing.name)) {
                continue;
            }
            if self.quota.accept(1) == 0 {
                break;
            }
            accepted += 1;
            self.real.push(listing.with_tier(tier));
        }
        tracing::debug!(tier, query, returned, accepted, "tier delivered");
        self.reports.push(TierReport {
            tier: tier.to_owned(),
            query: query.to_owned(),
            outcome: TierOutcome::Delivered { returned, accepted },
        });
    }

    fn fail(&mut self, tier: &str, query: &str, category: &str, failure: AdapterFailure) {
        tracing::warn!(tier, query, category, error = %failure, "tier failed");
        self.reports.push(TierReport {
            tier: tier.to_owned(),
            query: query.to_owned(),
            outcome: TierOutcome::Failed(failure),
        });
    }
}

impl CascadeResolver {
    #[must_use]
    pub fn new(tiers: Vec<Tier>, generator: SyntheticGenerator) -> Self {
        Self {
            tiers,
            generator,
            concurrent: false,
        }
    }

    /// Runs every tier of a query at once. Results are still merged in tier
    /// order, so output does not depend on completion order.
    #[must_use]
    pub fn with_concurrent_tiers(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    #[must_use]
    pub fn generator(&self) -> &SyntheticGenerator {
        &self.generator
    }

    /// Tier names in priority order. Every category uses the same list.
    #[must_use]
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name.as_str()).collect()
    }

    /// Resolves a single query against its own quota.
    pub async fn resolve(&self, query: &Query) -> Resolution {
        self.resolve_category(
            &query.category,
            std::slice::from_ref(&query.text),
            query.target_count,
            query.hard_cap,
        )
        .await
    }

    /// Resolves several queries for one category against a shared quota,
    /// then fills the remaining deficit once.
    pub async fn resolve_category(
        &self,
        category: &str,
        queries: &[String],
        target: usize,
        hard_cap: usize,
    ) -> Resolution {
        let mut acc = Accumulator::new(target, hard_cap);

        for text in queries {
            if acc.quota.is_satisfied() {
                break;
            }
            if self.concurrent {
                self.run_concurrent(category, text, &mut acc).await;
            } else {
                self.run_sequential(category, text, &mut acc).await;
            }
        }

        let real_count = acc.real.len();
        let fill = acc.quota.accept(acc.quota.deficit());
        let synthetic = self.generator.generate(category, 0, fill);
        let synthetic_count = synthetic.len();

        if synthetic_count > 0 {
            tracing::info!(
                category,
                real_count,
                synthetic_count,
                "filled deficit with synthetic listings"
            );
        }

        let mut listings = acc.real;
        listings.extend(synthetic);

        Resolution {
            listings,
            real_count,
            synthetic_count,
            tier_reports: acc.reports,
        }
    }

    async fn run_sequential(&self, category: &str, text: &str, acc: &mut Accumulator) {
        for tier in &self.tiers {
            if acc.quota.is_satisfied() {
                break;
            }
            let limit = acc.quota.deficit();
            match call_tier(tier, text, category, limit).await {
                Ok(listings) => acc.absorb(&tier.name, text, listings),
                Err(failure) => acc.fail(&tier.name, text, category, failure),
            }
        }
    }

    async fn run_concurrent(&self, category: &str, text: &str, acc: &mut Accumulator) {
        let tiers = &self.tiers;
        let limit = acc.quota.deficit();
        let results =
            join_all(tiers.iter().map(|tier| call_tier(tier, text, category, limit))).await;

        for (tier, result) in tiers.iter().zip(results) {
            match result {
                Ok(listings) => acc.absorb(&tier.name, text, listings),
                Err(failure) => acc.fail(&tier.name, text, category, failure),
            }
        }
    }
}

/// One bounded adapter call. Listings past `limit` are dropped.
async fn call_tier(
    tier: &Tier,
    text: &str,
    category: &str,
    limit: usize,
) -> Result<Vec<RawListing>, AdapterFailure> {
    match tokio::time::timeout(tier.timeout, tier.adapter.search(text, category, limit)).await {
        Ok(Ok(mut listings)) => {
            listings.truncate(limit);
            Ok(listings)
        }
        Ok(Err(failure)) => Err(failure),
        Err(_) => Err(AdapterFailure::Timeout(tier.timeout)),
    }
}

#[cfg(test)]
#[path = "cascade_test.rs"]
mod tests;
