//! Product discovery pipeline.
//!
//! [`ScanScheduler`] sweeps categories through the [`CascadeResolver`], which
//! tries each source tier until the [`QuotaTracker`] is satisfied and fills
//! any deficit from the [`SyntheticGenerator`]. Every resolved listing is
//! enriched by the [`EnrichmentEngine`] before it reaches the snapshot store.

pub mod assemble;
pub mod cascade;
pub mod enrich;
pub mod quota;
pub mod seed;
pub mod sweep;
pub mod synthetic;

#[cfg(test)]
mod test_support;

pub use assemble::{build_resolver, build_scan_scheduler};
pub use cascade::{CascadeResolver, Resolution, TierOutcome, TierReport};
pub use enrich::{demand_signal, EnrichmentEngine, COMPETITOR_PRICE_RATIOS};
pub use quota::QuotaTracker;
pub use seed::{content_seed, seeded_rng};
pub use sweep::{build_queries, CategoryReport, ScanScheduler, SweepConfig, SweepReport};
pub use synthetic::SyntheticGenerator;
