//! Sweep command handlers.
//!
//! A real scan is recorded in `scan_runs` like any other trigger. A dry run
//! builds only the resolver, so it needs neither a pool nor a store.

use std::sync::Arc;

use dropscan_core::{AppConfig, Category, ScanTrigger};
use dropscan_db::SweepTally;
use dropscan_pipeline::{build_queries, EnrichmentEngine, SweepReport};
use tokio_util::sync::CancellationToken;

/// Narrow the configured categories to `filter` when one is given.
///
/// # Errors
///
/// Returns an error when `filter` names no configured category.
pub(crate) fn select_categories(
    all: Vec<Category>,
    filter: Option<&str>,
) -> anyhow::Result<Vec<Category>> {
    let Some(slug) = filter else {
        return Ok(all);
    };
    let known: Vec<String> = all.iter().map(|c| c.slug.clone()).collect();
    let selected: Vec<Category> = all.into_iter().filter(|c| c.slug == slug).collect();
    if selected.is_empty() {
        anyhow::bail!(
            "category '{slug}' not found; configured: [{}]",
            known.join(", ")
        );
    }
    Ok(selected)
}

/// Resolve and enrich each category, print one line per product, and stop.
///
/// # Errors
///
/// Returns an error if the category file cannot be read, the filter is
/// unknown, or an HTTP client cannot be built.
pub(crate) async fn run_scan_dry_run(
    config: &AppConfig,
    category_filter: Option<&str>,
) -> anyhow::Result<()> {
    let categories = select_categories(
        dropscan_core::configured_categories(config.categories_path.as_deref())?,
        category_filter,
    )?;
    let resolver = dropscan_pipeline::build_resolver(config, &categories)?;
    let enricher = EnrichmentEngine::new();

    for category in &categories {
        let queries = build_queries(category, None);
        let resolution = resolver
            .resolve_category(
                &category.slug,
                &queries,
                config.scan_target,
                config.scan_hard_cap,
            )
            .await;

        for listing in &resolution.listings {
            let product = enricher.enrich(listing);
            println!(
                "{}\t{}\t{:.2}\t{}\t{}",
                category.slug,
                product.listing.tier,
                product.listing.price,
                product.signals.demand_signal.as_str(),
                product.listing.name
            );
        }
        println!(
            "dry-run: {} would persist {} products ({} real, {} synthetic)",
            category.slug,
            resolution.listings.len(),
            resolution.real_count,
            resolution.synthetic_count
        );
    }

    Ok(())
}

/// Run a full sweep in the foreground, recorded as a `cli` scan run.
///
/// # Errors
///
/// Returns an error if the categories cannot be loaded, the scheduler cannot
/// be built, or the scan run cannot be written. Per-chunk persistence
/// failures are reflected in the report, not propagated.
pub(crate) async fn run_scan(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    category_filter: Option<&str>,
    cancel: &CancellationToken,
) -> anyhow::Result<SweepReport> {
    let categories = select_categories(
        dropscan_core::configured_categories(config.categories_path.as_deref())?,
        category_filter,
    )?;
    let store = Arc::new(dropscan_db::PgSnapshotStore::new(pool.clone()));
    let scheduler = dropscan_pipeline::build_scan_scheduler(config, categories, store)?;

    let run = dropscan_db::create_scan_run(pool, ScanTrigger::Cli).await?;
    dropscan_db::start_scan_run(pool, run.id).await?;

    let report = scheduler.run(run.public_id, cancel).await;
    record_outcome(pool, run.id, &report).await?;

    for category in &report.categories {
        println!(
            "{}\treal={}\tsynthetic={}\tpersisted={}\tfailed_chunks={}",
            category.category,
            category.real,
            category.synthetic,
            category.persisted,
            category.failed_chunks
        );
    }
    println!(
        "scan {} {}: persisted {} of {} products across {} categories",
        report.scan_id,
        if report.cancelled { "cancelled" } else { "finished" },
        report.total_persisted(),
        report.total_resolved(),
        report.categories.len()
    );

    Ok(report)
}

async fn record_outcome(
    pool: &sqlx::PgPool,
    run_id: i64,
    report: &SweepReport,
) -> anyhow::Result<()> {
    let tally = SweepTally {
        persisted: report.total_persisted(),
        resolved: report.total_resolved(),
        failed_chunks: report.failed_chunks(),
        cancelled: report.cancelled,
    };
    let closure = dropscan_db::close_scan_run(pool, run_id, tally).await?;
    tracing::debug!(?closure, scan_id = %report.scan_id, "scan run closed");
    Ok(())
}

#[cfg(test)]
#[path = "scan_test.rs"]
mod tests;
