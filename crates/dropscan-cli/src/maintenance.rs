/// Delete snapshots captured more than `days` days ago.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub(crate) async fn run_cleanup(pool: &sqlx::PgPool, days: u32) -> anyhow::Result<u64> {
    let deleted = dropscan_db::delete_snapshots_older_than(pool, days).await?;
    tracing::info!(deleted, days, "retention cleanup finished");
    println!("deleted {deleted} snapshots older than {days} days");
    Ok(deleted)
}

/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = dropscan_db::list_scan_runs(pool, limit.clamp(1, 200)).await?;
    if runs.is_empty() {
        println!("no scan runs recorded");
        return Ok(());
    }

    for run in &runs {
        println!(
            "{}\t{}\t{:<9}\t{:>4}\t{}{}",
            run.public_id,
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.status,
            run.records_processed,
            run.trigger_source,
            run.error_message
                .as_deref()
                .map(|e| format!("\t{e}"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../../migrations")]
    async fn cleanup_on_empty_table_deletes_nothing(pool: sqlx::PgPool) {
        let deleted = run_cleanup(&pool, 7).await.expect("cleanup");
        assert_eq!(deleted, 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_runs_handles_empty_and_populated_tables(pool: sqlx::PgPool) {
        run_list_runs(&pool, 20).await.expect("empty listing");

        let run = dropscan_db::create_scan_run(&pool, dropscan_core::ScanTrigger::Cli)
            .await
            .expect("create run");
        dropscan_db::start_scan_run(&pool, run.id)
            .await
            .expect("start run");
        dropscan_db::fail_scan_run(&pool, run.id, "source offline")
            .await
            .expect("fail run");

        run_list_runs(&pool, 0).await.expect("populated listing");
    }
}
