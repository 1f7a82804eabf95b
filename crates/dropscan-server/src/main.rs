mod api;
mod middleware;
mod scheduler;
mod sweeps;

use std::sync::Arc;

use dropscan_analysis::AnalysisOrchestrator;
use dropscan_db::PgSnapshotStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState, ProviderStatus},
    middleware::{ApiKeys, RequestBudget},
    sweeps::SweepWorker,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = dropscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    let keys = ApiKeys::from_config(&config)?;

    let pool = dropscan_db::connect_pool_from_config(&config).await?;
    let applied = dropscan_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let abandoned = dropscan_db::fail_abandoned_scan_runs(&pool).await?;
    if abandoned > 0 {
        tracing::warn!(abandoned, "marked scan runs left over from a previous process as failed");
    }

    let categories = dropscan_core::configured_categories(config.categories_path.as_deref())?;
    let store = Arc::new(PgSnapshotStore::new(pool.clone()));
    let scan_scheduler = dropscan_pipeline::build_scan_scheduler(&config, categories, store)?;
    let worker = Arc::new(SweepWorker::new(Arc::new(scan_scheduler), pool.clone()));
    let analyzer = Arc::new(AnalysisOrchestrator::from_config(&config)?);

    let mut jobs = scheduler::build_scheduler(pool.clone(), Arc::clone(&worker), &config).await?;

    let state = AppState {
        pool,
        worker: Arc::clone(&worker),
        analyzer,
        providers: Arc::new(ProviderStatus::from_config(&config)),
    };
    let app = build_app(state, keys, RequestBudget::from_config(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "dropscan server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = jobs.shutdown().await {
        tracing::warn!(error = %e, "job scheduler did not shut down cleanly");
    }
    worker.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
