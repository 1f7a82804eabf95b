mod inspect;
mod maintenance;
mod scan;

use clap::{Parser, Subcommand};
use dropscan_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dropscan-cli")]
#[command(about = "Dropscan product discovery command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run a product sweep across configured categories
    Scan {
        /// Only sweep the category with this slug
        #[arg(long)]
        category: Option<String>,
        /// Resolve and enrich, print the results, persist nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Ask the AI providers whether a product is worth selling
    Analyze {
        name: String,
        #[arg(long)]
        price: Option<String>,
        #[arg(long, default_value = "US")]
        region: String,
    },
    /// Print the enrichment signals computed for a product name
    Enrich {
        name: String,
        #[arg(long, default_value_t = 24.99)]
        price: f64,
    },
    /// List recent scan runs
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Delete snapshots older than the retention window
    Cleanup {
        /// Overrides DROPSCAN_RETENTION_DAYS
        #[arg(long)]
        days: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("dropscan-cli: no command given, see --help");
        return Ok(());
    };

    let config = load_config(needs_database(&command))?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Db { command } => {
            let pool = dropscan_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => {
                    dropscan_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = dropscan_db::run_migrations(&pool).await?;
                    println!("applied {applied} migrations");
                }
                DbCommands::Cleanup { days } => {
                    maintenance::run_cleanup(&pool, days.unwrap_or(config.retention_days)).await?;
                }
            }
        }
        Commands::Scan {
            category,
            dry_run: true,
        } => scan::run_scan_dry_run(&config, category.as_deref()).await?,
        Commands::Scan {
            category,
            dry_run: false,
        } => {
            let pool = dropscan_db::connect_pool_from_config(&config).await?;
            let cancel = tokio_util::sync::CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received; stopping after the current category");
                    on_ctrl_c.cancel();
                }
            });
            scan::run_scan(&pool, &config, category.as_deref(), &cancel).await?;
        }
        Commands::Analyze {
            name,
            price,
            region,
        } => inspect::run_analyze(&config, &name, price.as_deref(), &region).await?,
        Commands::Enrich { name, price } => inspect::run_enrich(&name, price)?,
        Commands::Runs { limit } => {
            let pool = dropscan_db::connect_pool_from_config(&config).await?;
            maintenance::run_list_runs(&pool, limit).await?;
        }
    }

    Ok(())
}

fn needs_database(command: &Commands) -> bool {
    match command {
        Commands::Db { .. } | Commands::Runs { .. } => true,
        Commands::Scan { dry_run, .. } => !dry_run,
        Commands::Analyze { .. } | Commands::Enrich { .. } => false,
    }
}

/// Commands that never open a pool run without `DATABASE_URL`.
fn load_config(needs_database: bool) -> anyhow::Result<AppConfig> {
    if needs_database {
        return Ok(dropscan_core::load_app_config_from_env()?);
    }
    Ok(dropscan_core::build_app_config(|key| {
        match std::env::var(key) {
            Err(_) if key == "DATABASE_URL" => Ok(String::new()),
            other => other,
        }
    })?)
}
