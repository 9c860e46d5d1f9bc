use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medibook::api::ApiServer;
use medibook::config::Config;
use medibook::store::DataStore;

#[derive(Parser)]
#[command(
    name = "medibook",
    version,
    about = "Medical appointment booking API with atomic slot reservation",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Bind address (overrides MEDIBOOK_BIND_ADDRESS)
        #[arg(short, long)]
        bind: Option<String>,

        /// JSON file of doctors to seed the store with
        #[arg(long)]
        seed: Option<String>,
    },

    /// Validate configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!("medibook booking service starting");

    match cli.command {
        Commands::Serve { bind, seed } => {
            tracing::info!(bind = ?bind, seed = ?seed, "Starting serve command");
            serve(bind, seed).await?;
        }

        Commands::CheckConfig => {
            let config = Config::from_env()?;
            config.validate()?;
            println!("Configuration OK: binds {}", config.server.bind_address);
        }
    }

    Ok(())
}

async fn serve(bind: Option<String>, seed: Option<String>) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(addr) = bind {
        config.server.bind_address = addr.parse()?;
    }

    if let Err(e) = medibook::metrics::init_metrics() {
        tracing::warn!("Metrics registration failed, continuing without: {}", e);
    }

    let store = DataStore::new();
    if let Some(path) = seed {
        let json = std::fs::read_to_string(&path)?;
        let count = store.seed_doctors(&json).await?;
        tracing::info!(count = %count, path = %path, "Seeded doctors");
    }

    let server = ApiServer::new(config, store)?;
    server
        .start_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::error!("Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("medibook=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("medibook=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
