//! Wordboard Server
//!
//! Run with: cargo run --bin wordboard -- --config config.toml
//!
//! # Configuration
//!
//! Settings come from the config file (or the default locations) with
//! `WORDBOARD_*` environment overrides; see `wordboard-cli config` for a
//! template. Backend credentials are required: the server refuses to start
//! if any is missing or malformed.
//!
//! - `RUST_LOG`: Log filter (overrides `[logging] level`)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wordboard::api::{serve, AppState};
use wordboard::backend::{initialize_client, BackendError};
use wordboard::config::{Config, LoggingConfig};
use wordboard::words::seed_from_file;

#[derive(Parser)]
#[command(name = "wordboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live top-words dashboard server")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file of word documents to load at startup
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {:?}", path))?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting Wordboard v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        anyhow::bail!(
            "{}\nThe dashboard needs a non-blank order_by and a limit of at least 1 \
             (check the config file and WORDBOARD_DASHBOARD_LIMIT)",
            e
        );
    }

    let client = match initialize_client(&config.backend) {
        Ok(client) => client,
        Err(e @ BackendError::Configuration { .. }) => {
            tracing::error!(error = %e, "Invalid backend configuration");
            anyhow::bail!(
                "{}\nSet the [backend] section of the config file or the WORDBOARD_* variables \
                 (run `wordboard-cli config` for a template)",
                e
            );
        }
        Err(e) => return Err(e).context("connecting to backend"),
    };

    let seed = args
        .seed
        .or_else(|| config.store.seed_file.as_ref().map(PathBuf::from));
    if let Some(path) = seed {
        seed_from_file(&client.words(), &path)
            .with_context(|| format!("seeding from {:?}", path))?;
    }

    tracing::info!(
        limit = config.dashboard.limit,
        order_by = %config.dashboard.order_by,
        "Dashboard query configured"
    );

    let state = AppState::new(client.clone(), config.dashboard.clone(), config.api.clone());
    let result = serve(state, &config.api).await;

    // Close live queries so any remaining views observe the shutdown
    client.terminate();
    tracing::info!("Wordboard stopped");

    result.context("running API server")
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("wordboard={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
