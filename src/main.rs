//! lake-levels CLI
//!
//! Fetch Madison lake levels from USGS and keep them in a local SQLite file.

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use lake_levels::config::AppConfig;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `fetch --format json` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lake_levels=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!("Configuration loaded: {:?}", config);

    match cli.command {
        Commands::Fetch { start, end, format } => cli::run_fetch(&config, start, end, format),
        Commands::Update { start, end, db } => cli::run_update(&config, start, end, db),
        Commands::Show { db, format } => cli::run_show(&config, db, format),
    }
}
