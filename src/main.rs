//! WheelTracker CLI - Main Entry Point
//!
//! Command-line companion for the WheelTracker web platform.

use clap::Parser;
use tracing::info;

use wheeltracker_client::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();
    let config = commands::resolve_config(&cli);

    logging::init(&config.storage_dir);
    info!("WheelTracker CLI starting...");

    commands::run(cli, config).await
}
