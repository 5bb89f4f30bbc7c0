//! `thermal` command-line tool.
//!
//! Enhances thermal captures, renders them with the thermal palette and
//! converts pixel intensities to temperatures.

mod cli;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    config::load_dotenv();
    let config = AppConfig::load();
    tracing::debug!(?config, "Configuration loaded");

    cli.command.run(&config)
}
