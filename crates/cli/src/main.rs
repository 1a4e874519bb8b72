mod commands;

use anyhow::Result;
use clap::Parser;
use std::fs::{self, OpenOptions};

use tracing_subscriber::{prelude::*, EnvFilter};
use trainroute_core::{
    config::{self, AppConfig},
    Registry,
};

use commands::Cli;

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");

    let mut registry = Registry::load(config.storage_paths())?;
    commands::run(cli.command.unwrap_or_default(), &mut registry)
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("trainroute.log");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
