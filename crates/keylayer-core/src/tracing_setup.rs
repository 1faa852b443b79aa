use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::KeylayerConfig;

const LOG_FILE_ENV: &str = "KEYLAYER_LOG_FILE";

/// Install the global subscriber.
///
/// Logs go to a file only: `KEYLAYER_LOG_FILE` wins over the configured
/// `logFile`, and with neither set logging stays off.
pub fn init_tracing(config: &KeylayerConfig) -> Result<()> {
    let Some(log_path) = log_file_path(config) else {
        return Ok(());
    };
    let level = parse_level(&config.log_level)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(path = %log_path.display(), "file logging enabled");
    Ok(())
}

fn log_file_path(config: &KeylayerConfig) -> Option<PathBuf> {
    std::env::var_os(LOG_FILE_ENV)
        .map(PathBuf::from)
        .or_else(|| config.log_file.clone())
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    level
        .parse::<LevelFilter>()
        .with_context(|| format!("Invalid log level: {level}"))
}
