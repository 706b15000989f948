//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: console output plus a session log file
//! written through a non-blocking appender.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::LoggingConfig;

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

/// The returned guard must stay alive for the file log to be flushed.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
    let dir = Path::new(&config.dir);
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }

    // Clear previous session log
    let log_path = dir.join(&config.file);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(dir, &config.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER)))
        .context("Invalid log filter")?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
