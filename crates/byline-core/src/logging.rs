//! Log file setup.
//!
//! Logs go to a daily-rolling file under `${BYLINE_HOME}/logs`; the log
//! level is controlled by the `BYLINE_LOG` env var (EnvFilter syntax,
//! defaults to `info`).

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

/// Initializes the global tracing subscriber with a file writer.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so
/// the caller should hold it for the life of the process.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, "byline.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("BYLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("Failed to install tracing subscriber: {err}"))?;

    Ok(guard)
}
