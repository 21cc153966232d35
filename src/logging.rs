//! Logging setup.
//!
//! The TUI owns the terminal, so it logs to a file under the log directory
//! (`$DATA_DIR/mentions/logs` unless configured). CLI mode logs to stderr.
//! `RUST_LOG` takes precedence over the configured level.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogSettings;
use crate::error::Result;

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "mentions.log";

/// Where the TUI writes its log.
pub fn log_directory(settings: &LogSettings) -> PathBuf {
    settings.directory.clone().unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mentions")
            .join("logs")
    })
}

/// Normalise a level name, falling back to `info`.
pub fn parse_level(value: &str) -> &'static str {
    match value.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        "off" | "none" | "disabled" => "off",
        _ => "info",
    }
}

fn filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mentions={}", parse_level(&settings.level))))
}

/// Log to a file for the interactive UI.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_file(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    if !settings.enabled {
        return Ok(None);
    }
    let dir = log_directory(settings);
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter(settings))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok();

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(Some(guard))
}

/// Log to stderr for CLI mode.
pub fn init_stderr(settings: &LogSettings) {
    if !settings.enabled {
        return;
    }
    tracing_subscriber::registry()
        .with(filter(settings))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}
