//! Logging setup for applications embedding the selector.
//!
//! Provides structured logging with console and file output:
//! - Writes to `logs/cloudbuster.log` by default (cleared on start)
//! - Also prints to stderr, keeping stdout free for JSON output
//! - Configurable via RUST_LOG environment variable

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Default directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "cloudbuster.log";

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
    log_path: PathBuf,
}

impl LoggingGuard {
    /// Path of the active log file.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Create the log directory and truncate the log file.
///
/// Returns the full path of the log file.
pub fn prepare_log_file(log_dir: &Path, log_file: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}

/// Initialize the global subscriber.
///
/// Sets up dual output to the log file and stderr, filtered by `RUST_LOG`
/// (defaults to `info`).
///
/// # Errors
///
/// Returns an error if the log file cannot be prepared or a global
/// subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) -> io::Result<LoggingGuard> {
    let log_path = prepare_log_file(&settings.directory, &settings.file)?;

    let file_appender = tracing_appender::rolling::never(&settings.directory, &settings.file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_path,
    })
}
