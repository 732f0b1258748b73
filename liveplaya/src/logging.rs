//! Logging setup.
//!
//! Logs go to a file rather than the terminal, which belongs to the
//! front end. `RUST_LOG` overrides the configured level, e.g.
//! `RUST_LOG=liveplaya=debug` to trace fetch cycles.

use std::io;
use std::path::Path;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "liveplaya.log";

/// Errors that can occur while installing the logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory: {0}")]
    Io(#[from] io::Error),

    /// A global subscriber is already installed.
    #[error("Failed to install logger: {0}")]
    Init(String),
}

/// Keeps the background log writer alive; drop it last to flush.
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Build the level filter: `RUST_LOG` if set, otherwise `level` for our
/// crates and `warn` for dependencies.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,liveplaya={level},liveplaya_cli={level}",
            level = level
        ))
    })
}

/// Install the global tracing subscriber writing to `directory/file_name`.
pub fn init_logging(
    directory: &Path,
    file_name: &str,
    level: &str,
) -> Result<LoggingGuard, LoggingError> {
    std::fs::create_dir_all(directory)?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    // Local offset can be indeterminate in multi-threaded processes
    let timer = OffsetTime::local_rfc_3339()
        .unwrap_or_else(|_| OffsetTime::new(UtcOffset::UTC, Rfc3339));

    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(timer)
                .with_target(true),
        )
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_directory_and_only_installs_once() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logging(&log_dir, DEFAULT_LOG_FILE, "debug").unwrap();
        assert!(log_dir.is_dir());
        tracing::info!("logging test line");

        let second = init_logging(&log_dir, DEFAULT_LOG_FILE, "debug");
        assert!(matches!(second, Err(LoggingError::Init(_))));

        // Other tests in this process keep logging through the writer
        std::mem::forget(guard);
    }
}
