//! Shared setup for commands that talk to the backend.

use liveplaya::config::ConfigFile;
use liveplaya::logging::{init_logging, LoggingGuard, DEFAULT_LOG_FILE};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus installed logging.
///
/// Keep the runner alive for the whole command so buffered log lines are
/// flushed on exit.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load `~/.liveplaya/config.ini` and start logging to the configured
    /// directory.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(
            &config.logging.directory,
            DEFAULT_LOG_FILE,
            &config.logging.level,
        )?;

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command being run and where logs are going.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = liveplaya::VERSION,
            command,
            log_dir = %self.config.logging.directory.display(),
            "LivePlaya CLI starting"
        );
    }

    /// Multi-threaded runtime the session and transport run on.
    pub fn create_runtime(&self) -> Result<Runtime, CliError> {
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("liveplaya-worker")
            .build()
            .map_err(CliError::Runtime)
    }
}
