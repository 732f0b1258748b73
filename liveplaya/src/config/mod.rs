//! Configuration file support.
//!
//! Settings live in an INI file at `~/.liveplaya/config.ini`:
//!
//! ```ini
//! [session]
//! endpoint = http://localhost:8000/api
//! refresh_interval_ms = 5000
//! timeout_secs = 30
//!
//! [logging]
//! directory = /home/me/.liveplaya/logs
//! level = info
//! ```
//!
//! A missing file is not an error: every setting has a default. Settings
//! are addressed as `section.key` through [`ConfigKey`], which is what the
//! CLI's `config get/set/list` commands use.

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, ConfigError, ConfigFile, LoggingSettings, SessionSettings,
    CONFIG_FILE_NAME,
};
pub use keys::ConfigKey;
