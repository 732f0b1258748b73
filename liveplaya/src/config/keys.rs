//! Addressable configuration keys.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::{ConfigError, ConfigFile};

/// Log levels accepted by `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A `section.key` setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SessionEndpoint,
    SessionRefreshIntervalMs,
    SessionTimeoutSecs,
    LoggingDirectory,
    LoggingLevel,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::SessionEndpoint,
            ConfigKey::SessionRefreshIntervalMs,
            ConfigKey::SessionTimeoutSecs,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingLevel,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::SessionEndpoint
            | ConfigKey::SessionRefreshIntervalMs
            | ConfigKey::SessionTimeoutSecs => "session",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    /// Key name within the section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::SessionEndpoint => "endpoint",
            ConfigKey::SessionRefreshIntervalMs => "refresh_interval_ms",
            ConfigKey::SessionTimeoutSecs => "timeout_secs",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::SessionEndpoint => config.session.endpoint.clone(),
            ConfigKey::SessionRefreshIntervalMs => config.session.refresh_interval_ms.to_string(),
            ConfigKey::SessionTimeoutSecs => config.session.timeout_secs.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::SessionEndpoint => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must be an http:// or https:// URL"));
                }
                config.session.endpoint = value.to_string();
            }
            ConfigKey::SessionRefreshIntervalMs => {
                config.session.refresh_interval_ms = value
                    .parse()
                    .map_err(|_| invalid("must be a whole number of milliseconds"))?;
            }
            ConfigKey::SessionTimeoutSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid("must be a whole number of seconds"))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1"));
                }
                config.session.timeout_secs = secs;
            }
            ConfigKey::LoggingDirectory => {
                if value.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                config.logging.directory = PathBuf::from(value);
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid("must be one of trace, debug, info, warn, error"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_parse_unknown_key() {
        assert!(matches!(
            "session.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_set_and_get_refresh_interval() {
        let mut config = ConfigFile::default();
        ConfigKey::SessionRefreshIntervalMs
            .set(&mut config, " 1000 ")
            .unwrap();
        assert_eq!(ConfigKey::SessionRefreshIntervalMs.get(&config), "1000");
    }

    #[test]
    fn test_endpoint_requires_http_scheme() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::SessionEndpoint
            .set(&mut config, "ftp://example.org")
            .is_err());
        ConfigKey::SessionEndpoint
            .set(&mut config, "https://example.org/api")
            .unwrap();
        assert_eq!(config.session.endpoint, "https://example.org/api");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::SessionTimeoutSecs.set(&mut config, "0").is_err());
    }

    #[test]
    fn test_log_level_is_normalized() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingLevel.set(&mut config, "DEBUG").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(ConfigKey::LoggingLevel.to_string(), "logging.level");
        assert_eq!(ConfigKey::LoggingLevel.name(), "logging.level");
    }
}
