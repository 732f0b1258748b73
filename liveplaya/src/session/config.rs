//! Session controller configuration.

use std::time::Duration;

/// Default refresh period in milliseconds.
///
/// Matches the interval the web front end has always polled at.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5000;

/// Configuration for a [`SessionController`](super::SessionController).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    refresh_interval: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Some(Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS)),
        }
    }
}

impl SessionConfig {
    /// Create a config with the default refresh interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from a millisecond period; `0` disables refresh.
    pub fn from_millis(refresh_interval_ms: u64) -> Self {
        Self::default().with_refresh_interval(Duration::from_millis(refresh_interval_ms))
    }

    /// Set the refresh period. A zero period disables refresh.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = (!interval.is_zero()).then_some(interval);
        self
    }

    /// Disable the recurring refresh; only construction and queries fetch.
    pub fn without_refresh(mut self) -> Self {
        self.refresh_interval = None;
        self
    }

    /// The refresh period, `None` when disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval() {
        assert_eq!(
            SessionConfig::default().refresh_interval(),
            Some(Duration::from_millis(5000))
        );
    }

    #[test]
    fn test_zero_disables_refresh() {
        assert_eq!(SessionConfig::from_millis(0).refresh_interval(), None);
        assert_eq!(
            SessionConfig::new()
                .with_refresh_interval(Duration::ZERO)
                .refresh_interval(),
            None
        );
    }

    #[test]
    fn test_without_refresh() {
        assert_eq!(SessionConfig::new().without_refresh().refresh_interval(), None);
    }

    #[test]
    fn test_from_millis() {
        assert_eq!(
            SessionConfig::from_millis(250).refresh_interval(),
            Some(Duration::from_millis(250))
        );
    }
}
