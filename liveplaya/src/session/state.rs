//! Session state snapshots.
//!
//! A [`SessionState`] is never edited in place. Every transition builds a
//! new value from the previous one and the controller swaps it in as a
//! fresh `Arc`, so readers holding an older snapshot are unaffected and
//! `Arc::ptr_eq` tells whether anything was replaced.

use std::fmt;
use std::sync::Arc;

use crate::query::QueryModel;
use crate::transport::TransportError;
use crate::view::View;

/// Severity of a user-visible alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    Error,
    #[default]
    Info,
    Success,
}

impl AlertLevel {
    /// Lowercase name used by front ends for styling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Error => "error",
            AlertLevel::Info => "info",
            AlertLevel::Success => "success",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transient, user-dismissible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
    pub level: AlertLevel,
}

impl Alert {
    /// Create an alert with an explicit level.
    pub fn new(text: impl Into<String>, level: AlertLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    /// Create an informational alert.
    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, AlertLevel::Info)
    }

    /// Alert shown when a fetch fails for any reason other than supersession.
    pub fn fetch_failed(error: &TransportError) -> Self {
        Self::new(format!("Failed to fetch data: {}", error), AlertLevel::Error)
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// A fetch for the current query is outstanding.
    pub is_loading: bool,
    /// The query the view is (or is about to be) for.
    pub query: QueryModel,
    /// Most recent successfully fetched view.
    pub view: Option<Arc<View>>,
    /// At most one pending alert.
    pub alert: Option<Alert>,
}

impl SessionState {
    /// Initial state: loading, nothing to show yet.
    pub fn new(query: QueryModel) -> Self {
        Self {
            is_loading: true,
            query,
            view: None,
            alert: None,
        }
    }

    /// A fetch cycle has started.
    pub(crate) fn loading(&self) -> Self {
        Self {
            is_loading: true,
            ..self.clone()
        }
    }

    /// A fetch cycle has started for a new query.
    pub(crate) fn loading_query(&self, query: QueryModel) -> Self {
        Self {
            is_loading: true,
            query,
            ..self.clone()
        }
    }

    /// A fetch succeeded; any earlier alert is superseded by the fresh view.
    pub(crate) fn loaded(&self, view: Arc<View>) -> Self {
        Self {
            is_loading: false,
            query: self.query.clone(),
            view: Some(view),
            alert: None,
        }
    }

    /// A fetch failed; the previous view stays visible beside the alert.
    pub(crate) fn failed(&self, alert: Alert) -> Self {
        Self {
            is_loading: false,
            alert: Some(alert),
            ..self.clone()
        }
    }

    pub(crate) fn without_alert(&self) -> Self {
        Self {
            alert: None,
            ..self.clone()
        }
    }
}
