//! Common types and utilities shared across CLI commands.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Args;
use liveplaya::config::ConfigFile;
use liveplaya::query::{BBox, QueryModel};
use liveplaya::session::{SessionConfig, SessionState};
use liveplaya::transport::{HttpTransport, SyntheticTransport, Transport, DEFAULT_LATENCY};
use liveplaya::view::View;

use crate::error::CliError;

/// Which view to ask for.
#[derive(Debug, Clone, Default, Args)]
pub struct QueryArgs {
    /// Map zoom level (omitted when 0)
    #[arg(long)]
    pub zoom: Option<f64>,

    /// Visible area as west,south,east,north
    #[arg(long, allow_hyphen_values = true)]
    pub bounds: Option<BBox>,

    /// Historical point in time (RFC 3339), live when omitted
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    /// Focus on a feature by slug (e.g. aprs/w6abc)
    #[arg(long)]
    pub feature: Option<String>,
}

impl QueryArgs {
    pub fn to_query(&self) -> QueryModel {
        let mut query = QueryModel::new();
        if let Some(zoom) = self.zoom {
            query = query.with_zoom(zoom);
        }
        if let Some(bounds) = self.bounds {
            query = query.with_bounds(bounds);
        }
        if let Some(at) = self.at {
            query = query.with_time(at);
        }
        if let Some(ref feature) = self.feature {
            query = query.with_feature(feature.clone());
        }
        query
    }
}

/// Where views come from.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Backend API root (overrides config)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Generate views locally instead of contacting a backend
    #[arg(long, conflicts_with = "endpoint")]
    pub synthetic: bool,
}

/// Resolve the endpoint: CLI > config.
pub fn resolve_endpoint(cli_endpoint: Option<String>, config: &ConfigFile) -> String {
    cli_endpoint.unwrap_or_else(|| config.session.endpoint.clone())
}

/// Resolve the request timeout: CLI > config.
pub fn resolve_timeout(cli_timeout: Option<u64>, config: &ConfigFile) -> Duration {
    cli_timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.request_timeout())
}

/// Resolve the refresh schedule: CLI > config. `0` disables refresh.
pub fn resolve_session_config(cli_interval_ms: Option<u64>, config: &ConfigFile) -> SessionConfig {
    cli_interval_ms
        .map(SessionConfig::from_millis)
        .unwrap_or_else(|| config.session_config())
}

/// Build the transport selected by the arguments.
pub fn build_transport(
    args: &ConnectionArgs,
    config: &ConfigFile,
) -> Result<Arc<dyn Transport>, CliError> {
    if args.synthetic {
        return Ok(Arc::new(SyntheticTransport::new(DEFAULT_LATENCY)));
    }

    let endpoint = resolve_endpoint(args.endpoint.clone(), config);
    let timeout = resolve_timeout(args.timeout, config);
    let transport = HttpTransport::with_timeout(&endpoint, timeout)
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(Arc::new(transport))
}

/// One-line summary of a view.
pub fn describe_view(view: &View) -> String {
    let mut line = format!("{} @ {}", view.name, view.time);
    if let Some(ref map) = view.map {
        line.push_str(&format!(
            " | zoom {:.1} center {:.5},{:.5} | {} features",
            map.zoom,
            map.center[0],
            map.center[1],
            map.features.len()
        ));
    }
    line.push_str(&format!(
        " | {} refs | {} log messages",
        view.refs.len(),
        view.log.len()
    ));
    line
}

/// One-line summary of a session state.
pub fn describe_state(state: &SessionState) -> String {
    let mut line = if state.is_loading {
        format!("loading {}", state.query)
    } else {
        match state.view {
            Some(ref view) => describe_view(view),
            None => "no view".to_string(),
        }
    };

    if let Some(ref alert) = state.alert {
        line.push_str(&format!(" | {}", alert));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use liveplaya::view::MapSnapshot;

    fn config() -> ConfigFile {
        let mut config = ConfigFile::default();
        config.session.endpoint = "http://playa.example:9000/api".to_string();
        config.session.refresh_interval_ms = 2500;
        config.session.timeout_secs = 12;
        config
    }

    fn view() -> View {
        View {
            name: "Black Rock City".to_string(),
            description: None,
            time: "2023-08-30T18:00:00Z".to_string(),
            map: Some(MapSnapshot {
                bearing_deg: 45.0,
                center: [-119.2065, 40.7864],
                zoom: 12.0,
                kind: "FeatureCollection".to_string(),
                features: Vec::new(),
            }),
            refs: Vec::new(),
            log: Vec::new(),
        }
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = config();
        assert_eq!(
            resolve_endpoint(Some("http://other/api".to_string()), &config),
            "http://other/api"
        );
        assert_eq!(resolve_timeout(Some(3), &config), Duration::from_secs(3));
        assert_eq!(resolve_session_config(Some(0), &config).refresh_interval(), None);
    }

    #[test]
    fn test_config_used_when_cli_silent() {
        let config = config();
        assert_eq!(resolve_endpoint(None, &config), "http://playa.example:9000/api");
        assert_eq!(resolve_timeout(None, &config), Duration::from_secs(12));
        assert_eq!(
            resolve_session_config(None, &config).refresh_interval(),
            Some(Duration::from_millis(2500))
        );
    }

    #[test]
    fn test_query_args_to_query() {
        let args = QueryArgs {
            zoom: Some(6.0),
            bounds: Some(BBox::new(-119.3, 40.7, -119.1, 40.8)),
            at: None,
            feature: Some("aprs/w6abc".to_string()),
        };
        let query = args.to_query();
        assert_eq!(query.zoom, Some(6.0));
        assert!(query.bounds.is_some());
        assert!(query.at_time.is_none());
        assert_eq!(query.feature.as_deref(), Some("aprs/w6abc"));

        assert_eq!(QueryArgs::default().to_query(), QueryModel::new());
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let args = ConnectionArgs {
            endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        let err = build_transport(&args, &config()).err().unwrap();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_synthetic_transport_selected() {
        let args = ConnectionArgs {
            synthetic: true,
            ..Default::default()
        };
        let transport = build_transport(&args, &config()).unwrap();
        assert_eq!(transport.name(), "synthetic");
    }

    #[test]
    fn test_describe_view() {
        assert_eq!(
            describe_view(&view()),
            "Black Rock City @ 2023-08-30T18:00:00Z | zoom 12.0 center -119.20650,40.78640 \
             | 0 features | 0 refs | 0 log messages"
        );
    }

    #[test]
    fn test_describe_state() {
        let loading = SessionState::new(QueryModel::new().with_zoom(5.0));
        assert_eq!(describe_state(&loading), "loading zoom=5");

        let mut failed = loading.clone();
        failed.is_loading = false;
        failed.alert = Some(liveplaya::session::Alert::new(
            "Failed to fetch data: HTTP 500: oops",
            liveplaya::session::AlertLevel::Error,
        ));
        assert_eq!(
            describe_state(&failed),
            "no view | [error] Failed to fetch data: HTTP 500: oops"
        );
    }
}
