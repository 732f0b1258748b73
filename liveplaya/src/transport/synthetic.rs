//! Offline transport that fabricates views.
//!
//! Useful for running a front end without a backend: every request resolves
//! after a fixed delay with an empty map centred on the query's bounds.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio_util::sync::CancellationToken;

use super::types::{BoxFuture, Transport, TransportError};
use crate::query::{BBox, QueryModel};
use crate::view::{MapSnapshot, View};

/// Default simulated response latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_secs(1);

/// Zoom used when the query does not specify one.
pub const DEFAULT_ZOOM: f64 = 5.0;

/// Map bearing of fabricated views, in degrees.
const BEARING_DEG: f64 = 45.0;

/// Transport that answers every query with a generated view.
#[derive(Debug, Clone)]
pub struct SyntheticTransport {
    latency: Duration,
}

impl Default for SyntheticTransport {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY)
    }
}

impl SyntheticTransport {
    /// Create a synthetic transport with the given response latency.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Build the view a query would receive.
    pub fn view_for(query: &QueryModel) -> View {
        let bounds = query.bounds.unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        let center = bounds.center();
        let time = query.at_time.unwrap_or_else(Utc::now);

        View {
            name: "Synthetic".to_string(),
            description: Some(format!("Generated for {}", query)),
            time: time.to_rfc3339_opts(SecondsFormat::Secs, true),
            map: Some(MapSnapshot {
                bearing_deg: BEARING_DEG,
                center: [center.lng, center.lat],
                zoom: query.zoom.unwrap_or(DEFAULT_ZOOM),
                kind: "FeatureCollection".to_string(),
                features: Vec::new(),
            }),
            refs: Vec::new(),
            log: Vec::new(),
        }
    }
}

impl Transport for SyntheticTransport {
    fn fetch_view<'a>(
        &'a self,
        query: &'a QueryModel,
        cancel: CancellationToken,
    ) -> BoxFuture<'a, Result<View, TransportError>> {
        Box::pin(async move {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => Err(TransportError::Cancelled),
                _ = tokio::time::sleep(self.latency) => Ok(Self::view_for(query)),
            }
        })
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
