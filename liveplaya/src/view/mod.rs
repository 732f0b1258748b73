//! The view payload returned by the backend.
//!
//! The session controller treats a [`View`] as opaque: it is stored and
//! handed to subscribers unchanged. The types here only exist so that the
//! JSON body can be decoded once, at the transport boundary, and so that
//! front ends have typed access to the parts they render.
//!
//! # Wire Format
//!
//! ```json
//! {
//!   "name": "Black Rock City 2023",
//!   "description": "Watching 12 APRS stations.",
//!   "time": "2023-08-30T18:00:00Z",
//!   "bearingDeg": 45.0,
//!   "center": [-119.2065, 40.7864],
//!   "zoom": 12.8,
//!   "type": "FeatureCollection",
//!   "features": [ ... ],
//!   "refs": [ { "type": "beacon", "name": "W6ABC", ... } ],
//!   "log": [ { "level": "info", "id": 1, "time": "...", "text": "..." } ]
//! }
//! ```
//!
//! The map part is flattened into the top-level object and may be absent
//! for text-only views.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A snapshot of server-side state for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    /// Display name of the area being watched.
    pub name: String,

    /// Free-form description shown under the name.
    #[serde(default)]
    pub description: Option<String>,

    /// Server time the snapshot was taken (RFC 3339).
    pub time: String,

    /// Map part of the view, absent for text-only views.
    #[serde(flatten)]
    pub map: Option<MapSnapshot>,

    /// Features the user can jump to.
    #[serde(default)]
    pub refs: Vec<FeatureRef>,

    /// Most recent log messages, oldest first.
    #[serde(default)]
    pub log: Vec<LogMessage>,
}

impl View {
    /// Number of map features, zero for text-only views.
    pub fn feature_count(&self) -> usize {
        self.map.as_ref().map_or(0, |m| m.features.len())
    }
}

/// Map camera plus GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    /// Map rotation in degrees clockwise from north.
    pub bearing_deg: f64,

    /// Map center as `[lng, lat]`.
    pub center: [f64; 2],

    /// Suggested zoom level.
    pub zoom: f64,

    /// GeoJSON object type, always `FeatureCollection`.
    #[serde(rename = "type")]
    pub kind: String,

    /// GeoJSON features, passed through uninterpreted.
    pub features: Vec<serde_json::Value>,
}

/// Reference to a feature that can be focused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeatureRef {
    /// A tracked APRS beacon.
    Beacon {
        name: String,
        slug: String,
        location: String,
        lastseen: String,
    },
}

/// Severity of a backend log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A message from the backend's recent activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub id: u64,
    pub level: LogLevel,
    pub text: String,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP_VIEW_JSON: &str = r#"{
        "name": "Black Rock City 2023",
        "description": "Watching 2 APRS stations.",
        "time": "2023-08-30T18:00:00Z",
        "bearingDeg": 45.0,
        "center": [-119.2065, 40.7864],
        "zoom": 12.8,
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-119.2, 40.78]}, "properties": {"liveplaya": "poi"}}
        ],
        "refs": [
            {"type": "beacon", "name": "W6ABC", "slug": "aprs/w6abc", "location": "6:00 & Esplanade", "lastseen": "2023-08-30T17:59:00Z"}
        ],
        "log": [
            {"level": "info", "id": 1, "time": "2023-08-30T17:59:00Z", "text": "W6ABC>APRS:!4046.00N/11912.00W>"},
            {"level": "error", "id": 2, "time": "2023-08-30T17:59:30Z", "text": "garbage: unsupported packet"}
        ]
    }"#;

    #[test]
    fn test_decode_map_view() {
        let view: View = serde_json::from_str(MAP_VIEW_JSON).unwrap();

        assert_eq!(view.name, "Black Rock City 2023");
        assert_eq!(view.feature_count(), 1);

        let map = view.map.as_ref().unwrap();
        assert_eq!(map.bearing_deg, 45.0);
        assert_eq!(map.center, [-119.2065, 40.7864]);
        assert_eq!(map.kind, "FeatureCollection");

        assert_eq!(view.refs.len(), 1);
        match &view.refs[0] {
            FeatureRef::Beacon { slug, .. } => assert_eq!(slug, "aprs/w6abc"),
        }

        assert_eq!(view.log.len(), 2);
        assert_eq!(view.log[0].level, LogLevel::Info);
        assert_eq!(view.log[1].level, LogLevel::Error);
        assert_eq!(view.log[1].level.to_string(), "error");
    }

    #[test]
    fn test_decode_text_view_without_map() {
        let json = r#"{"name": "Log", "time": "2023-08-30T18:00:00Z"}"#;
        let view: View = serde_json::from_str(json).unwrap();

        assert!(view.map.is_none());
        assert!(view.description.is_none());
        assert!(view.refs.is_empty());
        assert!(view.log.is_empty());
        assert_eq!(view.feature_count(), 0);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let json = r#"{"name": "x", "time": "t", "bounds": [0, 0, 1, 1], "extra": true}"#;
        assert!(serde_json::from_str::<View>(json).is_ok());
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let json = r#"{"time": "2023-08-30T18:00:00Z"}"#;
        assert!(serde_json::from_str::<View>(json).is_err());
    }
}
