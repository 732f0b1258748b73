//! View queries.
//!
//! A [`QueryModel`] describes which part of the world the client wants to
//! see: an optional bounding region, a zoom level and an optional point in
//! time. Queries are plain values. The session controller compares them by
//! value and hands them to the transport, which decides how to serialize
//! them onto the wire.
//!
//! # Query String
//!
//! [`QueryModel::to_query_pairs`] produces the parameters understood by the
//! backend's `v0` endpoint:
//!
//! ```text
//! zoom=12.8&time=2023-08-30T18:00:00.000Z&bounds=-119.21430,40.77000,-119.19000,40.79500
//! ```
//!
//! Absent fields are omitted entirely, never sent as empty values.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Number of decimal places used when encoding coordinates.
///
/// Five places is roughly one metre at the equator.
pub const COORD_PRECISION: usize = 5;

/// A longitude/latitude pair in degrees (GeoJSON order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in degrees, positive east.
    pub lng: f64,
    /// Latitude in degrees, positive north.
    pub lat: f64,
}

impl LngLat {
    /// Create a new coordinate.
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.prec$},{:.prec$}",
            self.lng,
            self.lat,
            prec = COORD_PRECISION
        )
    }
}

/// A geographic bounding box, south-west to north-east corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// South-west corner.
    pub min: LngLat,
    /// North-east corner.
    pub max: LngLat,
}

impl BBox {
    /// Create a bounding box from `[west, south, east, north]` edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            min: LngLat::new(west, south),
            max: LngLat::new(east, north),
        }
    }

    /// A degenerate box around a single point.
    ///
    /// Used before the map has been laid out and its real extent is known.
    pub fn from_point(point: LngLat) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Center point of the box.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min.lng + self.max.lng) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

/// Error returned when parsing a [`BBox`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bounds '{0}': expected west,south,east,north")]
pub struct ParseBBoxError(String);

impl std::str::FromStr for BBox {
    type Err = ParseBBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let edges = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseBBoxError(s.to_string()))?;

        match edges.as_slice() {
            [w, s_, e, n] if edges.iter().all(|v| v.is_finite()) => Ok(BBox::new(*w, *s_, *e, *n)),
            _ => Err(ParseBBoxError(s.to_string())),
        }
    }
}

/// What view the client wants.
///
/// Immutable by convention: the session replaces queries wholesale rather
/// than editing them in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryModel {
    /// Visible region of the map, if known.
    pub bounds: Option<BBox>,
    /// Map zoom level.
    pub zoom: Option<f64>,
    /// Point in time to view; `None` means "live".
    pub at_time: Option<DateTime<Utc>>,
    /// Slug of a feature to focus on (e.g. `aprs/w6abc`).
    pub feature: Option<String>,
}

impl QueryModel {
    /// An empty "live, anywhere" query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// Set the visible region.
    pub fn with_bounds(mut self, bounds: BBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the point in time to view.
    pub fn with_time(mut self, at_time: DateTime<Utc>) -> Self {
        self.at_time = Some(at_time);
        self
    }

    /// Set the feature to focus on.
    pub fn with_feature(mut self, slug: impl Into<String>) -> Self {
        self.feature = Some(slug.into());
        self
    }

    /// Encode the query as URL parameters.
    ///
    /// A zoom of exactly zero is treated as unset, matching the backend
    /// which has no meaningful zoom-0 view.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(zoom) = self.zoom.filter(|z| *z != 0.0 && z.is_finite()) {
            pairs.push(("zoom", zoom.to_string()));
        }
        if let Some(at_time) = self.at_time {
            pairs.push((
                "time",
                at_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            ));
        }
        if let Some(bounds) = self.bounds {
            pairs.push(("bounds", bounds.to_string()));
        }
        if let Some(feature) = self.feature.as_deref().filter(|f| !f.is_empty()) {
            pairs.push(("feature", feature.to_string()));
        }

        pairs
    }
}

impl fmt::Display for QueryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.to_query_pairs();
        if pairs.is_empty() {
            return write!(f, "(live)");
        }
        let mut first = true;
        for (key, value) in pairs {
            if !first {
                write!(f, "&")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}
