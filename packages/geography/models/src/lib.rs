#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and census tract boundary types.
//!
//! These types describe where a census tract is: its identifier, its
//! boundary polygon in geographic coordinates (EPSG:4326), and the single
//! representative point used for distance math. Demographic attributes are
//! attached later by the demographics crate.

use std::path::PathBuf;

use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// Width of a census tract GEOID (state + county + tract code).
pub const TRACT_GEOID_WIDTH: usize = 11;

/// A geographic coordinate in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLon {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl LatLon {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Converts to a `geo` point (x = longitude, y = latitude).
    #[must_use]
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl From<Point<f64>> for LatLon {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Anything with a representative location that can be distance-filtered.
pub trait Located {
    /// The point distance queries are measured from.
    fn representative_point(&self) -> LatLon;
}

/// A census tract boundary after reprojection to EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct TractGeometry {
    /// Normalized census GEOID (e.g. "39061006800").
    pub tract_id: String,
    /// Short tract name (e.g. "68", "82.01"). Falls back to `tract_id`
    /// when the source has no name field.
    pub name: String,
    /// Boundary in longitude/latitude.
    pub boundary: MultiPolygon<f64>,
    /// Centroid of `boundary`, computed once at load.
    pub representative_point: LatLon,
}

impl Located for TractGeometry {
    fn representative_point(&self) -> LatLon {
        self.representative_point
    }
}

/// Where and how to read tract boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySourceConfig {
    /// Path to a `GeoJSON` `FeatureCollection`.
    pub path: PathBuf,
    /// Feature property holding the tract identifier.
    pub id_field: String,
    /// Feature property holding the short tract name.
    pub name_field: Option<String>,
    /// Coordinate reference system of the source, as `"EPSG:<code>"` or a
    /// raw PROJ string. `None` uses the file's `crs` member, then EPSG:4326.
    pub source_crs: Option<String>,
}

impl Default for GeometrySourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tl_2022_39_tract.geojson"),
            id_field: "GEOID".to_string(),
            name_field: Some("NAME".to_string()),
            source_crs: None,
        }
    }
}

/// Normalizes a tract identifier so that keys from differently typed
/// sources compare equal.
///
/// Trims whitespace and surrounding quotes, drops an integral float suffix
/// (`"39061000100.0"`), and left-pads all-digit keys shorter than a GEOID
/// with zeros (a leading `0` lost to numeric typing).
#[must_use]
pub fn normalize_tract_key(raw: &str) -> String {
    let mut key = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();

    if let Some((int_part, frac)) = key.split_once('.')
        && !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b == b'0')
    {
        key = int_part;
    }

    if !key.is_empty() && key.len() < TRACT_GEOID_WIDTH && key.bytes().all(|b| b.is_ascii_digit())
    {
        format!("{key:0>TRACT_GEOID_WIDTH$}")
    } else {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_geoid() {
        assert_eq!(normalize_tract_key("39061000100"), "39061000100");
        assert_eq!(normalize_tract_key("  39061000100 "), "39061000100");
    }

    #[test]
    fn strips_quotes_and_float_suffix() {
        assert_eq!(normalize_tract_key("\"39061000100\""), "39061000100");
        assert_eq!(normalize_tract_key("39061000100.0"), "39061000100");
        assert_eq!(normalize_tract_key("39061000100.000"), "39061000100");
    }

    #[test]
    fn restores_lost_leading_zero() {
        assert_eq!(normalize_tract_key("1073000100"), "01073000100");
        assert_eq!(normalize_tract_key("1073000100.0"), "01073000100");
    }

    #[test]
    fn leaves_non_numeric_keys_alone() {
        assert_eq!(normalize_tract_key("A"), "A");
        assert_eq!(normalize_tract_key("tract-7"), "tract-7");
        assert_eq!(normalize_tract_key(""), "");
    }

    #[test]
    fn keeps_fractional_tract_names_intact() {
        // Short decimal values are tract names, not mangled GEOIDs.
        assert_eq!(normalize_tract_key("82.01"), "82.01");
    }

    #[test]
    fn lat_lon_point_round_trip_axes() {
        let p = LatLon::new(39.1, -84.5).to_point();
        assert!((p.x() - -84.5).abs() < f64::EPSILON);
        assert!((p.y() - 39.1).abs() < f64::EPSILON);
        assert_eq!(LatLon::from(p), LatLon::new(39.1, -84.5));
    }
}
