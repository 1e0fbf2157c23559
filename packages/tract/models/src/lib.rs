#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The merged census tract record.
//!
//! A [`Tract`] is built once at load time from a boundary, its joined
//! demographics, the derived estimate, and its neighborhood label. It is
//! never modified afterwards.

use geo::MultiPolygon;
use student_map_demographics_models::{DemographicValues, StudentEstimate};
use student_map_geography_models::{LatLon, Located};

/// A census tract with everything the map needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Tract {
    /// Normalized census GEOID; the join key.
    pub tract_id: String,
    /// Short tract name; the neighborhood lookup key.
    pub name: String,
    /// Boundary in longitude/latitude.
    pub boundary: MultiPolygon<f64>,
    /// Boundary centroid.
    pub representative_point: LatLon,
    /// Joined census attributes.
    pub demographics: DemographicValues,
    /// Potential students derived from `demographics`.
    pub estimate: StudentEstimate,
    /// Neighborhood label; never empty.
    pub neighborhood: String,
}

impl Located for Tract {
    fn representative_point(&self) -> LatLon {
        self.representative_point
    }
}
