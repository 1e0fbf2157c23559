#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The merged tract table and query execution.
//!
//! [`table::TractTable`] is built once at startup from the boundary file,
//! the three demographic CSVs and the neighborhood lookup, and is then
//! shared read-only. [`query`] runs one user query against it: geocode,
//! radius filter, aggregate, format.

pub mod query;
pub mod table;

use serde::{Deserialize, Serialize};
use student_map_demographics::DemographicError;
use student_map_demographics_models::DemographicSourcesConfig;
use student_map_geography::GeoError;
use student_map_geography_models::{GeometrySourceConfig, LatLon};
use student_map_neighborhood::NeighborhoodError;
use student_map_neighborhood_models::NeighborhoodConfig;
use thiserror::Error;

/// Default map center (downtown Cincinnati).
pub const DEFAULT_CENTER: LatLon = LatLon::new(39.1031, -84.5120);

/// Errors that can occur while building the tract table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Boundary loading failed.
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeoError),

    /// Demographic loading failed.
    #[error("Demographics error: {0}")]
    Demographics(#[from] DemographicError),

    /// Neighborhood table loading failed.
    #[error("Neighborhood error: {0}")]
    Neighborhood(#[from] NeighborhoodError),
}

/// Where the tract table's inputs live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Tract boundaries.
    pub geometry: GeometrySourceConfig,
    /// Demographic CSVs.
    pub demographics: DemographicSourcesConfig,
    /// Neighborhood lookup table.
    pub neighborhoods: NeighborhoodConfig,
}

/// Map defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MapConfig {
    /// Center used when no address is given or geocoding fails.
    pub default_center: LatLon,
    /// Radius used when a query does not specify one.
    pub default_radius_miles: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_radius_miles: query::DEFAULT_RADIUS_MILES,
        }
    }
}
