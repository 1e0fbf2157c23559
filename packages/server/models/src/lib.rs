#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the student map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the pipeline types to allow independent evolution of the API
//! contract.

use serde::{Deserialize, Serialize};
use student_map_analytics_models::{Granularity, HeatLegend, Metric, ReportRow, Totals};
use student_map_demographics_models::DemographicField;
use student_map_geography_models::LatLon;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Number of tracts loaded.
    pub tract_count: usize,
}

/// Error body for failed requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

/// Query parameters for the regions endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionQueryParams {
    /// Address to center the search on.
    pub address: Option<String>,
    /// Search radius in miles (1-20).
    pub radius: Option<u32>,
    /// `tract` or `neighborhood`.
    pub granularity: Option<Granularity>,
    /// `total`, `white` or `non_white`.
    pub metric: Option<Metric>,
    /// Whether to shade regions by the metric.
    pub heat: Option<bool>,
}

/// A non-fatal condition reported alongside results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNotice {
    /// Machine-readable kind, e.g. `geocode_failed`.
    pub kind: String,
    /// User-facing text.
    pub message: String,
}

/// Response of the regions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRegions {
    /// Map center.
    pub center: LatLon,
    /// Whether `center` is the geocoded address.
    pub geocoded: bool,
    /// Granularity the regions were built at. Queries without an address
    /// always use `neighborhood`.
    pub granularity: Granularity,
    /// Non-fatal conditions.
    pub notices: Vec<ApiNotice>,
    /// One feature per region with label, figures and fill style as
    /// properties.
    pub regions: geojson::FeatureCollection,
    /// Table rows, largest total first.
    pub rows: Vec<ReportRow>,
    /// Sums over all regions.
    pub totals: Totals,
    /// Heat overlay legend, when shading is on.
    pub legend: Option<HeatLegend>,
}

/// One neighborhood of the lookup table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNeighborhood {
    /// Neighborhood name.
    pub name: String,
    /// Tract names it lists.
    pub tracts: Vec<String>,
}

/// A tract listed under more than one neighborhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConflict {
    /// Tract name.
    pub tract: String,
    /// Neighborhood the tract was assigned to.
    pub kept: String,
    /// Neighborhood whose listing was ignored.
    pub ignored: String,
}

/// A tract left out because a demographic source lacked it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDroppedTract {
    /// Tract identifier.
    pub tract_id: String,
    /// Sources without a row for it.
    pub missing: Vec<DemographicField>,
}

/// Response of the neighborhoods endpoint: the lookup table and how well
/// the loaded tracts matched it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiNeighborhoods {
    /// Table identifier.
    pub id: String,
    /// City name.
    pub city: String,
    /// State abbreviation.
    pub state: String,
    /// Neighborhoods in definition order.
    pub neighborhoods: Vec<ApiNeighborhood>,
    /// Loaded tracts no neighborhood lists.
    pub unmapped: Vec<String>,
    /// Tracts listed more than once.
    pub conflicts: Vec<ApiConflict>,
    /// Tracts dropped by the demographic join.
    pub dropped: Vec<ApiDroppedTract>,
}
