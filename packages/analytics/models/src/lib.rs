#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregated region, report, and map styling types.
//!
//! These are the per-query values produced after tracts have been filtered
//! and grouped: one [`AggregatedRegion`] per map polygon, one [`ReportRow`]
//! per table line, and the [`RegionStyle`] used to shade each polygon.

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use student_map_demographics_models::StudentEstimate;

/// Whether regions are individual tracts or whole neighborhoods.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Granularity {
    /// One region per census tract.
    Tract,
    /// One region per neighborhood.
    #[default]
    Neighborhood,
}

/// Which potential-student figure drives map shading.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Metric {
    /// All potential students.
    #[default]
    Total,
    /// Potential students in the White population share.
    White,
    /// Potential students in the Non-White population share.
    NonWhite,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Self; 3] = [Self::Total, Self::White, Self::NonWhite];

    /// Reads this metric from an estimate.
    #[must_use]
    pub const fn value(self, estimate: &StudentEstimate) -> f64 {
        match self {
            Self::Total => estimate.total,
            Self::White => estimate.white,
            Self::NonWhite => estimate.non_white,
        }
    }

    /// Legend caption, e.g. "Total Students".
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Total => "Total Students",
            Self::White => "White Students",
            Self::NonWhite => "Non-White Students",
        }
    }

    /// Table column heading, e.g. "Total".
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::White => "White",
            Self::NonWhite => "Non-White",
        }
    }
}

/// One map region: a tract, or the union of a neighborhood's tracts.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRegion {
    /// Tract identifier or neighborhood name.
    pub label: String,
    /// The tract's neighborhood; `None` for neighborhood regions.
    pub neighborhood: Option<String>,
    /// Region boundary in longitude/latitude.
    pub geometry: MultiPolygon<f64>,
    /// Summed potential-student figures.
    pub estimate: StudentEstimate,
    /// Number of tracts in the region.
    pub tract_count: usize,
}

/// One line of the results table. Figures are rounded; `None` marks a
/// missing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    /// Tract identifier or neighborhood name.
    pub label: String,
    /// The tract's neighborhood, for tract rows.
    pub neighborhood: Option<String>,
    /// Potential students.
    pub total: Option<i64>,
    /// Potential White students.
    pub white: Option<i64>,
    /// Potential Non-White students.
    pub non_white: Option<i64>,
    /// Number of tracts summarized by the row.
    pub tract_count: usize,
}

/// Sums across a set of regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Summed figures, NaN skipped.
    pub estimate: StudentEstimate,
    /// Number of regions summed.
    pub region_count: usize,
    /// Number of tracts across those regions.
    pub tract_count: usize,
}

/// Fill style for one map polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStyle {
    /// Fill color as `#rrggbb`.
    pub fill_color: String,
    /// Fill opacity, 0-1.
    pub fill_opacity: f64,
}

/// Legend for the heat overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLegend {
    /// Caption, the metric label.
    pub caption: String,
    /// Metric value mapped to the first color.
    pub min: f64,
    /// Metric value mapped to the last color.
    pub max: f64,
    /// Palette stops, low to high.
    pub colors: Vec<String>,
}
