#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census demographic source and student estimate types.
//!
//! Values are `f64` and a malformed source value is carried as NaN rather
//! than zero, so a corrupt record stays visible instead of silently
//! lowering a total.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The three demographic attributes joined onto each tract.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DemographicField {
    /// Residents under 18 years old (count).
    #[serde(rename = "under_18")]
    #[strum(serialize = "under_18")]
    Under18,
    /// Households with income below the threshold (percent, 0-100).
    LowIncome,
    /// Population identified as White (percent, 0-100).
    White,
}

impl DemographicField {
    /// All fields in join order.
    pub const ALL: [Self; 3] = [Self::Under18, Self::LowIncome, Self::White];
}

/// A CSV file providing one demographic attribute keyed by tract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicSourceConfig {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Column holding the tract identifier.
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Column holding the value of interest.
    pub value_column: String,
}

fn default_key_column() -> String {
    "GeoID".to_string()
}

/// The three demographic sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemographicSourcesConfig {
    /// Residents under 18.
    pub under_18: DemographicSourceConfig,
    /// Percent of households below the income threshold.
    pub low_income: DemographicSourceConfig,
    /// Percent White population.
    pub white: DemographicSourceConfig,
}

impl DemographicSourcesConfig {
    /// Returns the source for a field.
    #[must_use]
    pub const fn source(&self, field: DemographicField) -> &DemographicSourceConfig {
        match field {
            DemographicField::Under18 => &self.under_18,
            DemographicField::LowIncome => &self.low_income,
            DemographicField::White => &self.white,
        }
    }
}

impl Default for DemographicSourcesConfig {
    fn default() -> Self {
        Self {
            under_18: DemographicSourceConfig {
                path: PathBuf::from("data/Cinci ,18 by tract.csv"),
                key_column: default_key_column(),
                value_column: "People < 18 Years Old".to_string(),
            },
            low_income: DemographicSourceConfig {
                path: PathBuf::from("data/Cinci less the 50K by tract -percent.csv"),
                key_column: default_key_column(),
                value_column: "Percent HHs with Income < $50,000".to_string(),
            },
            white: DemographicSourceConfig {
                path: PathBuf::from("data/Cinci white by tract - percent.csv"),
                key_column: default_key_column(),
                value_column: "Percent White Population".to_string(),
            },
        }
    }
}

/// Demographic attributes of one tract. NaN marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicValues {
    /// Residents under 18.
    pub under_18_count: f64,
    /// Percent of households below the income threshold (0-100).
    pub pct_low_income: f64,
    /// Percent White population (0-100).
    pub pct_white: f64,
}

impl DemographicValues {
    /// Returns the value of a field.
    #[must_use]
    pub const fn get(&self, field: DemographicField) -> f64 {
        match field {
            DemographicField::Under18 => self.under_18_count,
            DemographicField::LowIncome => self.pct_low_income,
            DemographicField::White => self.pct_white,
        }
    }
}

/// Potential-student counts with the White / Non-White breakdown.
///
/// The derivation is linear, so `white + non_white == total` holds for a
/// single tract and for any NaN-free sum of tracts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentEstimate {
    /// All potential students.
    pub total: f64,
    /// Potential students in the White share of the population.
    pub white: f64,
    /// Potential students in the Non-White share of the population.
    pub non_white: f64,
}

impl StudentEstimate {
    /// All metrics zero.
    pub const ZERO: Self = Self {
        total: 0.0,
        white: 0.0,
        non_white: 0.0,
    };

    /// Whether no metric is NaN.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        !self.total.is_nan() && !self.white.is_nan() && !self.non_white.is_nan()
    }

    /// Sums each metric independently, skipping NaN values.
    #[must_use]
    pub fn sum_skipping_nan<'a>(estimates: impl IntoIterator<Item = &'a Self>) -> Self {
        estimates.into_iter().fold(Self::ZERO, |acc, e| Self {
            total: acc.total + nan_to_zero(e.total),
            white: acc.white + nan_to_zero(e.white),
            non_white: acc.non_white + nan_to_zero(e.non_white),
        })
    }
}

const fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}
