#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood lookup table types.
//!
//! Defines the TOML schema mapping each neighborhood of a city to the
//! census tract names it contains.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A city's neighborhood to tract lookup, deserialized from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodTractMap {
    /// Unique table identifier (e.g., `"cincinnati"`).
    pub id: String,
    /// City name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Neighborhoods in definition order.
    pub neighborhoods: Vec<NeighborhoodEntry>,
}

impl NeighborhoodTractMap {
    /// Total number of tract listings across all neighborhoods.
    #[must_use]
    pub fn tract_listing_count(&self) -> usize {
        self.neighborhoods.iter().map(|n| n.tracts.len()).sum()
    }
}

/// One neighborhood and its tract names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodEntry {
    /// Neighborhood display name.
    pub name: String,
    /// Census tract `NAME` values (e.g., `"68"`, `"82.01"`).
    pub tracts: Vec<String>,
}

/// Which lookup table to use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodConfig {
    /// Path to a replacement table; the embedded Cincinnati table is used
    /// when unset.
    pub table_path: Option<PathBuf>,
}
