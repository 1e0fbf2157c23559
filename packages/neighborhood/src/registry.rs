//! Compile-time registry of neighborhood lookup tables.
//!
//! Each entry is a `(name, toml_content)` pair embedded via `include_str!`.
//! Adding a new city requires creating a TOML file in `sources/` and adding
//! a corresponding entry here.

use std::path::Path;

use student_map_neighborhood_models::{NeighborhoodConfig, NeighborhoodTractMap};

use crate::NeighborhoodError;

/// Identifier of the table used when no override is configured.
pub const DEFAULT_TABLE_ID: &str = "cincinnati";

/// Number of registered tables. Enforced by a test.
#[cfg(test)]
const EXPECTED_TABLE_COUNT: usize = 1;

/// Embedded TOML table definitions.
const TABLE_TOMLS: &[(&str, &str)] = &[("cincinnati", include_str!("../sources/cincinnati.toml"))];

fn parse_embedded(name: &str, toml_str: &str) -> NeighborhoodTractMap {
    toml::de::from_str(toml_str)
        .unwrap_or_else(|e| panic!("Failed to parse neighborhood table '{name}': {e}"))
}

/// Returns all registered lookup tables.
///
/// # Panics
///
/// Panics if any embedded TOML file fails to parse. Since these are
/// compile-time constants, parse failures indicate a development error
/// and are caught by the tests below.
#[must_use]
pub fn all_tables() -> Vec<NeighborhoodTractMap> {
    TABLE_TOMLS
        .iter()
        .map(|(name, toml_str)| parse_embedded(name, toml_str))
        .collect()
}

/// Returns the embedded table with the given identifier.
#[must_use]
pub fn embedded(id: &str) -> Option<NeighborhoodTractMap> {
    TABLE_TOMLS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(name, toml_str)| parse_embedded(name, toml_str))
}

/// Parses a table from TOML text.
///
/// # Errors
///
/// Returns [`NeighborhoodError::Toml`] if the text does not match the
/// table schema.
pub fn from_toml_str(contents: &str) -> Result<NeighborhoodTractMap, NeighborhoodError> {
    Ok(toml::de::from_str(contents)?)
}

/// Reads a table from a TOML file.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the file cannot be read or parsed.
pub fn from_path(path: &Path) -> Result<NeighborhoodTractMap, NeighborhoodError> {
    let contents = std::fs::read_to_string(path).map_err(|source| NeighborhoodError::Io {
        path: path.display().to_string(),
        source,
    })?;
    from_toml_str(&contents)
}

/// Resolves the configured table: the override file when set, otherwise
/// the embedded default.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the override file cannot be loaded.
///
/// # Panics
///
/// Panics if the embedded default table is missing or malformed.
pub fn load(config: &NeighborhoodConfig) -> Result<NeighborhoodTractMap, NeighborhoodError> {
    let table = match &config.table_path {
        Some(path) => {
            log::info!("Loading neighborhood table from {}", path.display());
            from_path(path)?
        }
        None => embedded(DEFAULT_TABLE_ID).unwrap_or_else(|| {
            panic!("Default neighborhood table '{DEFAULT_TABLE_ID}' is not registered")
        }),
    };

    log::info!(
        "Neighborhood table '{}' ({}, {}): {} neighborhoods, {} tract listings",
        table.id,
        table.city,
        table.state,
        table.neighborhoods.len(),
        table.tract_listing_count()
    );

    Ok(table)
}
