#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Demographic CSV loading, the tract join, and potential-student estimates.

pub mod coerce;
pub mod estimate;
pub mod join;
pub mod loader;

use student_map_demographics_models::DemographicField;
use thiserror::Error;

/// Errors that can occur while loading demographic tables.
#[derive(Debug, Error)]
pub enum DemographicError {
    /// The source file could not be opened.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is not in the header row.
    #[error("{field} source has no column named '{column}'")]
    MissingColumn {
        /// The attribute being loaded.
        field: DemographicField,
        /// The column that was expected.
        column: String,
    },

    /// A tract key appears more than once in one source.
    #[error("{field} source lists tract {key} more than once")]
    DuplicateKey {
        /// The attribute being loaded.
        field: DemographicField,
        /// The repeated (normalized) key.
        key: String,
    },
}
