#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood lookup and tract to neighborhood assignment.
//!
//! Lookup tables are TOML files embedded at compile time (see
//! [`registry`]); a replacement table with the same schema can be loaded
//! from disk. [`mapper::NeighborhoodMapper`] inverts a table once and
//! assigns every tract a neighborhood label.

pub mod mapper;
pub mod registry;

use thiserror::Error;

/// Errors that can occur while loading a neighborhood table.
#[derive(Debug, Error)]
pub enum NeighborhoodError {
    /// The table file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The table is not valid TOML for the expected schema.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
