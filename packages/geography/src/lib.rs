#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract boundary loading, reprojection, and proximity filtering.
//!
//! Reads tract polygons from a `GeoJSON` `FeatureCollection`, reprojects
//! them to EPSG:4326 with an exact PROJ transform, and memoizes each
//! tract's centroid as its representative point. The [`proximity`] module
//! filters anything [`Located`](student_map_geography_models::Located) by
//! geodesic distance from a query center.

pub mod projection;
pub mod proximity;
pub mod store;

use thiserror::Error;

/// Errors that can occur while loading or reprojecting tract boundaries.
#[derive(Debug, Error)]
pub enum GeoError {
    /// The boundary file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The boundary file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` root is not a `FeatureCollection`.
    #[error("Boundary source is not a FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacks the tract identifier property.
    #[error("Feature #{index} has no usable '{field}' property")]
    MissingProperty {
        /// Zero-based feature index in the collection.
        index: usize,
        /// Name of the missing property.
        field: String,
    },

    /// A feature has no geometry.
    #[error("Tract {tract_id} has no geometry")]
    MissingGeometry {
        /// Tract identifier.
        tract_id: String,
    },

    /// A feature's geometry is not polygonal.
    #[error("Tract {tract_id} has unsupported geometry type {kind}")]
    UnsupportedGeometry {
        /// Tract identifier.
        tract_id: String,
        /// The geometry type found.
        kind: String,
    },

    /// A feature's geometry has no area to take a centroid of.
    #[error("Tract {tract_id} has an empty geometry")]
    EmptyGeometry {
        /// Tract identifier.
        tract_id: String,
    },

    /// Two features share a tract identifier.
    #[error("Duplicate tract identifier {tract_id}")]
    DuplicateTractId {
        /// The repeated identifier.
        tract_id: String,
    },

    /// The source coordinate reference system is not recognized.
    #[error("Unsupported coordinate reference system: {crs}")]
    UnknownCrs {
        /// The CRS as given.
        crs: String,
    },

    /// The PROJ transform failed.
    #[error("Projection error: {message}")]
    Projection {
        /// Description of what went wrong.
        message: String,
    },
}
