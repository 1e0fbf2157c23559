#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region aggregation, report formatting, and heat map styling.
//!
//! Everything here is a pure function of its inputs: tracts (or already
//! aggregated regions) go in, map regions, table rows and fill styles come
//! out.

pub mod aggregate;
pub mod heat;
pub mod report;
