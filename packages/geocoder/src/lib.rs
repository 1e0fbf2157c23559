#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address geocoding for the map's query center.
//!
//! The [`Geocoder`] trait is the seam the query layer depends on;
//! [`nominatim::NominatimGeocoder`] is the production implementation.
//! [`resolve_bounded`] makes a single attempt under a deadline and folds
//! every failure into "no location", so a slow or broken geocoder only
//! costs the radius filter, never the query.

pub mod nominatim;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use student_map_geography_models::LatLon;
use thiserror::Error;

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Resolves free-form addresses to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the best match for `address`, or `None` when nothing
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup itself fails.
    async fn resolve(&self, address: &str) -> Result<Option<LatLon>, GeocodeError>;
}

/// Geocoder connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Nominatim search endpoint.
    pub base_url: String,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Deadline for one lookup, in milliseconds.
    pub timeout_ms: u64,
}

impl GeocoderConfig {
    /// The lookup deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: nominatim::DEFAULT_BASE_URL.to_string(),
            user_agent: "student_mapper".to_string(),
            timeout_ms: 3_000,
        }
    }
}

/// Makes one lookup attempt bounded by `timeout`.
///
/// Errors, timeouts and empty results all yield `None`; each is logged.
pub async fn resolve_bounded(
    geocoder: &dyn Geocoder,
    address: &str,
    timeout: Duration,
) -> Option<LatLon> {
    match tokio::time::timeout(timeout, geocoder.resolve(address)).await {
        Ok(Ok(Some(location))) => {
            log::debug!(
                "Geocoded '{address}' to ({}, {})",
                location.latitude,
                location.longitude
            );
            Some(location)
        }
        Ok(Ok(None)) => {
            log::warn!("No geocoding match for '{address}'");
            None
        }
        Ok(Err(e)) => {
            log::warn!("Geocoding '{address}' failed: {e}");
            None
        }
        Err(_) => {
            log::warn!(
                "Geocoding '{address}' timed out after {}ms",
                timeout.as_millis()
            );
            None
        }
    }
}
