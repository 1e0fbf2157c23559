//! Nominatim / OpenStreetMap geocoder client.
//!
//! Free-form search against the public instance, which allows at most one
//! request per second and requires an identifying `User-Agent`.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use student_map_geography_models::LatLon;

use crate::{GeocodeError, Geocoder, GeocoderConfig};

/// The public Nominatim search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Geocodes addresses with a Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Builds a client with the configured user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<LatLon>, GeocodeError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<LatLon>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    if let Some(display_name) = first["display_name"].as_str() {
        log::debug!("Nominatim matched '{display_name}'");
    }

    Ok(Some(LatLon::new(lat, lon)))
}
