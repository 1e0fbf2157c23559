//! One potential-student query against the tract table.
//!
//! [`run_query`] geocodes the address (once, under a deadline) and hands
//! the result to [`execute`], which is synchronous and pure: filter by
//! radius, aggregate, format, style. A failed lookup never fails the
//! query; it shows all data around the default center with a notice.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use student_map_analytics::aggregate::aggregate;
use student_map_analytics::heat::style_regions;
use student_map_analytics::report::{format_report, summarize};
use student_map_analytics_models::{
    AggregatedRegion, Granularity, HeatLegend, Metric, RegionStyle, ReportRow, Totals,
};
use student_map_geocoder::{Geocoder, resolve_bounded};
use student_map_geography::proximity::filter_within;
use student_map_geography_models::LatLon;
use thiserror::Error;

use crate::table::TractTable;

/// Smallest accepted search radius.
pub const MIN_RADIUS_MILES: u32 = 1;

/// Largest accepted search radius.
pub const MAX_RADIUS_MILES: u32 = 20;

/// Radius used when none is given.
pub const DEFAULT_RADIUS_MILES: u32 = 3;

/// Errors that reject a query before it runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The radius is outside the accepted range.
    #[error("Radius must be between 1 and 20 miles, got {radius_miles}")]
    RadiusOutOfRange {
        /// The radius as given.
        radius_miles: u32,
    },
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    /// Free-form address to center the search on.
    pub address: Option<String>,
    /// Search radius in miles.
    pub radius_miles: u32,
    /// Tract or neighborhood regions.
    pub granularity: Granularity,
    /// Which figure drives shading.
    pub metric: Metric,
    /// Whether to shade regions by `metric`.
    pub show_heat_overlay: bool,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            address: None,
            radius_miles: DEFAULT_RADIUS_MILES,
            granularity: Granularity::default(),
            metric: Metric::default(),
            show_heat_overlay: true,
        }
    }
}

impl StudentQuery {
    /// Checks the radius range.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RadiusOutOfRange`] outside
    /// [`MIN_RADIUS_MILES`]..=[`MAX_RADIUS_MILES`].
    pub const fn validate(&self) -> Result<(), QueryError> {
        if self.radius_miles < MIN_RADIUS_MILES || self.radius_miles > MAX_RADIUS_MILES {
            return Err(QueryError::RadiusOutOfRange {
                radius_miles: self.radius_miles,
            });
        }
        Ok(())
    }

    /// The trimmed address, or `None` when blank.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// Where the map center came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterSource {
    /// The geocoded address.
    Geocoded,
    /// The configured default.
    Default,
}

/// A non-fatal condition worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// The address could not be located; all data is shown.
    GeocodeFailed {
        /// The address as given.
        address: String,
    },
    /// No tract lies within the radius of the located address.
    NoTractsInRadius {
        /// The radius searched.
        radius_miles: u32,
    },
}

impl Notice {
    /// User-facing text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::GeocodeFailed { .. } => {
                "Could not geocode address; showing all data.".to_string()
            }
            Self::NoTractsInRadius { radius_miles } => {
                format!("No tracts found within {radius_miles} miles of the address.")
            }
        }
    }
}

/// Shading for the returned regions.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatRendering {
    /// One style per region, in region order.
    pub styles: Vec<RegionStyle>,
    /// Legend, when the overlay is on and some value is present.
    pub legend: Option<HeatLegend>,
}

/// Everything needed to draw the map and the table.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Map center.
    pub center: LatLon,
    /// Where `center` came from.
    pub center_source: CenterSource,
    /// Granularity the regions were built at.
    pub granularity: Granularity,
    /// Map regions.
    pub regions: Vec<AggregatedRegion>,
    /// Table rows, largest total first.
    pub rows: Vec<ReportRow>,
    /// Sums over `regions`.
    pub totals: Totals,
    /// Non-fatal conditions.
    pub notices: Vec<Notice>,
    /// Region shading.
    pub heat: HeatRendering,
}

/// Settings that apply to every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuerySettings {
    /// Center when there is no located address.
    pub default_center: LatLon,
    /// Deadline for the geocoder.
    pub geocode_timeout: Duration,
}

/// Runs a query given the already-resolved location of its address.
///
/// `located` is `None` when there was no address or it could not be
/// geocoded; the radius filter is skipped and every tract is used. A query
/// without an address always uses the neighborhood view.
///
/// # Errors
///
/// Returns [`QueryError`] if the query is invalid.
pub fn execute(
    table: &TractTable,
    query: &StudentQuery,
    located: Option<LatLon>,
    default_center: LatLon,
) -> Result<QueryResult, QueryError> {
    query.validate()?;

    let mut notices = Vec::new();
    let located = query.address().and(located);

    if let (Some(address), None) = (query.address(), located) {
        notices.push(Notice::GeocodeFailed {
            address: address.to_string(),
        });
    }

    let granularity = if query.address().is_some() {
        query.granularity
    } else {
        Granularity::Neighborhood
    };

    let nearby = filter_within(table.tracts(), located, f64::from(query.radius_miles));
    if located.is_some() && nearby.is_empty() {
        notices.push(Notice::NoTractsInRadius {
            radius_miles: query.radius_miles,
        });
    }

    let regions = aggregate(&nearby, granularity);
    let rows = format_report(&regions);
    let totals = summarize(&regions);
    let (styles, legend) = style_regions(&regions, query.metric, query.show_heat_overlay);

    log::info!(
        "Query ({} mi, {}, {}): {} tracts into {} regions",
        query.radius_miles,
        granularity,
        query.metric,
        nearby.len(),
        regions.len()
    );

    Ok(QueryResult {
        center: located.unwrap_or(default_center),
        center_source: if located.is_some() {
            CenterSource::Geocoded
        } else {
            CenterSource::Default
        },
        granularity,
        regions,
        rows,
        totals,
        notices,
        heat: HeatRendering { styles, legend },
    })
}

/// Geocodes the query's address, then runs it.
///
/// # Errors
///
/// Returns [`QueryError`] if the query is invalid. Geocoding problems are
/// reported as a [`Notice`], not an error.
pub async fn run_query(
    table: &TractTable,
    geocoder: &dyn Geocoder,
    query: &StudentQuery,
    settings: &QuerySettings,
) -> Result<QueryResult, QueryError> {
    query.validate()?;

    let located = match query.address() {
        Some(address) => resolve_bounded(geocoder, address, settings.geocode_timeout).await,
        None => None,
    };

    execute(table, query, located, settings.default_center)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use student_map_geocoder::GeocodeError;

    use super::*;
    use crate::DEFAULT_CENTER;
    use crate::table::tests::scenario_table;

    struct Failing;

    #[async_trait]
    impl Geocoder for Failing {
        async fn resolve(&self, _address: &str) -> Result<Option<LatLon>, GeocodeError> {
            Err(GeocodeError::Parse {
                message: "boom".to_string(),
            })
        }
    }

    struct Fixed(LatLon);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn resolve(&self, _address: &str) -> Result<Option<LatLon>, GeocodeError> {
            Ok(Some(self.0))
        }
    }

    /// Between tracts A and B of the scenario.
    const DOWNTOWN: LatLon = LatLon::new(39.125, -84.25);

    fn settings() -> QuerySettings {
        QuerySettings {
            default_center: DEFAULT_CENTER,
            geocode_timeout: Duration::from_secs(1),
        }
    }

    fn query(address: Option<&str>, granularity: Granularity) -> StudentQuery {
        StudentQuery {
            address: address.map(str::to_string),
            radius_miles: 10,
            granularity,
            ..StudentQuery::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn rejects_radius_outside_range() {
        let table = scenario_table();
        for radius_miles in [0, 21] {
            let q = StudentQuery {
                radius_miles,
                ..StudentQuery::default()
            };
            assert_eq!(
                execute(&table, &q, None, DEFAULT_CENTER),
                Err(QueryError::RadiusOutOfRange { radius_miles })
            );
        }
        for radius_miles in [MIN_RADIUS_MILES, MAX_RADIUS_MILES] {
            let q = StudentQuery {
                radius_miles,
                ..StudentQuery::default()
            };
            assert!(q.validate().is_ok());
        }
    }

    #[test]
    fn no_address_uses_every_tract_and_default_center() {
        let table = scenario_table();
        let result = execute(
            &table,
            &query(None, Granularity::Neighborhood),
            None,
            DEFAULT_CENTER,
        )
        .unwrap();

        assert_eq!(result.center, DEFAULT_CENTER);
        assert_eq!(result.center_source, CenterSource::Default);
        assert!(result.notices.is_empty());
        assert_eq!(result.totals.tract_count, 3);
        assert!(close(result.totals.estimate.total, 12.0));
    }

    #[test]
    fn no_address_forces_neighborhood_view() {
        let table = scenario_table();
        let result = execute(
            &table,
            &query(None, Granularity::Tract),
            None,
            DEFAULT_CENTER,
        )
        .unwrap();

        assert_eq!(result.granularity, Granularity::Neighborhood);
        let labels: Vec<&str> = result.regions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["C", "Downtown"]);
    }

    #[tokio::test]
    async fn failed_geocode_keeps_requested_granularity() {
        let table = scenario_table();
        let q = query(Some("123 Nowhere Lane"), Granularity::Tract);
        let result = run_query(&table, &Failing, &q, &settings()).await.unwrap();
        assert_eq!(result.granularity, Granularity::Tract);
    }

    #[test]
    fn neighborhood_view_of_the_scenario() {
        let table = scenario_table();
        let result = execute(
            &table,
            &query(None, Granularity::Neighborhood),
            None,
            DEFAULT_CENTER,
        )
        .unwrap();

        let labels: Vec<&str> = result.regions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["C", "Downtown"]);
        let downtown = &result.regions[1];
        assert!(close(downtown.estimate.total, 12.0));
        assert!(close(downtown.estimate.white, 8.8));
        assert_eq!(downtown.geometry.0.len(), 1);

        assert_eq!(result.rows[0].label, "Downtown");
        assert_eq!(result.heat.styles.len(), 2);
        assert_eq!(
            result.heat.legend.as_ref().map(|l| l.caption.as_str()),
            Some("Total Students")
        );
    }

    #[test]
    fn located_address_filters_by_radius() {
        let table = scenario_table();
        let result = execute(
            &table,
            &query(Some("Fountain Square"), Granularity::Tract),
            Some(DOWNTOWN),
            DEFAULT_CENTER,
        )
        .unwrap();

        assert_eq!(result.center, DOWNTOWN);
        assert_eq!(result.center_source, CenterSource::Geocoded);
        let labels: Vec<&str> = result.regions.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["A", "B"]);
        assert!(result.notices.is_empty());
    }

    #[test]
    fn empty_radius_result_has_notice_and_zero_totals() {
        let table = scenario_table();
        let result = execute(
            &table,
            &query(Some("Null Island"), Granularity::Neighborhood),
            Some(LatLon::new(0.0, 0.0)),
            DEFAULT_CENTER,
        )
        .unwrap();

        assert!(result.regions.is_empty());
        assert!(result.rows.is_empty());
        assert_eq!(result.totals.region_count, 0);
        assert!(close(result.totals.estimate.total, 0.0));
        assert_eq!(
            result.notices,
            [Notice::NoTractsInRadius { radius_miles: 10 }]
        );
    }

    #[test]
    fn blank_address_is_treated_as_absent() {
        let table = scenario_table();
        let q = query(Some("   "), Granularity::Tract);
        assert_eq!(q.address(), None);

        let result = execute(&table, &q, None, DEFAULT_CENTER).unwrap();
        assert!(result.notices.is_empty());
        assert_eq!(result.granularity, Granularity::Neighborhood);
        assert_eq!(result.regions.len(), 2);
    }

    #[test]
    fn overlay_off_styles_plainly() {
        let table = scenario_table();
        let q = StudentQuery {
            show_heat_overlay: false,
            ..query(None, Granularity::Tract)
        };
        let result = execute(&table, &q, None, DEFAULT_CENTER).unwrap();
        assert!(result.heat.legend.is_none());
        assert!(result.heat.styles.iter().all(|s| s.fill_color == "#3388ff"));
    }

    #[tokio::test]
    async fn failed_geocode_falls_back_to_all_data() {
        let table = scenario_table();
        let q = query(Some("123 Nowhere Lane"), Granularity::Tract);
        let result = run_query(&table, &Failing, &q, &settings()).await.unwrap();

        assert_eq!(result.center, DEFAULT_CENTER);
        assert_eq!(result.center_source, CenterSource::Default);
        assert_eq!(result.regions.len(), 3);
        assert_eq!(
            result.notices,
            [Notice::GeocodeFailed {
                address: "123 Nowhere Lane".to_string()
            }]
        );
        assert_eq!(
            result.notices[0].message(),
            "Could not geocode address; showing all data."
        );
    }

    #[tokio::test]
    async fn geocoded_address_centers_the_map() {
        let table = scenario_table();
        let q = query(Some("Fountain Square"), Granularity::Neighborhood);
        let result = run_query(&table, &Fixed(DOWNTOWN), &q, &settings())
            .await
            .unwrap();

        assert_eq!(result.center, DOWNTOWN);
        assert_eq!(result.regions.len(), 1);
        assert_eq!(result.regions[0].label, "Downtown");
    }

    #[tokio::test]
    async fn invalid_query_is_rejected_before_geocoding() {
        let table = scenario_table();
        let q = StudentQuery {
            radius_miles: 50,
            ..query(Some("Fountain Square"), Granularity::Tract)
        };
        assert_eq!(
            run_query(&table, &Fixed(DOWNTOWN), &q, &settings())
                .await
                .unwrap_err(),
            QueryError::RadiusOutOfRange { radius_miles: 50 }
        );
    }
}
