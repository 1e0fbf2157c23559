//! HTTP handler functions for the student map API.

use actix_web::{HttpResponse, web};
use geojson::{Feature, FeatureCollection, Geometry};
use student_map_dataset::MapConfig;
use student_map_dataset::query::{CenterSource, Notice, QueryResult, StudentQuery, run_query};
use student_map_server_models::{
    ApiConflict, ApiDroppedTract, ApiError, ApiHealth, ApiNeighborhood, ApiNeighborhoods,
    ApiNotice, ApiRegions, RegionQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        tract_count: state.table.len(),
    })
}

/// `GET /api/regions`
///
/// Potential-student regions around an address. Without an address, or
/// when it cannot be geocoded, every tract is returned; without an address
/// the regions are always neighborhoods.
pub async fn regions(
    state: web::Data<AppState>,
    params: web::Query<RegionQueryParams>,
) -> HttpResponse {
    let query = to_query(&params, &state.map);

    match run_query(
        &state.table,
        state.geocoder.as_ref(),
        &query,
        &state.settings,
    )
    .await
    {
        Ok(result) => HttpResponse::Ok().json(to_api_regions(&result)),
        Err(e) => {
            log::warn!("Rejected region query: {e}");
            HttpResponse::BadRequest().json(ApiError {
                error: e.to_string(),
            })
        }
    }
}

/// `GET /api/city-summary`
///
/// Every tract grouped by neighborhood, largest total first.
pub async fn city_summary(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.table.city_summary())
}

/// `GET /api/neighborhoods`
///
/// The neighborhood lookup table with the tracts that did not match it.
pub async fn neighborhoods(state: web::Data<AppState>) -> HttpResponse {
    let table = &state.table;
    let lookup = table.neighborhoods();

    HttpResponse::Ok().json(ApiNeighborhoods {
        id: lookup.id.clone(),
        city: lookup.city.clone(),
        state: lookup.state.clone(),
        neighborhoods: lookup
            .neighborhoods
            .iter()
            .map(|n| ApiNeighborhood {
                name: n.name.clone(),
                tracts: n.tracts.clone(),
            })
            .collect(),
        unmapped: table.unmapped().to_vec(),
        conflicts: table
            .conflicts()
            .iter()
            .map(|c| ApiConflict {
                tract: c.tract.clone(),
                kept: c.kept.clone(),
                ignored: c.ignored.clone(),
            })
            .collect(),
        dropped: table
            .dropped()
            .iter()
            .map(|d| ApiDroppedTract {
                tract_id: d.tract_id.clone(),
                missing: d.missing.clone(),
            })
            .collect(),
    })
}

fn to_query(params: &RegionQueryParams, map: &MapConfig) -> StudentQuery {
    StudentQuery {
        address: params.address.clone(),
        radius_miles: params.radius.unwrap_or(map.default_radius_miles),
        granularity: params.granularity.unwrap_or_default(),
        metric: params.metric.unwrap_or_default(),
        show_heat_overlay: params.heat.unwrap_or(true),
    }
}

fn to_api_regions(result: &QueryResult) -> ApiRegions {
    ApiRegions {
        center: result.center,
        geocoded: result.center_source == CenterSource::Geocoded,
        granularity: result.granularity,
        notices: result.notices.iter().map(to_api_notice).collect(),
        regions: region_features(result),
        rows: result.rows.clone(),
        totals: result.totals,
        legend: result.heat.legend.clone(),
    }
}

fn to_api_notice(notice: &Notice) -> ApiNotice {
    let kind = match notice {
        Notice::GeocodeFailed { .. } => "geocode_failed",
        Notice::NoTractsInRadius { .. } => "no_tracts_in_radius",
    };
    ApiNotice {
        kind: kind.to_string(),
        message: notice.message(),
    }
}

fn region_features(result: &QueryResult) -> FeatureCollection {
    result
        .regions
        .iter()
        .zip(&result.heat.styles)
        .map(|(region, style)| {
            let mut feature = Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&region.geometry))),
                id: None,
                properties: None,
                foreign_members: None,
            };
            feature.set_property("label", region.label.clone());
            feature.set_property("neighborhood", region.neighborhood.clone());
            feature.set_property("tractCount", region.tract_count);
            feature.set_property("total", region.estimate.total);
            feature.set_property("white", region.estimate.white);
            feature.set_property("nonWhite", region.estimate.non_white);
            feature.set_property("fillColor", style.fill_color.clone());
            feature.set_property("fillOpacity", style.fill_opacity);
            feature
        })
        .collect()
}
