//! Tract boundary loading.
//!
//! Parses a `GeoJSON` `FeatureCollection` of census tracts, reprojects
//! every boundary to EPSG:4326, and computes each tract's centroid once.
//! Duplicate identifiers are a hard error: they would make every later
//! join ambiguous.

use std::collections::BTreeSet;
use std::path::Path;

use geo::{Centroid as _, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use student_map_geography_models::{
    GeometrySourceConfig, LatLon, TractGeometry, normalize_tract_key,
};

use crate::GeoError;
use crate::projection::{CrsSpec, EPSG_WGS84, Reprojector};

/// Tract boundaries in source order, reprojected and with centroids.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    tracts: Vec<TractGeometry>,
}

impl GeometryStore {
    /// Reads and parses the boundary file named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the file is missing or unreadable, or if
    /// [`Self::from_geojson_str`] rejects its contents.
    pub fn load(config: &GeometrySourceConfig) -> Result<Self, GeoError> {
        log::info!("Loading tract boundaries from {}", config.path.display());
        let contents = read_to_string(&config.path)?;
        let store = Self::from_geojson_str(&contents, config)?;
        log::info!(
            "Loaded {} tract boundaries from {}",
            store.len(),
            config.path.display()
        );
        Ok(store)
    }

    /// Parses boundaries from `GeoJSON` text.
    ///
    /// The CRS is taken from `config.source_crs`, else from the legacy
    /// `crs` member of the collection, else EPSG:4326.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] for invalid JSON, a non-collection root, a
    /// feature without identifier or polygonal geometry, an unknown CRS, a
    /// failed transform, or a duplicate tract identifier.
    pub fn from_geojson_str(contents: &str, config: &GeometrySourceConfig) -> Result<Self, GeoError> {
        let GeoJson::FeatureCollection(collection) = contents.parse::<GeoJson>()? else {
            return Err(GeoError::NotFeatureCollection);
        };

        let crs = resolve_crs(config, &collection)?;
        let reprojector = Reprojector::to_wgs84(&crs)?;
        log::debug!("Boundary source CRS {crs:?} (identity: {})", reprojector.is_identity());

        let mut seen = BTreeSet::new();
        let mut tracts = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.into_iter().enumerate() {
            let tract = parse_feature(index, feature, config, &reprojector)?;
            if !seen.insert(tract.tract_id.clone()) {
                return Err(GeoError::DuplicateTractId {
                    tract_id: tract.tract_id,
                });
            }
            tracts.push(tract);
        }

        Ok(Self { tracts })
    }

    /// Builds a store from already-projected geometry (EPSG:4326).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] on an empty boundary or a duplicate identifier.
    pub fn from_boundaries(
        boundaries: impl IntoIterator<Item = (String, String, MultiPolygon<f64>)>,
    ) -> Result<Self, GeoError> {
        let mut seen = BTreeSet::new();
        let mut tracts = Vec::new();

        for (raw_id, name, boundary) in boundaries {
            let tract_id = normalize_tract_key(&raw_id);
            let representative_point = centroid_of(&tract_id, &boundary)?;
            if !seen.insert(tract_id.clone()) {
                return Err(GeoError::DuplicateTractId { tract_id });
            }
            tracts.push(TractGeometry {
                tract_id,
                name,
                boundary,
                representative_point,
            });
        }

        Ok(Self { tracts })
    }

    /// All tracts in source order.
    #[must_use]
    pub fn tracts(&self) -> &[TractGeometry] {
        &self.tracts
    }

    /// Consumes the store, yielding its tracts.
    #[must_use]
    pub fn into_tracts(self) -> Vec<TractGeometry> {
        self.tracts
    }

    /// Number of tracts loaded.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tracts.len()
    }

    /// Whether no tracts were loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }
}

fn read_to_string(path: &Path) -> Result<String, GeoError> {
    std::fs::read_to_string(path).map_err(|source| GeoError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn resolve_crs(
    config: &GeometrySourceConfig,
    collection: &FeatureCollection,
) -> Result<CrsSpec, GeoError> {
    if let Some(crs) = &config.source_crs {
        return CrsSpec::parse(crs);
    }

    // {"crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::4269"}}}
    let named = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(JsonValue::as_str);

    named.map_or(Ok(CrsSpec::Epsg(EPSG_WGS84)), CrsSpec::parse)
}

fn parse_feature(
    index: usize,
    feature: Feature,
    config: &GeometrySourceConfig,
    reprojector: &Reprojector,
) -> Result<TractGeometry, GeoError> {
    let properties = feature.properties.as_ref();

    let tract_id = property_string(properties, &config.id_field)
        .map(|raw| normalize_tract_key(&raw))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GeoError::MissingProperty {
            index,
            field: config.id_field.clone(),
        })?;

    let name = config
        .name_field
        .as_deref()
        .and_then(|field| property_string(properties, field))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| tract_id.clone());

    let Some(geometry) = feature.geometry else {
        return Err(GeoError::MissingGeometry { tract_id });
    };

    let source_boundary = match geo::Geometry::<f64>::try_from(geometry)? {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        other => {
            return Err(GeoError::UnsupportedGeometry {
                tract_id,
                kind: geometry_kind(&other).to_string(),
            });
        }
    };

    let boundary = reprojector.reproject(&source_boundary)?;
    let representative_point = centroid_of(&tract_id, &boundary)?;

    log::trace!("Parsed tract {tract_id} ({name}) at {representative_point:?}");

    Ok(TractGeometry {
        tract_id,
        name,
        boundary,
        representative_point,
    })
}

/// Reads a property as text. Numbers are rendered in their JSON form so
/// numeric identifiers survive.
fn property_string(properties: Option<&JsonObject>, field: &str) -> Option<String> {
    match properties?.get(field)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn centroid_of(tract_id: &str, boundary: &MultiPolygon<f64>) -> Result<LatLon, GeoError> {
    if boundary.0.is_empty() {
        return Err(GeoError::EmptyGeometry {
            tract_id: tract_id.to_string(),
        });
    }
    boundary
        .centroid()
        .map(LatLon::from)
        .ok_or_else(|| GeoError::EmptyGeometry {
            tract_id: tract_id.to_string(),
        })
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}
