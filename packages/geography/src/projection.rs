//! Reprojection of boundary geometry to EPSG:4326.
//!
//! Uses `proj4rs` (pure Rust PROJ.4) so the transform is the standard
//! datum/projection math rather than an approximation. Geographic CRSs are
//! handled in radians internally, which is what `proj4rs` expects.

use geo::{Coord, MapCoords as _, MultiPolygon};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::GeoError;

/// WGS84 longitude/latitude.
pub const EPSG_WGS84: u32 = 4326;

/// NAD83 longitude/latitude, the CRS of Census TIGER/Line files.
pub const EPSG_NAD83: u32 = 4269;

/// Web Mercator.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Returns the PROJ definition for the EPSG codes this crate knows.
#[must_use]
pub const fn proj_string(epsg: u32) -> Option<&'static str> {
    match epsg {
        EPSG_WGS84 => Some(WGS84_PROJ),
        EPSG_NAD83 => Some("+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs"),
        EPSG_WEB_MERCATOR => Some(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
        ),
        // NAD83 / Ohio South (ftUS)
        3735 => Some(
            "+proj=lcc +lat_0=38 +lon_0=-82.5 +lat_1=40.0333333333333 +lat_2=38.7333333333333 \
             +x_0=600000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=us-ft +no_defs",
        ),
        // NAD83 / Ohio South (m)
        2834 => Some(
            "+proj=lcc +lat_0=38 +lon_0=-82.5 +lat_1=40.0333333333333 +lat_2=38.7333333333333 \
             +x_0=600000 +y_0=0 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
        ),
        _ => None,
    }
}

/// A parsed coordinate reference system reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrsSpec {
    /// An EPSG code.
    Epsg(u32),
    /// A raw PROJ definition string.
    Proj(String),
}

impl CrsSpec {
    /// Parses `"EPSG:4269"`, OGC URNs (`urn:ogc:def:crs:EPSG::4269`,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`), or a raw `+proj=` string.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnknownCrs`] if the string is none of those.
    pub fn parse(crs: &str) -> Result<Self, GeoError> {
        let trimmed = crs.trim();

        if trimmed.starts_with("+proj=") {
            return Ok(Self::Proj(trimmed.to_string()));
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Self::Epsg(EPSG_WGS84));
        }

        upper
            .rsplit(':')
            .next()
            .filter(|_| upper.contains("EPSG"))
            .and_then(|code| code.parse::<u32>().ok())
            .map(Self::Epsg)
            .ok_or_else(|| GeoError::UnknownCrs {
                crs: crs.to_string(),
            })
    }

    fn definition(&self) -> Result<&str, GeoError> {
        match self {
            Self::Epsg(code) => proj_string(*code).ok_or_else(|| GeoError::UnknownCrs {
                crs: format!("EPSG:{code}"),
            }),
            Self::Proj(definition) => Ok(definition),
        }
    }

    const fn is_wgs84(&self) -> bool {
        matches!(self, Self::Epsg(EPSG_WGS84))
    }
}

/// Transforms coordinates from a source CRS to EPSG:4326.
pub struct Reprojector {
    /// `None` when the source already is EPSG:4326.
    projs: Option<(Proj, Proj)>,
    source_is_geographic: bool,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("identity", &self.projs.is_none())
            .field("source_is_geographic", &self.source_is_geographic)
            .finish_non_exhaustive()
    }
}

impl Reprojector {
    /// Builds a transformer from `source` to WGS84.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if the source CRS is unknown or its PROJ
    /// definition is rejected.
    pub fn to_wgs84(source: &CrsSpec) -> Result<Self, GeoError> {
        if source.is_wgs84() {
            return Ok(Self {
                projs: None,
                source_is_geographic: true,
            });
        }

        let definition = source.definition()?;
        let source_proj = Proj::from_proj_string(definition).map_err(|e| GeoError::Projection {
            message: format!("invalid source projection '{definition}': {e:?}"),
        })?;
        let target_proj = Proj::from_proj_string(WGS84_PROJ).map_err(|e| GeoError::Projection {
            message: format!("invalid target projection: {e:?}"),
        })?;

        Ok(Self {
            projs: Some((source_proj, target_proj)),
            source_is_geographic: is_geographic(definition),
        })
    }

    /// Whether coordinates pass through unchanged.
    #[must_use]
    pub const fn is_identity(&self) -> bool {
        self.projs.is_none()
    }

    /// Transforms a single coordinate (x = easting/longitude).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] if the transform fails.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>, GeoError> {
        let Some((source, target)) = &self.projs else {
            return Ok(coord);
        };

        let mut point = if self.source_is_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(source, target, &mut point).map_err(|e| GeoError::Projection {
            message: format!("transform of ({}, {}) failed: {e:?}", coord.x, coord.y),
        })?;

        Ok(Coord {
            x: point.0.to_degrees(),
            y: point.1.to_degrees(),
        })
    }

    /// Transforms every vertex of a multi-polygon.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Projection`] if any vertex fails to transform.
    pub fn reproject(&self, geometry: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, GeoError> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }
}

fn is_geographic(definition: &str) -> bool {
    definition.contains("+proj=longlat") || definition.contains("+proj=latlong")
}

#[cfg(test)]
mod tests {
    use super::*;

    const EARTH_RADIUS_M: f64 = 6_378_137.0;

    #[test]
    fn parses_common_crs_forms() {
        assert_eq!(CrsSpec::parse("EPSG:4269").unwrap(), CrsSpec::Epsg(4269));
        assert_eq!(CrsSpec::parse("epsg:3857").unwrap(), CrsSpec::Epsg(3857));
        assert_eq!(
            CrsSpec::parse("urn:ogc:def:crs:EPSG::4269").unwrap(),
            CrsSpec::Epsg(4269)
        );
        assert_eq!(
            CrsSpec::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(),
            CrsSpec::Epsg(4326)
        );
        assert!(matches!(
            CrsSpec::parse("+proj=longlat +datum=WGS84").unwrap(),
            CrsSpec::Proj(_)
        ));
    }

    #[test]
    fn rejects_unknown_crs() {
        assert!(matches!(
            CrsSpec::parse("not a crs"),
            Err(GeoError::UnknownCrs { .. })
        ));
        let unknown_code = CrsSpec::parse("EPSG:999999").unwrap();
        assert!(matches!(
            Reprojector::to_wgs84(&unknown_code),
            Err(GeoError::UnknownCrs { .. })
        ));
    }

    #[test]
    fn wgs84_is_identity() {
        let reprojector = Reprojector::to_wgs84(&CrsSpec::Epsg(EPSG_WGS84)).unwrap();
        assert!(reprojector.is_identity());
        let c = reprojector
            .transform_coord(Coord {
                x: -84.512,
                y: 39.1031,
            })
            .unwrap();
        assert!((c.x - -84.512).abs() < f64::EPSILON);
        assert!((c.y - 39.1031).abs() < f64::EPSILON);
    }

    #[test]
    fn web_mercator_matches_closed_form_inverse() {
        let reprojector = Reprojector::to_wgs84(&CrsSpec::Epsg(EPSG_WEB_MERCATOR)).unwrap();
        let (x, y) = (-9_407_000.0_f64, 4_737_000.0_f64);
        let c = reprojector.transform_coord(Coord { x, y }).unwrap();

        let expected_lon = (x / EARTH_RADIUS_M).to_degrees();
        let expected_lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan()
            - std::f64::consts::FRAC_PI_2)
            .to_degrees();

        assert!((c.x - expected_lon).abs() < 1e-7, "lon {}", c.x);
        assert!((c.y - expected_lat).abs() < 1e-7, "lat {}", c.y);
    }

    #[test]
    fn nad83_is_within_a_hair_of_wgs84() {
        let reprojector = Reprojector::to_wgs84(&CrsSpec::Epsg(EPSG_NAD83)).unwrap();
        assert!(!reprojector.is_identity());
        let c = reprojector
            .transform_coord(Coord {
                x: -84.512,
                y: 39.1031,
            })
            .unwrap();
        assert!((c.x - -84.512).abs() < 1e-6);
        assert!((c.y - 39.1031).abs() < 1e-6);
    }

    #[test]
    fn reprojects_every_vertex() {
        let reprojector = Reprojector::to_wgs84(&CrsSpec::Epsg(EPSG_WEB_MERCATOR)).unwrap();
        let square = geo::Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: 111_319.490_793_273_6,
                y: 111_325.142_866_385_1,
            },
        )
        .to_polygon();
        let out = reprojector.reproject(&MultiPolygon(vec![square])).unwrap();
        let max_x = out.0[0]
            .exterior()
            .coords()
            .map(|c| c.x)
            .fold(f64::MIN, f64::max);
        let max_y = out.0[0]
            .exterior()
            .coords()
            .map(|c| c.y)
            .fold(f64::MIN, f64::max);
        assert!((max_x - 1.0).abs() < 1e-6, "max lon {max_x}");
        assert!((max_y - 1.0).abs() < 1e-6, "max lat {max_y}");
    }
}
