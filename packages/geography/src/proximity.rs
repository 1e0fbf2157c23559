//! Radius filtering by geodesic distance.
//!
//! Distances are measured on the WGS84 ellipsoid from the query center to
//! each item's representative point and attached to a per-query
//! [`Nearby`] wrapper. The shared items are only borrowed, never modified.

use geo::{Distance as _, Geodesic};
use student_map_geography_models::{LatLon, Located};

/// Meters in a statute mile.
pub const METERS_PER_MILE: f64 = 1_609.344;

/// Geodesic distance between two coordinates in miles.
#[must_use]
pub fn distance_miles(from: LatLon, to: LatLon) -> f64 {
    Geodesic.distance(from.to_point(), to.to_point()) / METERS_PER_MILE
}

/// An item that passed the radius filter, with its distance from the
/// query center when there was one.
#[derive(Debug)]
pub struct Nearby<'a, T> {
    /// The borrowed item.
    pub item: &'a T,
    /// Miles from the center; `None` when no center was given.
    pub distance_miles: Option<f64>,
}

impl<T> Clone for Nearby<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Nearby<'_, T> {}

impl<T: Located> Located for Nearby<'_, T> {
    fn representative_point(&self) -> LatLon {
        self.item.representative_point()
    }
}

/// Keeps the items whose representative point lies within `radius_miles`
/// of `center` (inclusive), in input order.
///
/// With no center every item is returned unchanged and in order. A
/// non-finite or non-positive radius keeps nothing when a center is given.
#[must_use]
pub fn filter_within<T: Located>(
    items: &[T],
    center: Option<LatLon>,
    radius_miles: f64,
) -> Vec<Nearby<'_, T>> {
    let Some(center) = center else {
        return items
            .iter()
            .map(|item| Nearby {
                item,
                distance_miles: None,
            })
            .collect();
    };

    if !radius_miles.is_finite() || radius_miles <= 0.0 {
        log::warn!("Ignoring non-positive radius {radius_miles}");
        return Vec::new();
    }

    let kept: Vec<Nearby<'_, T>> = items
        .iter()
        .filter_map(|item| {
            let distance = distance_miles(center, item.representative_point());
            (distance <= radius_miles).then_some(Nearby {
                item,
                distance_miles: Some(distance),
            })
        })
        .collect();

    log::debug!(
        "{} of {} items within {radius_miles} mi of ({}, {})",
        kept.len(),
        items.len(),
        center.latitude,
        center.longitude
    );

    kept
}
