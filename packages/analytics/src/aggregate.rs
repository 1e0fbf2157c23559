//! Grouping tracts into map regions.

use std::collections::BTreeMap;

use geo::{BooleanOps as _, MultiPolygon};
use student_map_analytics_models::{AggregatedRegion, Granularity};
use student_map_demographics_models::StudentEstimate;
use student_map_geography::proximity::Nearby;
use student_map_tract_models::Tract;

/// Anything that can be turned into a map region.
pub trait RegionSource {
    /// Stable identifier used as the tract-level label and to order group
    /// members before their geometry is merged.
    fn region_key(&self) -> &str;

    /// Label of the neighborhood this item belongs to.
    fn neighborhood_label(&self) -> &str;

    /// Boundary in longitude/latitude.
    fn geometry(&self) -> &MultiPolygon<f64>;

    /// Potential-student figures.
    fn estimate(&self) -> StudentEstimate;

    /// Number of tracts the item covers.
    fn tract_count(&self) -> usize;
}

impl RegionSource for Tract {
    fn region_key(&self) -> &str {
        &self.tract_id
    }

    fn neighborhood_label(&self) -> &str {
        &self.neighborhood
    }

    fn geometry(&self) -> &MultiPolygon<f64> {
        &self.boundary
    }

    fn estimate(&self) -> StudentEstimate {
        self.estimate
    }

    fn tract_count(&self) -> usize {
        1
    }
}

impl RegionSource for AggregatedRegion {
    fn region_key(&self) -> &str {
        &self.label
    }

    fn neighborhood_label(&self) -> &str {
        self.neighborhood.as_deref().unwrap_or(&self.label)
    }

    fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    fn estimate(&self) -> StudentEstimate {
        self.estimate
    }

    fn tract_count(&self) -> usize {
        self.tract_count
    }
}

impl<T: RegionSource> RegionSource for Nearby<'_, T> {
    fn region_key(&self) -> &str {
        self.item.region_key()
    }

    fn neighborhood_label(&self) -> &str {
        self.item.neighborhood_label()
    }

    fn geometry(&self) -> &MultiPolygon<f64> {
        self.item.geometry()
    }

    fn estimate(&self) -> StudentEstimate {
        self.item.estimate()
    }

    fn tract_count(&self) -> usize {
        self.item.tract_count()
    }
}

/// Builds map regions at the requested granularity.
///
/// Tract granularity yields one region per item in input order.
/// Neighborhood granularity yields one region per distinct neighborhood
/// label, ordered by label, with member geometry unioned and each metric
/// summed skipping NaN.
#[must_use]
pub fn aggregate<S: RegionSource>(items: &[S], granularity: Granularity) -> Vec<AggregatedRegion> {
    match granularity {
        Granularity::Tract => items.iter().map(tract_region).collect(),
        Granularity::Neighborhood => by_neighborhood(items),
    }
}

fn tract_region<S: RegionSource>(item: &S) -> AggregatedRegion {
    AggregatedRegion {
        label: item.region_key().to_string(),
        neighborhood: Some(item.neighborhood_label().to_string()),
        geometry: item.geometry().clone(),
        estimate: item.estimate(),
        tract_count: item.tract_count(),
    }
}

fn by_neighborhood<S: RegionSource>(items: &[S]) -> Vec<AggregatedRegion> {
    let mut groups: BTreeMap<&str, Vec<&S>> = BTreeMap::new();
    for item in items {
        groups
            .entry(item.neighborhood_label())
            .or_default()
            .push(item);
    }

    let regions: Vec<AggregatedRegion> = groups
        .into_iter()
        .map(|(label, mut members)| {
            members.sort_by(|a, b| a.region_key().cmp(b.region_key()));

            let estimates: Vec<StudentEstimate> = members.iter().map(|m| m.estimate()).collect();

            AggregatedRegion {
                label: label.to_string(),
                neighborhood: None,
                geometry: union_all(&members),
                estimate: StudentEstimate::sum_skipping_nan(&estimates),
                tract_count: members.iter().map(|m| m.tract_count()).sum(),
            }
        })
        .collect();

    log::debug!(
        "Aggregated {} items into {} neighborhoods",
        items.len(),
        regions.len()
    );

    regions
}

fn union_all<S: RegionSource>(members: &[&S]) -> MultiPolygon<f64> {
    let Some((first, rest)) = members.split_first() else {
        return MultiPolygon(Vec::new());
    };

    let mut merged = first.geometry().clone();
    for member in rest {
        merged = merged.union(member.geometry());
    }
    merged
}
