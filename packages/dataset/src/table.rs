//! The merged, immutable tract table.

use std::collections::BTreeSet;

use student_map_analytics::aggregate::aggregate;
use student_map_analytics::report::format_report;
use student_map_analytics_models::{Granularity, ReportRow};
use student_map_demographics::estimate::estimate;
use student_map_demographics::join::{DroppedTract, JoinedTract, join};
use student_map_demographics::loader::DemographicTables;
use student_map_geography::store::GeometryStore;
use student_map_geography_models::TractGeometry;
use student_map_neighborhood::mapper::{AssignmentConflict, NeighborhoodMapper};
use student_map_neighborhood::registry;
use student_map_neighborhood_models::NeighborhoodTractMap;
use student_map_tract_models::Tract;

use crate::{DataConfig, DataLoadError};

/// Every tract with its demographics, estimate and neighborhood.
///
/// Built once and shared read-only between queries.
#[derive(Debug, Clone)]
pub struct TractTable {
    tracts: Vec<Tract>,
    dropped: Vec<DroppedTract>,
    unmapped: Vec<String>,
    conflicts: Vec<AssignmentConflict>,
    neighborhoods: NeighborhoodTractMap,
}

impl TractTable {
    /// Loads and merges every configured source.
    ///
    /// # Errors
    ///
    /// Returns [`DataLoadError`] if any source is missing or malformed.
    pub fn load(config: &DataConfig) -> Result<Self, DataLoadError> {
        let store = GeometryStore::load(&config.geometry)?;
        let tables = DemographicTables::load(&config.demographics)?;
        let neighborhoods = registry::load(&config.neighborhoods)?;

        let table = Self::from_parts(store.into_tracts(), &tables, neighborhoods);

        log::info!(
            "Tract table ready: {} tracts, {} dropped by the join, {} without a listed neighborhood",
            table.len(),
            table.dropped.len(),
            table.unmapped.len()
        );

        Ok(table)
    }

    /// Merges already-loaded sources.
    #[must_use]
    pub fn from_parts(
        geometry: Vec<TractGeometry>,
        tables: &DemographicTables,
        neighborhoods: NeighborhoodTractMap,
    ) -> Self {
        let outcome = join(geometry, tables);
        let mapper = NeighborhoodMapper::new(&neighborhoods);
        let shared = shared_unmapped_names(&outcome.tracts, &mapper);

        let tracts: Vec<Tract> = outcome
            .tracts
            .into_iter()
            .map(|t| merge(t, &mapper, &shared))
            .collect();

        let unmapped: Vec<String> = tracts
            .iter()
            .filter(|t| mapper.neighborhood_of(&t.name).is_none())
            .map(|t| t.neighborhood.clone())
            .collect();

        for label in &unmapped {
            log::debug!("Tract {label} is not listed in any neighborhood");
        }

        Self {
            tracts,
            dropped: outcome.dropped,
            unmapped,
            conflicts: mapper.conflicts().to_vec(),
            neighborhoods,
        }
    }

    /// All tracts in boundary-file order.
    #[must_use]
    pub fn tracts(&self) -> &[Tract] {
        &self.tracts
    }

    /// Number of tracts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracts.len()
    }

    /// Whether the table has no tracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }

    /// Tracts left out because a demographic source lacked them.
    #[must_use]
    pub fn dropped(&self) -> &[DroppedTract] {
        &self.dropped
    }

    /// Labels of tracts no neighborhood lists: the tract name, or the
    /// tract identifier when another unlisted tract has the same name.
    #[must_use]
    pub fn unmapped(&self) -> &[String] {
        &self.unmapped
    }

    /// Tracts listed under more than one neighborhood.
    #[must_use]
    pub fn conflicts(&self) -> &[AssignmentConflict] {
        &self.conflicts
    }

    /// The neighborhood lookup table in use.
    #[must_use]
    pub const fn neighborhoods(&self) -> &NeighborhoodTractMap {
        &self.neighborhoods
    }

    /// The whole table by neighborhood, largest total first.
    #[must_use]
    pub fn city_summary(&self) -> Vec<ReportRow> {
        format_report(&aggregate(&self.tracts, Granularity::Neighborhood))
    }
}

fn tract_name(geometry: &TractGeometry) -> &str {
    if geometry.name.trim().is_empty() {
        &geometry.tract_id
    } else {
        &geometry.name
    }
}

/// Names carried by more than one unlisted tract. Those tracts are labeled
/// by identifier so that each stays its own region.
fn shared_unmapped_names(tracts: &[JoinedTract], mapper: &NeighborhoodMapper) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut shared = BTreeSet::new();

    for name in mapper.unmapped(tracts.iter().map(|t| tract_name(&t.geometry))) {
        let name = name.trim();
        if !seen.insert(name) && shared.insert(name.to_string()) {
            log::warn!("Several unlisted tracts are named {name}; labeling them by identifier");
        }
    }

    shared
}

fn merge(joined: JoinedTract, mapper: &NeighborhoodMapper, shared: &BTreeSet<String>) -> Tract {
    let name = tract_name(&joined.geometry).to_string();
    let JoinedTract {
        geometry,
        demographics,
    } = joined;
    let TractGeometry {
        tract_id,
        boundary,
        representative_point,
        ..
    } = geometry;

    let neighborhood = if shared.contains(name.trim()) {
        tract_id.clone()
    } else {
        mapper.assign(&name)
    };

    Tract {
        neighborhood,
        estimate: estimate(&demographics),
        tract_id,
        name,
        boundary,
        representative_point,
        demographics,
    }
}
