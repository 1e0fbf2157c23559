//! Tract to neighborhood assignment.

use std::collections::BTreeMap;

use student_map_neighborhood_models::NeighborhoodTractMap;

/// A tract listed under more than one neighborhood.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentConflict {
    /// Tract name.
    pub tract: String,
    /// The neighborhood the tract was assigned to (first listing).
    pub kept: String,
    /// A later neighborhood that also lists the tract.
    pub ignored: String,
}

/// Inverse of a [`NeighborhoodTractMap`], built once.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodMapper {
    by_tract: BTreeMap<String, String>,
    conflicts: Vec<AssignmentConflict>,
}

impl NeighborhoodMapper {
    /// Inverts a lookup table. When a tract is listed more than once, the
    /// first neighborhood in table order wins.
    #[must_use]
    pub fn new(table: &NeighborhoodTractMap) -> Self {
        let mut by_tract: BTreeMap<String, String> = BTreeMap::new();
        let mut conflicts = Vec::new();

        for entry in &table.neighborhoods {
            for tract in &entry.tracts {
                let tract = tract.trim();
                match by_tract.get(tract) {
                    Some(kept) if kept == &entry.name => {}
                    Some(kept) => {
                        log::warn!(
                            "Tract {tract} is listed under both {kept} and {}; keeping {kept}",
                            entry.name
                        );
                        conflicts.push(AssignmentConflict {
                            tract: tract.to_string(),
                            kept: kept.clone(),
                            ignored: entry.name.clone(),
                        });
                    }
                    None => {
                        by_tract.insert(tract.to_string(), entry.name.clone());
                    }
                }
            }
        }

        log::debug!(
            "Neighborhood mapper for '{}': {} tracts, {} conflicts",
            table.id,
            by_tract.len(),
            conflicts.len()
        );

        Self {
            by_tract,
            conflicts,
        }
    }

    /// The neighborhood listing this tract, if any.
    #[must_use]
    pub fn neighborhood_of(&self, tract_name: &str) -> Option<&str> {
        self.by_tract.get(tract_name.trim()).map(String::as_str)
    }

    /// The neighborhood label for a tract. Unlisted tracts are labeled
    /// with their own name.
    #[must_use]
    pub fn assign(&self, tract_name: &str) -> String {
        self.neighborhood_of(tract_name)
            .unwrap_or_else(|| tract_name.trim())
            .to_string()
    }

    /// Tracts listed under more than one neighborhood.
    #[must_use]
    pub fn conflicts(&self) -> &[AssignmentConflict] {
        &self.conflicts
    }

    /// The given tract names that no neighborhood lists, in input order.
    pub fn unmapped<'a>(&self, tract_names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        tract_names
            .into_iter()
            .filter(|name| self.neighborhood_of(name).is_none())
            .collect()
    }

    /// Number of distinct tracts in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tract.len()
    }

    /// Whether the table lists no tracts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tract.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use student_map_neighborhood_models::NeighborhoodEntry;

    use super::*;
    use crate::registry;

    fn table(entries: &[(&str, &[&str])]) -> NeighborhoodTractMap {
        NeighborhoodTractMap {
            id: "test".to_string(),
            city: "Test".to_string(),
            state: "OH".to_string(),
            neighborhoods: entries
                .iter()
                .map(|(name, tracts)| NeighborhoodEntry {
                    name: (*name).to_string(),
                    tracts: tracts.iter().map(|t| (*t).to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn assigns_listed_tracts() {
        let mapper = NeighborhoodMapper::new(&table(&[("Downtown", &["A", "B"])]));
        assert_eq!(mapper.assign("A"), "Downtown");
        assert_eq!(mapper.assign("B"), "Downtown");
        assert_eq!(mapper.len(), 2);
    }

    #[test]
    fn unlisted_tract_is_its_own_neighborhood() {
        let mapper = NeighborhoodMapper::new(&table(&[("Downtown", &["A", "B"])]));
        assert_eq!(mapper.assign("C"), "C");
        assert_eq!(mapper.unmapped(["A", "C", "B", "D"]), ["C", "D"]);
    }

    #[test]
    fn first_listing_wins_on_conflict() {
        let mapper = NeighborhoodMapper::new(&table(&[
            ("North", &["1", "2"]),
            ("South", &["2", "3"]),
        ]));
        assert_eq!(mapper.assign("2"), "North");
        assert_eq!(
            mapper.conflicts(),
            [AssignmentConflict {
                tract: "2".to_string(),
                kept: "North".to_string(),
                ignored: "South".to_string(),
            }]
        );
    }

    #[test]
    fn repeated_listing_in_same_neighborhood_is_not_a_conflict() {
        let mapper = NeighborhoodMapper::new(&table(&[("North", &["1", "1"])]));
        assert!(mapper.conflicts().is_empty());
    }

    #[test]
    fn cincinnati_lookups() {
        let table = registry::embedded(registry::DEFAULT_TABLE_ID).unwrap();
        let mapper = NeighborhoodMapper::new(&table);
        assert_eq!(mapper.len(), 128);
        assert!(mapper.conflicts().is_empty());
        assert_eq!(mapper.assign("68"), "Avondale");
        assert_eq!(mapper.assign("64"), "Bond Hill");
        assert_eq!(mapper.assign("9999"), "9999");
    }
}
