//! Inner join of tract geometry with the demographic tables.

use student_map_demographics_models::{DemographicField, DemographicValues};
use student_map_geography_models::TractGeometry;

use crate::loader::DemographicTables;

/// A tract boundary with its demographic attributes attached.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTract {
    /// The boundary record.
    pub geometry: TractGeometry,
    /// The joined attributes.
    pub demographics: DemographicValues,
}

/// A tract left out of the join and the sources that lacked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedTract {
    /// Tract identifier.
    pub tract_id: String,
    /// Sources with no row for the tract.
    pub missing: Vec<DemographicField>,
}

/// Result of [`join`].
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    /// Tracts present in every source, in geometry order.
    pub tracts: Vec<JoinedTract>,
    /// Tracts missing from at least one source, in geometry order.
    pub dropped: Vec<DroppedTract>,
}

/// Joins every geometry record with all three demographic tables.
///
/// A tract missing from any table is dropped. Output order follows
/// `geometry`.
#[must_use]
pub fn join(geometry: Vec<TractGeometry>, tables: &DemographicTables) -> JoinOutcome {
    let mut tracts = Vec::with_capacity(geometry.len());
    let mut dropped = Vec::new();

    for tract in geometry {
        let key = tract.tract_id.as_str();
        let lookups = [
            (DemographicField::Under18, tables.under_18.get(key)),
            (DemographicField::LowIncome, tables.low_income.get(key)),
            (DemographicField::White, tables.white.get(key)),
        ];

        match lookups {
            [(_, Some(under_18_count)), (_, Some(pct_low_income)), (_, Some(pct_white))] => {
                tracts.push(JoinedTract {
                    geometry: tract,
                    demographics: DemographicValues {
                        under_18_count,
                        pct_low_income,
                        pct_white,
                    },
                });
            }
            _ => {
                let missing: Vec<DemographicField> = lookups
                    .iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(field, _)| *field)
                    .collect();
                log::debug!("Dropping tract {key}: no row in {missing:?}");
                dropped.push(DroppedTract {
                    tract_id: tract.tract_id,
                    missing,
                });
            }
        }
    }

    log::info!(
        "Joined {} tracts with demographics ({} dropped)",
        tracts.len(),
        dropped.len()
    );

    JoinOutcome { tracts, dropped }
}
