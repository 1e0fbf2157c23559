//! Results table rows and totals.

use std::cmp::Ordering;

use student_map_analytics_models::{AggregatedRegion, ReportRow, Totals};
use student_map_demographics_models::StudentEstimate;

/// Formats regions as table rows, largest total first.
///
/// Figures are rounded to the nearest whole student; NaN becomes `None`.
/// Rows sort by the unrounded total descending with NaN totals last, and
/// by label ascending on ties.
#[must_use]
pub fn format_report(regions: &[AggregatedRegion]) -> Vec<ReportRow> {
    let mut ordered: Vec<&AggregatedRegion> = regions.iter().collect();
    ordered.sort_by(|a, b| {
        compare_totals_desc(a.estimate.total, b.estimate.total).then_with(|| a.label.cmp(&b.label))
    });

    ordered
        .into_iter()
        .map(|region| ReportRow {
            label: region.label.clone(),
            neighborhood: region.neighborhood.clone(),
            total: round_count(region.estimate.total),
            white: round_count(region.estimate.white),
            non_white: round_count(region.estimate.non_white),
            tract_count: region.tract_count,
        })
        .collect()
}

/// Sums every metric across regions, skipping NaN.
#[must_use]
pub fn summarize(regions: &[AggregatedRegion]) -> Totals {
    let estimates: Vec<StudentEstimate> = regions.iter().map(|r| r.estimate).collect();
    Totals {
        estimate: StudentEstimate::sum_skipping_nan(&estimates),
        region_count: regions.len(),
        tract_count: regions.iter().map(|r| r.tract_count).sum(),
    }
}

fn compare_totals_desc(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Rounds half away from zero.
#[allow(clippy::cast_possible_truncation)]
fn round_count(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}
