//! Potential-student estimate for one tract.

use student_map_demographics_models::{DemographicValues, StudentEstimate};

/// Fraction of low-income minors counted as potential students.
pub const ELIGIBLE_SHARE: f64 = 0.2;

/// Derives the potential-student counts from a tract's demographics.
///
/// `total = under_18 * pct_low_income / 100 * ELIGIBLE_SHARE`, split by the
/// White percentage. NaN inputs propagate; percentages are not clamped.
#[must_use]
pub fn estimate(values: &DemographicValues) -> StudentEstimate {
    let total = values.under_18_count * (values.pct_low_income / 100.0) * ELIGIBLE_SHARE;
    let white_share = values.pct_white / 100.0;

    StudentEstimate {
        total,
        white: total * white_share,
        non_white: total * (1.0 - white_share),
    }
}
