//! Lenient numeric parsing for census export cells.

/// Parses a census cell as `f64`.
///
/// Surrounding whitespace, thousands separators and one trailing `%` are
/// ignored. Anything that still fails to parse (empty, `-`, `N/A`, `12abc`)
/// becomes NaN so the row is kept and the value reads as missing.
#[must_use]
pub fn coerce_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let cleaned = trimmed.replace(',', "");

    if cleaned.is_empty() {
        return f64::NAN;
    }

    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_numbers() {
        assert!((coerce_numeric("100") - 100.0).abs() < f64::EPSILON);
        assert!((coerce_numeric(" 42.5 ") - 42.5).abs() < f64::EPSILON);
        assert!((coerce_numeric("-3") - -3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn strips_separators_and_percent() {
        assert!((coerce_numeric("1,234") - 1234.0).abs() < f64::EPSILON);
        assert!((coerce_numeric("55.5%") - 55.5).abs() < f64::EPSILON);
        assert!((coerce_numeric("12 %") - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_values_become_nan() {
        for raw in ["", "  ", "-", "N/A", "12abc", "%", "1%%"] {
            assert!(coerce_numeric(raw).is_nan(), "{raw:?} should be NaN");
        }
    }
}
