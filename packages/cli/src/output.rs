//! Plain-text tables for the terminal.

use student_map_analytics_models::{ReportRow, Totals};
use student_map_dataset::query::{CenterSource, QueryResult};
use student_map_dataset::table::TractTable;

/// Renders a rounded figure, or `n/a` when it is missing.
#[must_use]
pub fn format_count(value: Option<i64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// Renders a summed figure rounded half away from zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_total(value: f64) -> String {
    if value.is_finite() {
        (value.round() as i64).to_string()
    } else {
        "n/a".to_string()
    }
}

/// Prints report rows as a fixed-width table.
pub fn print_rows(rows: &[ReportRow]) {
    println!(
        "{:<32} {:>8} {:>8} {:>10} {:>7}",
        "REGION", "TOTAL", "WHITE", "NON-WHITE", "TRACTS"
    );
    println!("{}", "-".repeat(69));
    for row in rows {
        let label = row.neighborhood.as_ref().map_or_else(
            || row.label.clone(),
            |n| format!("{} ({n})", row.label),
        );
        println!(
            "{:<32} {:>8} {:>8} {:>10} {:>7}",
            label,
            format_count(row.total),
            format_count(row.white),
            format_count(row.non_white),
            row.tract_count
        );
    }
}

/// Prints the totals line under a table.
pub fn print_totals(totals: &Totals) {
    println!("{}", "-".repeat(69));
    println!(
        "{:<32} {:>8} {:>8} {:>10} {:>7}",
        format!("{} regions", totals.region_count),
        format_total(totals.estimate.total),
        format_total(totals.estimate.white),
        format_total(totals.estimate.non_white),
        totals.tract_count
    );
}

/// Prints a query result: center, notices, table and legend.
pub fn print_report(result: &QueryResult) {
    let source = match result.center_source {
        CenterSource::Geocoded => "geocoded",
        CenterSource::Default => "default",
    };
    println!(
        "Center: {:.4}, {:.4} ({source})",
        result.center.latitude, result.center.longitude
    );
    for notice in &result.notices {
        println!("Note: {}", notice.message());
    }
    println!();

    print_rows(&result.rows);
    print_totals(&result.totals);

    if let Some(legend) = &result.heat.legend {
        println!();
        println!(
            "Heat overlay: {} from {} to {}",
            legend.caption,
            format_total(legend.min),
            format_total(legend.max)
        );
    }
}

/// Prints the neighborhood lookup table and how the loaded tracts matched it.
pub fn print_neighborhoods(table: &TractTable) {
    let lookup = table.neighborhoods();
    println!(
        "{}, {} ({} neighborhoods, {} tract listings)",
        lookup.city,
        lookup.state,
        lookup.neighborhoods.len(),
        lookup.tract_listing_count()
    );
    println!();
    println!("{:<32} TRACTS", "NEIGHBORHOOD");
    println!("{}", "-".repeat(69));
    for entry in &lookup.neighborhoods {
        println!("{:<32} {}", entry.name, entry.tracts.join(", "));
    }

    if !table.unmapped().is_empty() {
        println!();
        println!(
            "Tracts labeled with their own name ({}): {}",
            table.unmapped().len(),
            table.unmapped().join(", ")
        );
    }
    for conflict in table.conflicts() {
        println!(
            "Tract {} is listed under both {} and {}; using {}",
            conflict.tract, conflict.kept, conflict.ignored, conflict.kept
        );
    }
    for dropped in table.dropped() {
        let missing: Vec<String> = dropped.missing.iter().map(ToString::to_string).collect();
        println!(
            "Tract {} dropped, missing from: {}",
            dropped.tract_id,
            missing.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counts_render_as_na() {
        assert_eq!(format_count(Some(12)), "12");
        assert_eq!(format_count(None), "n/a");
    }

    #[test]
    fn totals_round_half_away_from_zero() {
        assert_eq!(format_total(2.5), "3");
        assert_eq!(format_total(0.4), "0");
        assert_eq!(format_total(f64::NAN), "n/a");
    }
}
