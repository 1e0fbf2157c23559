//! Reading one demographic attribute per tract from a CSV export.

use std::collections::BTreeMap;
use std::io::Read;

use student_map_demographics_models::{
    DemographicField, DemographicSourceConfig, DemographicSourcesConfig,
};
use student_map_geography_models::normalize_tract_key;

use crate::DemographicError;
use crate::coerce::coerce_numeric;

/// One attribute keyed by normalized tract identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicTable {
    /// The attribute this table provides.
    pub field: DemographicField,
    /// Value per tract key; NaN where the cell was malformed.
    pub values: BTreeMap<String, f64>,
}

impl DemographicTable {
    /// Looks up the value for a normalized tract key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Number of tracts in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The three attribute tables needed for the join.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicTables {
    /// Residents under 18.
    pub under_18: DemographicTable,
    /// Percent of households below the income threshold.
    pub low_income: DemographicTable,
    /// Percent White population.
    pub white: DemographicTable,
}

impl DemographicTables {
    /// Loads all three configured sources.
    ///
    /// # Errors
    ///
    /// Returns the first [`DemographicError`] encountered.
    pub fn load(config: &DemographicSourcesConfig) -> Result<Self, DemographicError> {
        Ok(Self {
            under_18: load_table(&config.under_18, DemographicField::Under18)?,
            low_income: load_table(&config.low_income, DemographicField::LowIncome)?,
            white: load_table(&config.white, DemographicField::White)?,
        })
    }
}

/// Loads one attribute table from disk.
///
/// # Errors
///
/// Returns [`DemographicError`] if the file cannot be opened, is not valid
/// CSV, lacks a configured column, or repeats a tract key.
pub fn load_table(
    config: &DemographicSourceConfig,
    field: DemographicField,
) -> Result<DemographicTable, DemographicError> {
    let path = config.path.display().to_string();
    log::info!("Loading {field} demographics from {path}");

    let file = std::fs::File::open(&config.path).map_err(|source| DemographicError::Io {
        path: path.clone(),
        source,
    })?;

    let table = read_table(file, config, field)?;
    log::info!("Loaded {} {field} rows from {path}", table.len());

    Ok(table)
}

/// Parses one attribute table from any reader.
///
/// Rows with an empty key are skipped with a warning; rows with a
/// malformed value are kept with NaN.
///
/// # Errors
///
/// Returns [`DemographicError`] on CSV syntax errors, a missing column, or
/// a repeated tract key.
pub fn read_table<R: Read>(
    reader: R,
    config: &DemographicSourceConfig,
    field: DemographicField,
) -> Result<DemographicTable, DemographicError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DemographicError::MissingColumn {
                field,
                column: name.to_string(),
            })
    };
    let key_index = column(&config.key_column)?;
    let value_index = column(&config.value_column)?;

    let mut values = BTreeMap::new();
    let mut malformed = 0_usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;

        let key = normalize_tract_key(record.get(key_index).unwrap_or(""));
        if key.is_empty() {
            log::warn!("Skipping {field} row {} with an empty tract key", row + 1);
            continue;
        }

        let value = coerce_numeric(record.get(value_index).unwrap_or(""));
        if value.is_nan() {
            log::debug!("Tract {key} has a non-numeric {field} value");
            malformed += 1;
        }

        if values.insert(key.clone(), value).is_some() {
            return Err(DemographicError::DuplicateKey { field, key });
        }
    }

    if malformed > 0 {
        log::warn!("{malformed} {field} values could not be parsed and are treated as missing");
    }

    Ok(DemographicTable { field, values })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn source(value_column: &str) -> DemographicSourceConfig {
        DemographicSourceConfig {
            path: PathBuf::from("unused.csv"),
            key_column: "GeoID".to_string(),
            value_column: value_column.to_string(),
        }
    }

    #[test]
    fn reads_values_by_normalized_key() {
        let csv = "GeoID,Name,People < 18 Years Old\n\
                   39061000100,Tract 1,\"1,200\"\n\
                   39061000200.0,Tract 2,80\n\
                   9061000300,Tract 3,N/A\n";
        let table = read_table(
            csv.as_bytes(),
            &source("People < 18 Years Old"),
            DemographicField::Under18,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert!((table.get("39061000100").unwrap() - 1200.0).abs() < f64::EPSILON);
        assert!((table.get("39061000200").unwrap() - 80.0).abs() < f64::EPSILON);
        assert!(table.get("09061000300").unwrap().is_nan());
    }

    #[test]
    fn strips_byte_order_mark_from_headers() {
        let csv = "\u{feff}GeoID,Percent White Population\n39061000100,55.5%\n";
        let table = read_table(
            csv.as_bytes(),
            &source("Percent White Population"),
            DemographicField::White,
        )
        .unwrap();
        assert!((table.get("39061000100").unwrap() - 55.5).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_value_column_is_an_error() {
        let csv = "GeoID,Something Else\n39061000100,1\n";
        let err = read_table(csv.as_bytes(), &source("Wanted"), DemographicField::White)
            .unwrap_err();
        assert!(matches!(
            err,
            DemographicError::MissingColumn { ref column, .. } if column == "Wanted"
        ));
    }

    #[test]
    fn duplicate_key_is_an_error() {
        let csv = "GeoID,V\n39061000100,1\n39061000100.0,2\n";
        let err = read_table(csv.as_bytes(), &source("V"), DemographicField::LowIncome)
            .unwrap_err();
        assert!(matches!(
            err,
            DemographicError::DuplicateKey { ref key, .. } if key == "39061000100"
        ));
    }

    #[test]
    fn empty_key_rows_are_skipped() {
        let csv = "GeoID,V\n,5\n39061000100,1\n";
        let table = read_table(csv.as_bytes(), &source("V"), DemographicField::LowIncome)
            .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn load_table_reads_from_disk() {
        let dir = std::env::temp_dir().join("student_map_demographics_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("under18.csv");
        std::fs::write(&path, "GeoID,V\n39061000100,42\n").unwrap();

        let config = DemographicSourceConfig {
            path: path.clone(),
            key_column: "GeoID".to_string(),
            value_column: "V".to_string(),
        };
        let table = load_table(&config, DemographicField::Under18).unwrap();
        assert!((table.get("39061000100").unwrap() - 42.0).abs() < f64::EPSILON);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let config = DemographicSourceConfig {
            path: PathBuf::from("/definitely/not/here.csv"),
            key_column: "GeoID".to_string(),
            value_column: "V".to_string(),
        };
        assert!(matches!(
            load_table(&config, DemographicField::Under18),
            Err(DemographicError::Io { .. })
        ));
    }
}
