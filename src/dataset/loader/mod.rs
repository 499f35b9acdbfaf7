//! Reading the raw income file into typed rows.
//!
//! The [`DataLoader`] trait is implemented by [`PolarsLoader`], which parses
//! the delimited file with Polars and extracts the schema columns into
//! [`RawRecord`]s. Nothing is filtered here apart from the configured
//! identifier columns; see [`crate::dataset::cleaning`] for the row-level
//! cleaning steps.

pub mod polars;

pub use self::polars::PolarsLoader;

use crate::core::constants::*;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Data loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Field separator byte
    pub separator: u8,
    /// Columns removed before schema validation; each must be present
    pub drop_columns: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            separator: b',',
            drop_columns: vec![COL_CLIENT_ID.to_string(), COL_REFERENCE_DATE.to_string()],
        }
    }
}

impl LoaderConfig {
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }
}

/// One row of the input file, before cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub gender: String,
    pub owns_vehicle: bool,
    pub owns_property: bool,
    pub children: u32,
    pub income_type: String,
    pub education: String,
    pub marital_status: String,
    pub residence_type: String,
    pub age: u32,
    /// `None` when the file has no value (or `NaN`)
    pub employment_years: Option<f64>,
    pub household_size: f64,
    pub income: f64,
}

/// Typed rows of the input file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    /// Columns found in the file but not part of the schema
    pub ignored_columns: Vec<String>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Data loader trait
pub trait DataLoader {
    /// Load the raw rows from `path`
    fn load<P: AsRef<Path>>(&self, path: P) -> Result<RawTable>;

    /// Get loader configuration
    fn config(&self) -> &LoaderConfig;
}

/// Read `path` with the default Polars loader.
pub fn load_raw<P: AsRef<Path>>(path: P, config: &LoaderConfig) -> Result<RawTable> {
    PolarsLoader::new(config.clone()).load(path)
}

/// Parse a boolean cell. Accepts `True/False`, `true/false` and `1/0`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

/// Unnamed index columns written by dataframe libraries (`""`, `Unnamed: 0`).
pub fn is_index_column(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.starts_with("Unnamed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("false"), Some(false));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("yes"), None);
    }

    #[test]
    fn test_index_columns() {
        assert!(is_index_column("Unnamed: 0"));
        assert!(is_index_column(""));
        assert!(!is_index_column("renda"));
    }
}
