//! Polars CSV loader for the income file.

use super::{is_index_column, parse_flag, DataLoader, LoaderConfig, RawRecord, RawTable};
use crate::core::constants::*;
use crate::core::error::{DashboardError, DatasetError, Result};
use log::{debug, info, warn};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Polars data loader
#[derive(Debug, Clone, Default)]
pub struct PolarsLoader {
    config: LoaderConfig,
}

impl PolarsLoader {
    /// Create a new Polars loader
    pub fn new(config: LoaderConfig) -> Self {
        PolarsLoader { config }
    }

    /// Read the file into a DataFrame with every column kept.
    pub fn read_frame<P: AsRef<Path>>(&self, path: P) -> Result<DataFrame> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DashboardError::data_loading(format!("Failed to open '{}': {}", path.display(), e))
        })?;

        let df = CsvReader::new(file)
            .with_options(
                CsvReadOptions::default()
                    .with_has_header(true)
                    .with_parse_options(
                        CsvParseOptions::default().with_separator(self.config.separator),
                    ),
            )
            .finish()?;

        debug!(
            "Read {} rows x {} columns from '{}'",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }

    /// Validate the column set and extract typed rows from a DataFrame.
    pub fn extract(&self, df: &DataFrame) -> Result<RawTable> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();

        for dropped in &self.config.drop_columns {
            if !names.iter().any(|n| n == dropped) {
                return Err(DatasetError::ColumnNotFound(dropped.clone()).into());
            }
        }
        for required in SCHEMA_COLUMNS {
            if !names.iter().any(|n| n == required) {
                return Err(DatasetError::ColumnNotFound(required.to_string()).into());
            }
        }

        let mut ignored_columns = Vec::new();
        for name in &names {
            if self.config.drop_columns.contains(name) || SCHEMA_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            if is_index_column(name) {
                debug!("Dropping index column '{}'", name);
            } else {
                warn!("Ignoring unexpected column '{}'", name);
                ignored_columns.push(name.clone());
            }
        }

        if df.height() == 0 {
            return Err(DatasetError::Empty.into());
        }

        let gender = text_column(df, COL_GENDER)?;
        let owns_vehicle = flag_column(df, COL_OWNS_VEHICLE)?;
        let owns_property = flag_column(df, COL_OWNS_PROPERTY)?;
        let children = count_column(df, COL_CHILDREN)?;
        let income_type = text_column(df, COL_INCOME_TYPE)?;
        let education = text_column(df, COL_EDUCATION)?;
        let marital_status = text_column(df, COL_MARITAL_STATUS)?;
        let residence_type = text_column(df, COL_RESIDENCE_TYPE)?;
        let age = count_column(df, COL_AGE)?;
        let employment_years = float_column(df, COL_EMPLOYMENT_YEARS)?;
        let household_size = required_float_column(df, COL_HOUSEHOLD_SIZE)?;
        let income = required_float_column(df, COL_INCOME)?;

        let records = (0..df.height())
            .map(|i| RawRecord {
                gender: gender[i].clone(),
                owns_vehicle: owns_vehicle[i],
                owns_property: owns_property[i],
                children: children[i],
                income_type: income_type[i].clone(),
                education: education[i].clone(),
                marital_status: marital_status[i].clone(),
                residence_type: residence_type[i].clone(),
                age: age[i],
                employment_years: employment_years[i].filter(|v| !v.is_nan()),
                household_size: household_size[i],
                income: income[i],
            })
            .collect();

        Ok(RawTable {
            records,
            ignored_columns,
        })
    }
}

impl DataLoader for PolarsLoader {
    fn load<P: AsRef<Path>>(&self, path: P) -> Result<RawTable> {
        let path = path.as_ref();
        info!("Loading income data from '{}'", path.display());
        let df = self.read_frame(path)?;
        let table = self.extract(&df)?;
        info!("Loaded {} raw rows", table.len());
        Ok(table)
    }

    fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

fn first_null_row(mut values: impl Iterator<Item = bool>) -> usize {
    values.position(|is_null| is_null).unwrap_or(0)
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)?;
    let casted = column.cast(&DataType::String)?;
    let values = casted.str()?;

    if values.null_count() > 0 {
        let row = first_null_row(values.into_iter().map(|v| v.is_none()));
        return Err(DatasetError::MissingValue {
            column: name.to_string(),
            row,
        }
        .into());
    }

    Ok(values
        .into_no_null_iter()
        .map(|v| v.to_string())
        .collect())
}

fn flag_column(df: &DataFrame, name: &str) -> Result<Vec<bool>> {
    text_column(df, name)?
        .iter()
        .enumerate()
        .map(|(row, value)| {
            parse_flag(value).ok_or_else(|| {
                DatasetError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: value.clone(),
                }
                .into()
            })
        })
        .collect()
}

/// Numeric column with missing values kept as `None`.
fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    let casted = column
        .cast(&DataType::Float64)
        .map_err(|_| DatasetError::ColumnWrongType {
            column: name.to_string(),
            expected: "f64 (numeric)",
            found: format!("{:?}", column.dtype()),
        })?;

    // A non-strict cast turns unparseable text into nulls.
    if casted.null_count() > column.null_count() {
        return Err(DatasetError::ColumnWrongType {
            column: name.to_string(),
            expected: "f64 (numeric)",
            found: format!("{:?}", column.dtype()),
        }
        .into());
    }

    Ok(casted.f64()?.into_iter().collect())
}

fn required_float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    float_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(DatasetError::InvalidValue {
                column: name.to_string(),
                row,
                value: v.to_string(),
            }
            .into()),
            None => Err(DatasetError::MissingValue {
                column: name.to_string(),
                row,
            }
            .into()),
        })
        .collect()
}

fn count_column(df: &DataFrame, name: &str) -> Result<Vec<u32>> {
    required_float_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
                Ok(v as u32)
            } else {
                Err(DatasetError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: v.to_string(),
                }
                .into())
            }
        })
        .collect()
}
