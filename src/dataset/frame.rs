//! A small column-oriented value table.
//!
//! [`Frame`] is the common input of the formula layer and the correlation
//! heatmap. Columns are typed: numeric, text or boolean flag. Text and flag
//! columns are the categorical ones.

use crate::core::error::{DashboardError, Result};
use crate::dataset::dataset::flag_label;
use crate::dataset_error;
use std::collections::BTreeSet;

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
    Flag(Vec<bool>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Flag(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text and flag columns are treated as categorical.
    pub fn is_categorical(&self) -> bool {
        !matches!(self, ColumnData::Numeric(_))
    }

    /// Human-readable type name, as shown in the data dictionary.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnData::Numeric(_) => "float",
            ColumnData::Text(_) => "text",
            ColumnData::Flag(_) => "bool",
        }
    }

    /// Label of row `i` as a category level.
    pub fn label(&self, i: usize) -> String {
        match self {
            ColumnData::Numeric(v) => v[i].to_string(),
            ColumnData::Text(v) => v[i].clone(),
            ColumnData::Flag(v) => flag_label(v[i]).to_string(),
        }
    }

    /// Distinct labels in sorted order.
    pub fn levels(&self) -> Vec<String> {
        match self {
            ColumnData::Flag(v) => {
                let present: BTreeSet<bool> = v.iter().copied().collect();
                present.into_iter().map(|b| flag_label(b).to_string()).collect()
            }
            ColumnData::Text(v) => {
                let set: BTreeSet<&str> = v.iter().map(String::as_str).collect();
                set.into_iter().map(str::to_string).collect()
            }
            ColumnData::Numeric(v) => {
                let mut values: Vec<f64> = v.clone();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                values.into_iter().map(|x| x.to_string()).collect()
            }
        }
    }

    /// Rows selected by `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Numeric(v) => ColumnData::Numeric(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Text(v) => {
                ColumnData::Text(indices.iter().map(|&i| v[i].clone()).collect())
            }
            ColumnData::Flag(v) => ColumnData::Flag(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Named, equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<ColumnData>,
    n_rows: usize,
}

impl Frame {
    /// An empty frame expecting columns of `n_rows` values.
    pub fn with_rows(n_rows: usize) -> Self {
        Frame {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Add a column, checking its length and name.
    pub fn push_column<S: Into<String>>(&mut self, name: S, data: ColumnData) -> Result<()> {
        let name = name.into();
        if self.names.is_empty() && self.n_rows == 0 {
            self.n_rows = data.len();
        }
        if data.len() != self.n_rows {
            return Err(DashboardError::dimension_mismatch(
                format!("{} rows", self.n_rows),
                format!("{} rows in column '{}'", data.len(), name),
            ));
        }
        if self.names.contains(&name) {
            return Err(dataset_error!("Duplicate column name '{}'", name));
        }
        self.names.push(name);
        self.columns.push(data);
        Ok(())
    }

    /// Builder-style [`Frame::push_column`].
    pub fn with_column<S: Into<String>>(mut self, name: S, data: ColumnData) -> Result<Self> {
        self.push_column(name, data)?;
        Ok(self)
    }

    pub(crate) fn insert_unchecked(&mut self, name: &str, data: ColumnData) {
        debug_assert_eq!(data.len(), self.n_rows);
        self.names.push(name.to_string());
        self.columns.push(data);
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Iterate `(name, column)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnData)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Row subset, in the order given by `indices`.
    pub fn take(&self, indices: &[usize]) -> Result<Frame> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_rows) {
            return Err(DashboardError::dimension_mismatch(
                format!("row index < {}", self.n_rows),
                bad.to_string(),
            ));
        }
        Ok(Frame {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            n_rows: indices.len(),
        })
    }
}
