//! Error handling and error types for the income dashboard.
//!
//! Every failure in this crate is fatal to the run: loading, cleaning,
//! formula expansion, fitting and rendering all propagate a
//! [`DashboardError`] to the caller, which surfaces the message and stops.

use std::io;
use thiserror::Error;

/// Main error type for the income dashboard.
///
/// This enum covers all error conditions that can occur during dataset
/// loading, cleaning, design-matrix construction, model fitting and
/// rendering.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Dataset-related errors (schema, invariants)
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Data loading and parsing errors
    #[error("Data loading error: {message}")]
    DataLoading { message: String },

    /// Model formula parsing and design matrix errors
    #[error("Formula error: {message}")]
    Formula { message: String },

    /// Model fitting errors
    #[error("Training error: {message}")]
    Training { message: String },

    /// Numerical computation errors (non-finite solutions, degenerate input)
    #[error("Numerical error: {message}")]
    Numerical { message: String },

    /// Chart and page rendering errors
    #[error("Rendering error: {message}")]
    Rendering { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// CSV writing errors
    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Errors raised by the Polars DataFrame library while reading input
    #[error("Polars error: {source}")]
    Polars {
        #[from]
        source: polars::prelude::PolarsError,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },
}

/// Dataset schema and invariant violations found while loading or cleaning.
#[derive(Error, Debug, PartialEq)]
pub enum DatasetError {
    #[error("Empty dataset provided")]
    Empty,

    #[error("The required column '{0}' was not found in the input file")]
    ColumnNotFound(String),

    #[error("Column '{column}' could not be read as {expected} (found {found})")]
    ColumnWrongType {
        column: String,
        expected: &'static str,
        found: String,
    },

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Invalid value in column '{column}' at row {row}: {value}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Income must be strictly positive, found {value} at row {row}")]
    NonPositiveIncome { row: usize, value: f64 },

    #[error("Age must be strictly positive to derive the employment/age ratio (row {row})")]
    ZeroAge { row: usize },
}

/// Formula parsing and design matrix construction errors.
#[derive(Error, Debug, PartialEq)]
pub enum FormulaError {
    #[error("Formula is missing the '~' separator: {0}")]
    MissingTilde(String),

    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken { token: String, position: usize },

    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    #[error("Column '{0}' referenced by the formula does not exist")]
    UnknownColumn(String),

    #[error("Response column '{0}' must be numeric")]
    NonNumericResponse(String),

    #[error("Level '{level}' of '{factor}' is not part of the design basis")]
    UnknownLevel { factor: String, level: String },

    #[error("Column '{column}' contains a non-finite value at row {row}")]
    NonFiniteValue { column: String, row: usize },

    #[error("Formula produces an empty design (no columns)")]
    EmptyDesign,
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Utility functions for error handling
impl DashboardError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        DashboardError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        DashboardError::Dataset {
            message: message.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        DashboardError::DataLoading {
            message: message.into(),
        }
    }

    /// Create a formula error
    pub fn formula<S: Into<String>>(message: S) -> Self {
        DashboardError::Formula {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        DashboardError::Training {
            message: message.into(),
        }
    }

    /// Create a numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        DashboardError::Numerical {
            message: message.into(),
        }
    }

    /// Create a rendering error
    pub fn rendering<S: Into<String>>(message: S) -> Self {
        DashboardError::Rendering {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        DashboardError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        DashboardError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            DashboardError::Config { .. } => "config",
            DashboardError::Dataset { .. } => "dataset",
            DashboardError::DataLoading { .. } => "data_loading",
            DashboardError::Formula { .. } => "formula",
            DashboardError::Training { .. } => "training",
            DashboardError::Numerical { .. } => "numerical",
            DashboardError::Rendering { .. } => "rendering",
            DashboardError::IO { .. } => "io",
            DashboardError::Csv { .. } => "csv",
            DashboardError::Json { .. } => "json",
            DashboardError::Polars { .. } => "polars",
            DashboardError::InvalidParameter { .. } => "invalid_parameter",
            DashboardError::DimensionMismatch { .. } => "dimension_mismatch",
        }
    }
}

impl From<DatasetError> for DashboardError {
    fn from(err: DatasetError) -> Self {
        DashboardError::Dataset {
            message: err.to_string(),
        }
    }
}

impl From<FormulaError> for DashboardError {
    fn from(err: FormulaError) -> Self {
        DashboardError::Formula {
            message: err.to_string(),
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::DashboardError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::DashboardError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::DashboardError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::DashboardError::dataset(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::DashboardError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::DashboardError::training(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DashboardError::config("test configuration error");
        assert_eq!(err.category(), "config");

        let err = DashboardError::training("test training error");
        assert_eq!(err.category(), "training");
    }

    #[test]
    fn test_error_macros() {
        let err = config_error!("test error");
        assert!(matches!(err, DashboardError::Config { .. }));

        let err = dataset_error!("test error with param: {}", 42);
        assert!(matches!(err, DashboardError::Dataset { .. }));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_specialized_errors() {
        let err: DashboardError = DatasetError::ColumnNotFound("renda".into()).into();
        assert!(matches!(err, DashboardError::Dataset { .. }));
        assert!(err.to_string().contains("renda"));

        let err: DashboardError = FormulaError::MissingTilde("y x".into()).into();
        assert_eq!(err.category(), "formula");
    }

    #[test]
    fn test_parameter_errors() {
        let err = DashboardError::invalid_parameter("histogram_bins", "5", "must be in [10, 200]");
        assert_eq!(err.category(), "invalid_parameter");
        assert!(err.to_string().contains("histogram_bins"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: DashboardError = io_err.into();
        assert!(matches!(err, DashboardError::IO { .. }));
        assert_eq!(err.category(), "io");
    }
}
