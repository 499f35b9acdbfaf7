//! Dataset management for the income dashboard.
//!
//! Loading, cleaning and the table types the rest of the crate consumes:
//!
//! - [`loader`]: Polars-backed reading of the delimited input file
//! - [`cleaning`]: missing-value and duplicate removal, derived columns
//! - [`dataset`]: [`IncomeRecord`] and [`IncomeTable`]
//! - [`frame`]: a typed column table used by formulas and the heatmap
//! - [`encoding`]: label encoding and correlations
//! - [`partition`]: seeded train/test split

pub mod cleaning;
pub mod dataset;
pub mod encoding;
pub mod frame;
pub mod loader;
pub mod partition;

pub use cleaning::{clean, CleaningReport};
pub use dataset::{IncomeRecord, IncomeTable};
pub use encoding::{CorrelationMatrix, LabelEncoder};
pub use frame::{ColumnData, Frame};
pub use loader::{load_raw, DataLoader, LoaderConfig, PolarsLoader, RawRecord, RawTable};
pub use partition::{train_test_split, TrainTestSplit};

use crate::config::Config;
use crate::core::error::Result;
use std::path::Path;

/// Load and clean the income file in one step.
pub fn load_income_table<P: AsRef<Path>>(
    path: P,
    config: &Config,
) -> Result<(IncomeTable, CleaningReport)> {
    let raw = load_raw(path, &config.loader_config())?;
    clean(raw)
}
