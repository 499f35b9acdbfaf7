//! Evaluation output of the final model.
//!
//! - [`predictions`]: per-row diagnostics in log and original scale
//! - [`export`]: `results.csv`, `predictions.csv` and `summary.json`

pub mod export;
pub mod predictions;

pub use export::{
    write_predictions_csv, write_results_csv, ChosenModel, Coefficient, RunSummary,
};
pub use predictions::{PredictionRecord, Predictions};

use crate::core::error::Result;
use crate::model::ModelSelection;

/// Predictions of the selected model on the test partition.
pub fn build_predictions(selection: &ModelSelection) -> Result<Predictions> {
    Predictions::new(&selection.y_test, &selection.test_predictions)
}
