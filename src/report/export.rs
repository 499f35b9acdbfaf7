//! Tabular and JSON exports written next to the dashboard page.

use crate::core::error::Result;
use crate::core::types::{PenaltyType, SelectionPolicy};
use crate::core::INCOME_DASHBOARD_VERSION;
use crate::dataset::CleaningReport;
use crate::metrics_eval::RegressionMetrics;
use crate::model::{ModelSelection, ResultsRow};
use crate::report::predictions::Predictions;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
struct ResultsCsvRow {
    alpha: f64,
    #[serde(rename = "R2 (Ridge)")]
    r2_ridge: Option<f64>,
    #[serde(rename = "R2 (Lasso)")]
    r2_lasso: Option<f64>,
}

/// Write the strength / R² table. A penalty missing from the grid leaves an
/// empty cell.
pub fn write_results_csv<P: AsRef<Path>>(path: P, rows: &[ResultsRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for row in rows {
        writer.serialize(ResultsCsvRow {
            alpha: row.alpha,
            r2_ridge: row.r2_ridge,
            r2_lasso: row.r2_lasso,
        })?;
    }
    writer.flush()?;
    debug!("Wrote {} result rows to {}", rows.len(), path.as_ref().display());
    Ok(())
}

/// Write one line per test row, in log and original scale.
pub fn write_predictions_csv<P: AsRef<Path>>(path: P, predictions: &Predictions) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;
    for record in predictions.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(
        "Wrote {} predictions to {}",
        predictions.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// A named coefficient of the final model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub value: f64,
}

/// The final model as reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChosenModel {
    pub penalty: PenaltyType,
    pub alpha: f64,
    pub policy: SelectionPolicy,
    pub active_coefficients: usize,
    pub coefficients: Vec<Coefficient>,
}

/// Machine-readable summary of one run.
///
/// Undefined scores (`NaN`) serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub cleaning: CleaningReport,
    pub formula: String,
    pub n_train: usize,
    pub n_test: usize,
    pub results: Vec<ResultsRow>,
    pub model: ChosenModel,
    pub held_out: RegressionMetrics,
}

impl RunSummary {
    pub fn new(
        cleaning: CleaningReport,
        selection: &ModelSelection,
        policy: SelectionPolicy,
    ) -> Self {
        let model = &selection.model;
        RunSummary {
            generated_at: Utc::now(),
            version: INCOME_DASHBOARD_VERSION.to_string(),
            cleaning,
            formula: selection.design.formula.to_string(),
            n_train: selection.split.n_train(),
            n_test: selection.split.n_test(),
            results: selection.results_table(),
            model: ChosenModel {
                penalty: model.penalty,
                alpha: model.alpha,
                policy,
                active_coefficients: model.n_active(),
                coefficients: model
                    .coefficients()
                    .map(|(name, value)| Coefficient {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            },
            held_out: selection.held_out,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn test_results_csv_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let rows = vec![
            ResultsRow {
                alpha: 0.0,
                r2_ridge: Some(0.25),
                r2_lasso: Some(0.24),
            },
            ResultsRow {
                alpha: 0.1,
                r2_ridge: Some(0.2),
                r2_lasso: None,
            },
        ];
        write_results_csv(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "alpha,R2 (Ridge),R2 (Lasso)");
        assert_eq!(lines[1], "0.0,0.25,0.24");
        assert_eq!(lines[2], "0.1,0.2,");
    }

    #[test]
    fn test_predictions_csv_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("predictions.csv");
        let predictions = Predictions::new(&array![1.0, 2.0], &array![1.0, 2.5]).unwrap();
        write_predictions_csv(&path, &predictions).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "True Value (log)",
                "Predicted Value (log)",
                "Difference (Log)",
                "True Value",
                "Predicted Value",
                "Difference"
            ]
        );
        assert_eq!(reader.records().count(), 2);
    }
}
