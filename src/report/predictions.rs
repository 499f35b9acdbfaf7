//! Per-row prediction diagnostics in log and original scale.

use crate::core::error::{DashboardError, Result};
use crate::core::types::Scale;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One test row: true and predicted log income, and both mapped back with
/// `exp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(rename = "True Value (log)")]
    pub true_log: f64,
    #[serde(rename = "Predicted Value (log)")]
    pub predicted_log: f64,
    #[serde(rename = "Difference (Log)")]
    pub difference_log: f64,
    #[serde(rename = "True Value")]
    pub true_value: f64,
    #[serde(rename = "Predicted Value")]
    pub predicted_value: f64,
    #[serde(rename = "Difference")]
    pub difference: f64,
}

impl PredictionRecord {
    pub fn new(true_log: f64, predicted_log: f64) -> Self {
        let true_value = true_log.exp();
        let predicted_value = predicted_log.exp();
        PredictionRecord {
            true_log,
            predicted_log,
            difference_log: true_log - predicted_log,
            true_value,
            predicted_value,
            difference: true_value - predicted_value,
        }
    }

    /// (true, predicted) in the requested scale.
    pub fn pair(&self, scale: Scale) -> (f64, f64) {
        match scale {
            Scale::Log => (self.true_log, self.predicted_log),
            Scale::Original => (self.true_value, self.predicted_value),
        }
    }
}

/// Predictions of the final model on the test partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Predictions {
    records: Vec<PredictionRecord>,
}

impl Predictions {
    /// Pair test targets with model output, both in log scale.
    pub fn new(true_log: &Array1<f64>, predicted_log: &Array1<f64>) -> Result<Self> {
        if true_log.len() != predicted_log.len() {
            return Err(DashboardError::dimension_mismatch(
                format!("{} predictions", true_log.len()),
                format!("{} predictions", predicted_log.len()),
            ));
        }
        if let Some(bad) = true_log
            .iter()
            .chain(predicted_log.iter())
            .find(|v| !v.is_finite())
        {
            return Err(DashboardError::numerical(format!(
                "Non-finite log-scale value {} in predictions",
                bad
            )));
        }

        let records = true_log
            .iter()
            .zip(predicted_log.iter())
            .map(|(&t, &p)| PredictionRecord::new(t, p))
            .collect();
        Ok(Predictions { records })
    }

    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn true_values(&self, scale: Scale) -> Vec<f64> {
        self.records.iter().map(|r| r.pair(scale).0).collect()
    }

    pub fn predicted_values(&self, scale: Scale) -> Vec<f64> {
        self.records.iter().map(|r| r.pair(scale).1).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_record_both_scales() {
        let record = PredictionRecord::new(1000f64.ln(), 800f64.ln());
        assert_relative_eq!(record.true_value, 1000.0, max_relative = 1e-12);
        assert_relative_eq!(record.predicted_value, 800.0, max_relative = 1e-12);
        assert_relative_eq!(record.difference, 200.0, max_relative = 1e-9);
        assert_relative_eq!(record.difference_log, (1000f64 / 800.0).ln(), epsilon = 1e-12);
        assert_eq!(record.pair(Scale::Log), (record.true_log, record.predicted_log));
    }

    #[test]
    fn test_predictions_validate_input() {
        let t = array![1.0, 2.0];
        assert!(Predictions::new(&t, &array![1.0]).is_err());
        assert!(Predictions::new(&t, &array![1.0, f64::NAN]).is_err());

        let predictions = Predictions::new(&t, &array![1.5, 2.5]).unwrap();
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions.predicted_values(Scale::Log), vec![1.5, 2.5]);
    }
}
