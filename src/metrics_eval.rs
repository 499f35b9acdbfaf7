//! Regression evaluation metrics.
//!
//! [`r2_score`] is the model selection criterion; [`evaluate_regression`]
//! adds the usual error measures for the report.

use log::warn;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Regression evaluation metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root Mean Square Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared (coefficient of determination)
    pub r2: f64,
    /// Mean Squared Error
    pub mse: f64,
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
/// Fewer than two samples leave the score undefined (`NaN`).
pub fn r2_score(true_values: &ArrayView1<'_, f64>, predictions: &ArrayView1<'_, f64>) -> f64 {
    let n = true_values.len();
    if n != predictions.len() {
        warn!(
            "R² requested for {} targets and {} predictions",
            n,
            predictions.len()
        );
        return f64::NAN;
    }
    if n < 2 {
        warn!("R² is not well-defined with less than two samples");
        return f64::NAN;
    }

    let mean = true_values.sum() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&t, &p) in true_values.iter().zip(predictions.iter()) {
        ss_res += (t - p) * (t - p);
        ss_tot += (t - mean) * (t - mean);
    }

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Evaluate regression metrics
pub fn evaluate_regression(
    predictions: &ArrayView1<'_, f64>,
    true_values: &ArrayView1<'_, f64>,
) -> RegressionMetrics {
    let n = predictions.len().min(true_values.len());
    if n == 0 {
        return RegressionMetrics {
            rmse: f64::NAN,
            mae: f64::NAN,
            r2: f64::NAN,
            mse: f64::NAN,
        };
    }

    let mut sum_squared_error = 0.0;
    let mut sum_absolute_error = 0.0;
    for (&pred, &true_val) in predictions.iter().zip(true_values.iter()) {
        let error = pred - true_val;
        sum_squared_error += error * error;
        sum_absolute_error += error.abs();
    }

    let mse = sum_squared_error / n as f64;
    RegressionMetrics {
        rmse: mse.sqrt(),
        mae: sum_absolute_error / n as f64,
        r2: r2_score(true_values, predictions),
        mse,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_r2_perfect_and_mean() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2_score(&y.view(), &y.view()), 1.0);

        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert_relative_eq!(r2_score(&y.view(), &mean.view()), 0.0);
    }

    #[test]
    fn test_r2_known_value() {
        let y = array![3.0, -0.5, 2.0, 7.0];
        let p = array![2.5, 0.0, 2.0, 8.0];
        assert_relative_eq!(r2_score(&y.view(), &p.view()), 0.948_608_137_044_967_9, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_degenerate_inputs() {
        let constant = array![2.0, 2.0, 2.0];
        assert_eq!(r2_score(&constant.view(), &constant.view()), 1.0);
        let off = array![2.0, 2.0, 2.5];
        assert_eq!(r2_score(&constant.view(), &off.view()), 0.0);

        let single = array![1.0];
        assert!(r2_score(&single.view(), &single.view()).is_nan());
    }

    #[test]
    fn test_evaluate_regression() {
        let y = array![1.0, 2.0, 3.0];
        let p = array![1.0, 2.0, 5.0];
        let metrics = evaluate_regression(&p.view(), &y.view());
        assert_relative_eq!(metrics.mse, 4.0 / 3.0);
        assert_relative_eq!(metrics.mae, 2.0 / 3.0);
        assert_relative_eq!(metrics.rmse, (4.0f64 / 3.0).sqrt());
        assert_relative_eq!(metrics.r2, 1.0 - 4.0 / 2.0);
    }
}
