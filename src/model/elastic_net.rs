//! Elastic-net penalized least squares.
//!
//! Minimizes
//!
//! ```text
//! (1/2n)·‖y − Xb‖² + α·((1 − w)/2·‖b‖² + w·‖b‖₁)
//! ```
//!
//! over every design column, the intercept included. `w = 0` is solved in
//! closed form; any L1 weight goes through cyclic coordinate descent with
//! soft thresholding, optionally followed by an unpenalized refit on the
//! active columns.

use crate::core::constants::*;
use crate::core::error::{DashboardError, Result};
use crate::core::types::PenaltyType;
use crate::formula::DesignMatrix;
use crate::model::linalg::{least_squares, solve_ridge};
use log::{debug, warn};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Solver settings for one elastic-net fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticNetConfig {
    /// Penalty strength α
    pub alpha: f64,
    /// L1 mixing weight w in [0, 1]
    pub l1_weight: f64,
    /// Refit active columns without penalty (ignored when w = 0)
    pub refit: bool,
    pub max_iter: usize,
    pub tolerance: f64,
    /// Coefficients below this magnitude are set to zero
    pub zero_tolerance: f64,
}

impl Default for ElasticNetConfig {
    fn default() -> Self {
        ElasticNetConfig {
            alpha: 0.0,
            l1_weight: 1.0,
            refit: true,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            zero_tolerance: DEFAULT_ZERO_TOLERANCE,
        }
    }
}

impl ElasticNetConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_l1_weight(mut self, l1_weight: f64) -> Self {
        self.l1_weight = l1_weight;
        self
    }

    pub fn with_penalty(self, penalty: PenaltyType) -> Self {
        self.with_l1_weight(penalty.l1_weight())
    }

    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit = refit;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(DashboardError::invalid_parameter(
                "alpha",
                self.alpha.to_string(),
                "must be finite and non-negative",
            ));
        }
        if !(0.0..=1.0).contains(&self.l1_weight) {
            return Err(DashboardError::invalid_parameter(
                "l1_weight",
                self.l1_weight.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }
        if self.max_iter == 0 {
            return Err(DashboardError::invalid_parameter(
                "max_iter",
                "0",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// A fitted linear model over named design columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    pub params: Vec<f64>,
    pub column_names: Vec<String>,
    pub penalty: PenaltyType,
    pub alpha: f64,
    pub l1_weight: f64,
    /// Coordinate-descent sweeps used (0 for closed-form fits)
    pub iterations: usize,
    pub converged: bool,
}

impl FittedModel {
    /// Number of non-zero coefficients.
    pub fn n_active(&self) -> usize {
        self.params.iter().filter(|p| **p != 0.0).count()
    }

    /// `(column, coefficient)` pairs.
    pub fn coefficients(&self) -> impl Iterator<Item = (&str, f64)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.params.iter().copied())
    }

    /// Predict from a design matrix built in the same basis.
    pub fn predict(&self, design: &DesignMatrix) -> Result<Array1<f64>> {
        if design.column_names != self.column_names {
            return Err(DashboardError::dimension_mismatch(
                format!("{} design columns {:?}", self.column_names.len(), self.column_names),
                format!("{} design columns {:?}", design.column_names.len(), design.column_names),
            ));
        }
        Ok(design.x.dot(&Array1::from_vec(self.params.clone())))
    }
}

/// Elastic-net estimator.
#[derive(Debug, Clone, Default)]
pub struct ElasticNet {
    config: ElasticNetConfig,
}

impl ElasticNet {
    pub fn new(config: ElasticNetConfig) -> Self {
        ElasticNet { config }
    }

    pub fn config(&self) -> &ElasticNetConfig {
        &self.config
    }

    /// Fit on a design matrix and response.
    pub fn fit(&self, design: &DesignMatrix, y: &Array1<f64>) -> Result<FittedModel> {
        self.config.validate()?;
        let x = &design.x;
        if x.nrows() != y.len() {
            return Err(DashboardError::dimension_mismatch(
                format!("{} targets", x.nrows()),
                format!("{} targets", y.len()),
            ));
        }
        if x.nrows() == 0 {
            return Err(DashboardError::training("Cannot fit a model on zero rows"));
        }

        let cfg = &self.config;
        let penalty = if cfg.l1_weight == 0.0 {
            PenaltyType::Ridge
        } else {
            PenaltyType::Lasso
        };

        let (params, iterations, converged) = if cfg.l1_weight == 0.0 {
            let n = x.nrows() as f64;
            let solution = solve_ridge(x, y, n * cfg.alpha)?;
            (solution.params, 0, true)
        } else {
            let (mut params, iterations, converged) = self.coordinate_descent(x, y)?;
            for p in params.iter_mut() {
                if p.abs() < cfg.zero_tolerance {
                    *p = 0.0;
                }
            }
            if cfg.refit {
                params = refit_active(x, y, &params)?;
            }
            (params, iterations, converged)
        };

        if params.iter().any(|v| !v.is_finite()) {
            return Err(DashboardError::numerical(format!(
                "Non-finite coefficients for {} at alpha = {}",
                penalty, cfg.alpha
            )));
        }

        debug!(
            "Fitted {} alpha={} in {} sweeps ({} active of {})",
            penalty,
            cfg.alpha,
            iterations,
            params.iter().filter(|p| **p != 0.0).count(),
            params.len()
        );

        Ok(FittedModel {
            params: params.to_vec(),
            column_names: design.column_names.clone(),
            penalty,
            alpha: cfg.alpha,
            l1_weight: cfg.l1_weight,
            iterations,
            converged,
        })
    }

    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    /// Cyclic coordinate descent on the Gram form of the objective.
    fn coordinate_descent(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(Array1<f64>, usize, bool)> {
        let cfg = &self.config;
        let n = x.nrows() as f64;
        let p = x.ncols();

        let gram: Array2<f64> = x.t().dot(x) / n;
        let xty: Array1<f64> = x.t().dot(y) / n;
        let l1 = cfg.alpha * cfg.l1_weight;
        let l2 = cfg.alpha * (1.0 - cfg.l1_weight);

        let mut b = Array1::<f64>::zeros(p);
        // G·b, kept in sync with b.
        let mut gb = Array1::<f64>::zeros(p);

        for iter in 1..=cfg.max_iter {
            let mut max_change = 0.0f64;
            for j in 0..p {
                let gjj = gram[[j, j]];
                let denom = gjj + l2;
                let new_bj = if denom <= 0.0 {
                    0.0
                } else {
                    let rho = xty[j] - gb[j] + gjj * b[j];
                    Self::soft_threshold(rho, l1) / denom
                };
                let delta = new_bj - b[j];
                if delta != 0.0 {
                    b[j] = new_bj;
                    gb.scaled_add(delta, &gram.column(j));
                    max_change = max_change.max(delta.abs());
                }
            }
            if max_change < cfg.tolerance {
                return Ok((b, iter, true));
            }
        }

        warn!(
            "Coordinate descent did not converge in {} sweeps (alpha = {}, l1_weight = {})",
            cfg.max_iter, cfg.alpha, cfg.l1_weight
        );
        Ok((b, cfg.max_iter, false))
    }
}

/// Unpenalized least squares restricted to the non-zero columns of `params`.
fn refit_active(x: &Array2<f64>, y: &Array1<f64>, params: &Array1<f64>) -> Result<Array1<f64>> {
    let active: Vec<usize> = (0..params.len()).filter(|&j| params[j] != 0.0).collect();
    let mut refitted = Array1::<f64>::zeros(params.len());
    if active.is_empty() {
        return Ok(refitted);
    }

    let sub = x.select(ndarray::Axis(1), &active);
    let solution = least_squares(&sub, y)?;
    for (k, &j) in active.iter().enumerate() {
        refitted[j] = solution.params[k];
    }
    Ok(refitted)
}

/// Fit one penalty family at one strength.
pub fn fit_regularized(
    design: &DesignMatrix,
    y: &Array1<f64>,
    penalty: PenaltyType,
    base: &ElasticNetConfig,
) -> Result<FittedModel> {
    ElasticNet::new(base.with_penalty(penalty)).fit(design, y)
}
