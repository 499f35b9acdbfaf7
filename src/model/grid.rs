//! Penalty grid search and final model selection.

use crate::config::Config;
use crate::core::constants::R2_TIE_TOLERANCE;
use crate::core::error::{DashboardError, Result};
use crate::core::types::{PenaltyType, SelectionPolicy};
use crate::dataset::frame::Frame;
use crate::dataset::partition::{train_test_split, TrainTestSplit};
use crate::dataset::IncomeTable;
use crate::formula::{DesignInfo, DesignMatrix};
use crate::metrics_eval::{evaluate_regression, r2_score, RegressionMetrics};
use crate::model::elastic_net::{fit_regularized, ElasticNetConfig, FittedModel};
use crate::{config_error, ensure, training_error};
use log::{debug, info};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Held-out score of one (strength, penalty) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub alpha: f64,
    pub penalty: PenaltyType,
    pub r2: f64,
}

/// One line of the results table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultsRow {
    pub alpha: f64,
    pub r2_ridge: Option<f64>,
    pub r2_lasso: Option<f64>,
}

/// Group grid points by strength, in grid order.
pub fn results_table(points: &[GridPoint]) -> Vec<ResultsRow> {
    let mut rows: Vec<ResultsRow> = Vec::new();
    for point in points {
        let row = match rows.iter_mut().find(|r| r.alpha == point.alpha) {
            Some(row) => row,
            None => {
                rows.push(ResultsRow {
                    alpha: point.alpha,
                    r2_ridge: None,
                    r2_lasso: None,
                });
                // Just pushed.
                let last = rows.len() - 1;
                &mut rows[last]
            }
        };
        match point.penalty {
            PenaltyType::Ridge => row.r2_ridge = Some(point.r2),
            PenaltyType::Lasso => row.r2_lasso = Some(point.r2),
        }
    }
    rows
}

/// Fit every (strength, penalty) pair on the training matrix and score it on
/// the test matrix.
pub fn grid_search(
    train: (&DesignMatrix, &Array1<f64>),
    test: (&DesignMatrix, &Array1<f64>),
    alphas: &[f64],
    penalties: &[PenaltyType],
    solver: &ElasticNetConfig,
) -> Result<Vec<GridPoint>> {
    let (x_train, y_train) = train;
    let (x_test, y_test) = test;
    if x_train.column_names != x_test.column_names {
        return Err(DashboardError::dimension_mismatch(
            format!("train columns {:?}", x_train.column_names),
            format!("test columns {:?}", x_test.column_names),
        ));
    }

    let mut points = Vec::with_capacity(alphas.len() * penalties.len());
    for &alpha in alphas {
        for &penalty in penalties {
            let model = fit_regularized(x_train, y_train, penalty, &solver.with_alpha(alpha))?;
            let predictions = model.predict(x_test)?;
            let r2 = r2_score(&y_test.view(), &predictions.view());
            debug!("alpha = {:<6} {:<5} held-out R² = {:.6}", alpha, penalty, r2);
            points.push(GridPoint { alpha, penalty, r2 });
        }
    }
    Ok(points)
}

/// Pick the final (penalty, strength) pair.
///
/// For [`SelectionPolicy::BestHeldOutR2`], scores within `1e-9` of each other
/// are tied and the tie goes to the smaller strength, then to ridge.
pub fn select_model(points: &[GridPoint], policy: SelectionPolicy) -> Result<(PenaltyType, f64)> {
    match policy {
        SelectionPolicy::Fixed { penalty, alpha } => Ok((penalty, alpha)),
        SelectionPolicy::BestHeldOutR2 => {
            let mut candidates: Vec<&GridPoint> =
                points.iter().filter(|p| p.r2.is_finite()).collect();
            candidates.sort_by(|a, b| {
                a.alpha
                    .total_cmp(&b.alpha)
                    .then_with(|| a.penalty.cmp(&b.penalty))
            });

            let mut best: Option<&GridPoint> = None;
            for candidate in candidates {
                match best {
                    Some(current) if candidate.r2 <= current.r2 + R2_TIE_TOLERANCE => {}
                    _ => best = Some(candidate),
                }
            }

            best.map(|p| (p.penalty, p.alpha))
                .ok_or_else(|| training_error!("No finite held-out R² to select a model from"))
        }
    }
}

/// Settings of one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub formula: String,
    pub alphas: Vec<f64>,
    pub penalties: Vec<PenaltyType>,
    pub test_fraction: f64,
    pub random_seed: u64,
    pub solver: ElasticNetConfig,
    pub selection: SelectionPolicy,
}

impl TrainerConfig {
    pub fn from_config(config: &Config) -> Self {
        TrainerConfig {
            formula: config.formula.clone(),
            alphas: config.alphas.clone(),
            penalties: config.penalties.clone(),
            test_fraction: config.test_fraction,
            random_seed: config.random_seed,
            solver: ElasticNetConfig::default()
                .with_refit(config.refit)
                .with_max_iter(config.max_iter)
                .with_tolerance(config.tolerance),
            selection: config.selection,
        }
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The selected model and its evaluation on the test partition.
#[derive(Debug, Clone)]
pub struct ModelSelection {
    pub design: DesignInfo,
    pub split: TrainTestSplit,
    pub grid: Vec<GridPoint>,
    pub model: FittedModel,
    pub held_out: RegressionMetrics,
    pub y_test: Array1<f64>,
    pub test_predictions: Array1<f64>,
}

impl ModelSelection {
    pub fn results_table(&self) -> Vec<ResultsRow> {
        results_table(&self.grid)
    }
}

/// Runs the split, the grid search and the final fit.
#[derive(Debug, Clone, Default)]
pub struct ModelTrainer {
    config: TrainerConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        ModelTrainer { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on a cleaned income table.
    pub fn train(&self, table: &IncomeTable) -> Result<ModelSelection> {
        self.train_frame(&table.to_frame())
    }

    /// Train on any frame holding the formula's columns.
    pub fn train_frame(&self, frame: &Frame) -> Result<ModelSelection> {
        let cfg = &self.config;
        ensure!(
            !cfg.alphas.is_empty() && !cfg.penalties.is_empty(),
            config_error!("The penalty grid needs at least one strength and one penalty type")
        );

        // Levels come from the whole table so both partitions share columns.
        let design = DesignInfo::from_formula(&cfg.formula, frame)?;
        let split = train_test_split(frame.n_rows(), cfg.test_fraction, cfg.random_seed)?;

        let (y_train, x_train) = design.build_both(&frame.take(&split.train)?)?;
        let (y_test, x_test) = design.build_both(&frame.take(&split.test)?)?;
        info!(
            "Design: {} columns, {} train rows, {} test rows",
            design.n_columns(),
            x_train.n_rows(),
            x_test.n_rows()
        );

        let grid = grid_search(
            (&x_train, &y_train),
            (&x_test, &y_test),
            &cfg.alphas,
            &cfg.penalties,
            &cfg.solver,
        )?;

        let (penalty, alpha) = select_model(&grid, cfg.selection)?;
        let model = fit_regularized(&x_train, &y_train, penalty, &cfg.solver.with_alpha(alpha))?;
        let test_predictions = model.predict(&x_test)?;
        let held_out = evaluate_regression(&test_predictions.view(), &y_test.view());
        info!(
            "Selected {} at alpha = {} ({}): held-out R² = {:.6}",
            penalty, alpha, cfg.selection, held_out.r2
        );

        Ok(ModelSelection {
            design,
            split,
            grid,
            model,
            held_out,
            y_test,
            test_predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(alpha: f64, penalty: PenaltyType, r2: f64) -> GridPoint {
        GridPoint { alpha, penalty, r2 }
    }

    #[test]
    fn test_select_best() {
        let points = vec![
            point(0.0, PenaltyType::Ridge, 0.25),
            point(0.0, PenaltyType::Lasso, 0.26),
            point(0.1, PenaltyType::Ridge, 0.10),
        ];
        assert_eq!(
            select_model(&points, SelectionPolicy::BestHeldOutR2).unwrap(),
            (PenaltyType::Lasso, 0.0)
        );
    }

    #[test]
    fn test_select_ties_prefer_small_alpha_then_ridge() {
        let points = vec![
            point(0.01, PenaltyType::Ridge, 0.3),
            point(0.0, PenaltyType::Lasso, 0.3 + 1e-12),
            point(0.0, PenaltyType::Ridge, 0.3),
            point(0.05, PenaltyType::Lasso, f64::NAN),
        ];
        assert_eq!(
            select_model(&points, SelectionPolicy::BestHeldOutR2).unwrap(),
            (PenaltyType::Ridge, 0.0)
        );
    }

    #[test]
    fn test_select_fixed_and_empty() {
        let fixed = SelectionPolicy::Fixed {
            penalty: PenaltyType::Ridge,
            alpha: 0.0,
        };
        assert_eq!(select_model(&[], fixed).unwrap(), (PenaltyType::Ridge, 0.0));
        assert!(select_model(&[point(0.0, PenaltyType::Ridge, f64::NAN)], SelectionPolicy::BestHeldOutR2).is_err());
    }

    #[test]
    fn test_results_table_groups_by_alpha() {
        let points = vec![
            point(0.0, PenaltyType::Ridge, 0.5),
            point(0.0, PenaltyType::Lasso, 0.4),
            point(0.1, PenaltyType::Ridge, 0.3),
        ];
        let rows = results_table(&points);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].r2_ridge, Some(0.5));
        assert_eq!(rows[0].r2_lasso, Some(0.4));
        assert_eq!(rows[1].r2_lasso, None);
    }
}
