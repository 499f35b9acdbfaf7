//! Model selection integration tests.
//!
//! Design matrices shared between partitions, the penalty grid, the
//! selection policy and the final refit.

use income_dashboard::dataset::ColumnData;
use income_dashboard::*;

mod common;
use common::*;

fn categorical_frame() -> Frame {
    Frame::with_rows(5)
        .with_column(
            "g",
            ColumnData::Text(
                ["a", "a", "b", "b", "c"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        )
        .unwrap()
        .with_column("y", ColumnData::Numeric(vec![1.0, 1.0, 2.0, 2.0, 3.0]))
        .unwrap()
}

#[test]
fn test_partitions_share_design_columns() {
    let frame = categorical_frame();
    let design = DesignInfo::from_formula("y ~ C(g)", &frame).unwrap();

    // Rows 0..4 never see level "c".
    let subset = frame.take(&[0, 1, 2, 3]).unwrap();
    let (_, x_subset) = design.build_both(&subset).unwrap();
    let (_, x_full) = design.build_both(&frame).unwrap();

    assert_eq!(x_subset.column_names, x_full.column_names);
    assert_eq!(
        x_full.column_names,
        vec!["Intercept", "C(g)[T.b]", "C(g)[T.c]"]
    );
    assert_eq!(x_subset.n_rows(), 4);
    assert!(x_subset.x.column(2).iter().all(|v| *v == 0.0));
}

#[test]
fn test_categorical_fit_is_exact_on_training_rows() {
    let frame = categorical_frame();
    let (y, x) = dmatrices("y ~ C(g)", &frame).unwrap();

    for penalty in [PenaltyType::Ridge, PenaltyType::Lasso] {
        let model = fit_regularized(&x, &y, penalty, &ElasticNetConfig::default()).unwrap();
        let predictions = model.predict(&x).unwrap();
        let r2 = r2_score(&y.view(), &predictions.view());
        assert!((r2 - 1.0).abs() < 1e-6, "{}: R² = {}", penalty, r2);
    }
}

#[test]
fn test_per_level_slopes_are_recovered() {
    let levels = ["a", "b", "c"];
    let g: Vec<String> = (0..9).map(|i| levels[i % 3].to_string()).collect();
    let x: Vec<f64> = (0..9).map(|i| 1.0 + (i / 3) as f64).collect();
    let y: Vec<f64> = (0..9).map(|i| (1 + i % 3) as f64 * x[i]).collect();
    let frame = Frame::with_rows(9)
        .with_column("g", ColumnData::Text(g))
        .unwrap()
        .with_column("x", ColumnData::Numeric(x))
        .unwrap()
        .with_column("y", ColumnData::Numeric(y))
        .unwrap();

    let (y, design) = dmatrices("y ~ x:C(g)", &frame).unwrap();
    assert_eq!(design.n_columns(), 4);
    let model = fit_regularized(&design, &y, PenaltyType::Ridge, &ElasticNetConfig::default()).unwrap();
    let predictions = model.predict(&design).unwrap();
    let r2 = r2_score(&y.view(), &predictions.view());
    assert!((r2 - 1.0).abs() < 1e-9, "R² = {}", r2);
}

#[test]
fn test_grid_covers_every_strength_and_penalty() {
    let table = synthetic_table(250, 21);
    let selection = ModelTrainer::default().train(&table).unwrap();

    assert_eq!(selection.grid.len(), DEFAULT_ALPHAS.len() * 2);
    let rows = selection.results_table();
    assert_eq!(rows.len(), 6);
    for (row, alpha) in rows.iter().zip(DEFAULT_ALPHAS) {
        assert_eq!(row.alpha, alpha);
        assert!(row.r2_ridge.is_some());
        assert!(row.r2_lasso.is_some());
    }

    // 20% of 250 rows held out.
    assert_eq!(selection.split.n_test(), 50);
    assert_eq!(selection.split.n_train(), 200);
    assert_eq!(selection.y_test.len(), 50);
    assert_eq!(selection.test_predictions.len(), 50);
}

#[test]
fn test_ridge_and_lasso_agree_without_penalty() {
    let table = synthetic_table(250, 22);
    let selection = ModelTrainer::default().train(&table).unwrap();

    let first = &selection.results_table()[0];
    assert_eq!(first.alpha, 0.0);
    let ridge = first.r2_ridge.unwrap();
    let lasso = first.r2_lasso.unwrap();
    assert!((ridge - lasso).abs() < 1e-3, "ridge {} vs lasso {}", ridge, lasso);
}

#[test]
fn test_selected_model_has_best_held_out_score() {
    let table = synthetic_table(250, 23);
    let selection = ModelTrainer::default().train(&table).unwrap();

    let best = selection
        .grid
        .iter()
        .map(|p| p.r2)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((selection.held_out.r2 - best).abs() < 1e-9);
    assert!(selection
        .grid
        .iter()
        .any(|p| p.alpha == selection.model.alpha && p.penalty == selection.model.penalty));
}

#[test]
fn test_training_is_deterministic() {
    let table = synthetic_table(200, 24);
    let a = ModelTrainer::default().train(&table).unwrap();
    let b = ModelTrainer::default().train(&table).unwrap();

    assert_eq!(a.split, b.split);
    assert_eq!(a.grid, b.grid);
    assert_eq!(a.model.params, b.model.params);
}

#[test]
fn test_seed_changes_partition() {
    let table = synthetic_table(200, 25);
    let a = ModelTrainer::default().train(&table).unwrap();
    let b = ModelTrainer::new(TrainerConfig {
        random_seed: 41,
        ..TrainerConfig::default()
    })
    .train(&table)
    .unwrap();
    assert_ne!(a.split, b.split);
}

#[test]
fn test_fixed_policy_keeps_requested_model() {
    let table = synthetic_table(200, 26);
    let trainer = ModelTrainer::new(TrainerConfig {
        selection: SelectionPolicy::Fixed {
            penalty: PenaltyType::Ridge,
            alpha: 0.0,
        },
        ..TrainerConfig::default()
    });
    let selection = trainer.train(&table).unwrap();

    assert_eq!(selection.model.penalty, PenaltyType::Ridge);
    assert_eq!(selection.model.alpha, 0.0);
    let ridge_zero = selection.results_table()[0].r2_ridge.unwrap();
    assert!((selection.held_out.r2 - ridge_zero).abs() < 1e-9);
}

#[test]
fn test_strong_lasso_zeroes_coefficients() {
    let table = synthetic_table(200, 27);
    let (y, x) = dmatrices(DEFAULT_FORMULA, &table.to_frame()).unwrap();

    let weak = fit_regularized(
        &x,
        &y,
        PenaltyType::Lasso,
        &ElasticNetConfig::default().with_alpha(0.001),
    )
    .unwrap();
    let strong = fit_regularized(
        &x,
        &y,
        PenaltyType::Lasso,
        &ElasticNetConfig::default().with_alpha(0.1),
    )
    .unwrap();
    assert!(strong.n_active() < weak.n_active());
    assert_eq!(strong.params.len(), x.n_columns());
}

#[test]
fn test_empty_grid_is_rejected() {
    let table = synthetic_table(50, 28);
    let trainer = ModelTrainer::new(TrainerConfig {
        alphas: Vec::new(),
        ..TrainerConfig::default()
    });
    assert!(trainer.train(&table).is_err());
}

#[test]
fn test_unknown_formula_column_is_rejected() {
    let table = synthetic_table(50, 29);
    let trainer = ModelTrainer::new(TrainerConfig {
        formula: "log_renda ~ salario".to_string(),
        ..TrainerConfig::default()
    });
    assert!(trainer.train(&table).is_err());
}
