//! # Income Dashboard
//!
//! Exploratory analysis and regularized linear regression for predicting
//! individual income from demographic and employment attributes.
//!
//! A run loads a delimited income file, cleans it, fits ridge and lasso
//! models over a grid of penalty strengths, selects the final model by
//! held-out R² and renders a self-contained HTML dashboard with SVG charts,
//! CSV tables and a JSON summary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use income_dashboard::ConfigBuilder;
//!
//! # fn main() -> income_dashboard::Result<()> {
//! income_dashboard::init();
//!
//! let config = ConfigBuilder::new()
//!     .data_path("previsao_de_renda.csv")
//!     .output_dir("dashboard")
//!     .build()?;
//!
//! let page = income_dashboard::pipeline::run_report(&config)?;
//! println!("Dashboard written to {}", page.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Step by step
//!
//! ```rust,no_run
//! use income_dashboard::{pipeline, report, Config, ModelTrainer, TrainerConfig};
//!
//! # fn main() -> income_dashboard::Result<()> {
//! let config = Config::default();
//! let cleaned = pipeline::load("previsao_de_renda.csv", &config)?;
//! let selection = ModelTrainer::new(TrainerConfig::from_config(&config)).train(&cleaned.table)?;
//! for row in selection.results_table() {
//!     println!("{:<6} {:?} {:?}", row.alpha, row.r2_ridge, row.r2_lasso);
//! }
//! let predictions = report::build_predictions(&selection)?;
//! println!("{} test rows", predictions.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: error types, shared enums, constants and logging setup
//! - [`config`]: configuration file, environment and builder
//! - [`dataset`]: loading, cleaning, frames, encoding and the train/test split
//! - [`formula`]: model formula parsing and design matrices
//! - [`model`]: elastic-net solver, grid search and model selection
//! - [`metrics_eval`]: R² and companion regression metrics
//! - [`report`]: prediction diagnostics and exports
//! - [`visualization`]: SVG charts and the dashboard page
//! - [`pipeline`]: the end-to-end run

#![warn(missing_debug_implementations, rust_2018_idioms)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset management module
pub mod dataset;

// Formula parsing and design matrices
pub mod formula;

// Metrics evaluation module
pub mod metrics_eval;

// Regularized regression
pub mod model;

// Predictions and exports
pub mod report;

// Charts and the dashboard page
pub mod visualization;

// End-to-end run
pub mod pipeline;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{DashboardError, DatasetError, FormulaError, Result},
    types::*,
};

// Re-export configuration functionality
pub use config::{Config, ConfigBuilder};

// Re-export dataset functionality
pub use dataset::{
    clean, load_income_table, load_raw, CleaningReport, Frame, IncomeRecord, IncomeTable,
    LoaderConfig, TrainTestSplit,
};

// Re-export formula functionality
pub use formula::{dmatrices, parse_formula, DesignInfo, DesignMatrix};

// Re-export model functionality
pub use model::{
    fit_regularized, ElasticNet, ElasticNetConfig, FittedModel, GridPoint, ModelSelection,
    ModelTrainer, ResultsRow, TrainerConfig,
};

// Re-export metrics evaluation functionality
pub use metrics_eval::{evaluate_regression, r2_score, RegressionMetrics};

// Re-export report and visualization functionality
pub use report::{PredictionRecord, Predictions, RunSummary};
pub use visualization::{ChartSet, DisplayOptions};

// Version information
pub use self::core::constants::INCOME_DASHBOARD_VERSION as VERSION;

/// Initialize logging at the default (`info`) level.
///
/// `RUST_LOG` overrides the level when set. Calling this more than once is
/// harmless.
pub fn init() {
    init_with_level(VerbosityLevel::default());
}

/// Initialize logging with an explicit default level.
pub fn init_with_level(verbosity: VerbosityLevel) {
    crate::core::initialize_logging(verbosity);
}

/// Check if logging has been initialized.
pub fn is_initialized() -> bool {
    crate::core::is_logging_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_initialization() {
        init();
        assert!(is_initialized());
        // Second call is a no-op.
        init_with_level(VerbosityLevel::Debug);
        assert!(is_initialized());
    }

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_defaults_match_dashboard() {
        assert_eq!(DEFAULT_ALPHAS, [0.0, 0.001, 0.005, 0.01, 0.05, 0.1]);
        assert_eq!(DEFAULT_RANDOM_SEED, 40);
        let config = Config::default();
        assert_eq!(config.alphas, DEFAULT_ALPHAS.to_vec());
        assert_eq!(config.preview_rows, 9);
        assert_eq!(config.histogram_bins, 80);
    }
}
