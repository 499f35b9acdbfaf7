//! Regularized linear regression.
//!
//! - [`linalg`]: Jacobi eigendecomposition, ridge and least-squares solves
//! - [`elastic_net`]: the single elastic-net entry point for ridge and lasso
//! - [`grid`]: penalty grid search, selection and the final fit

pub mod elastic_net;
pub mod grid;
pub mod linalg;

pub use elastic_net::{fit_regularized, ElasticNet, ElasticNetConfig, FittedModel};
pub use grid::{
    grid_search, results_table, select_model, GridPoint, ModelSelection, ModelTrainer,
    ResultsRow, TrainerConfig,
};
