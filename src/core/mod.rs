//! Core infrastructure module for the income dashboard.
//!
//! # Organization
//!
//! - [`types`]: Shared enumerations (penalty family, display scale, selection policy)
//! - [`constants`]: Column names, defaults and display limits
//! - [`error`]: Error types and the crate `Result` alias

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{DashboardError, DatasetError, FormulaError, Result};
pub use types::*;

use std::sync::OnceLock;

static LOGGING: OnceLock<()> = OnceLock::new();

/// Initialize the logging subsystem with the given default verbosity.
///
/// `RUST_LOG`, when set, takes precedence. Subsequent calls are no-ops.
pub fn initialize_logging(verbosity: VerbosityLevel) {
    LOGGING.get_or_init(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(verbosity.level_filter());
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }
        // Another logger may already be installed by the embedding application.
        let _ = builder.try_init();
    });
}

/// Check if logging has been initialized by this crate.
pub fn is_logging_initialized() -> bool {
    LOGGING.get().is_some()
}
