//! Configuration management for the income dashboard.
//!
//! Configuration comes from three layers, applied in order: defaults, an
//! optional `.toml`/`.json` file, then `INCOME_DASHBOARD_*` environment
//! variables. The CLI applies its own flags last.

pub mod core;

pub use self::core::{Config, ConfigBuilder, ENV_BINS, ENV_PREVIEW_ROWS, ENV_SCALE, ENV_SEED};

use crate::core::error::Result;
use std::path::Path;

/// Default configuration file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "income_dashboard.toml";

/// Resolve a configuration from an optional file plus environment overrides.
pub fn resolve_config<P: AsRef<Path>>(file: Option<P>) -> Result<Config> {
    let mut config = match file {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    config.apply_environment_overrides()?;
    Ok(config)
}
