//! Core configuration structure and builder for the income dashboard.
//!
//! A [`Config`] carries everything one run needs: where the data lives and how
//! to read it, the model formula and penalty grid, solver limits, the
//! selection policy and the display controls of the rendered dashboard.

use crate::core::constants::*;
use crate::core::error::{DashboardError, Result};
use crate::core::types::*;
use crate::dataset::loader::LoaderConfig;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the split seed.
pub const ENV_SEED: &str = "INCOME_DASHBOARD_SEED";
/// Environment variable overriding the preview row count.
pub const ENV_PREVIEW_ROWS: &str = "INCOME_DASHBOARD_PREVIEW_ROWS";
/// Environment variable overriding the histogram bin count.
pub const ENV_BINS: &str = "INCOME_DASHBOARD_BINS";
/// Environment variable overriding the display scale.
pub const ENV_SCALE: &str = "INCOME_DASHBOARD_SCALE";

/// Main configuration structure for a dashboard run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Input
    /// Path of the delimited input file
    pub data_path: Option<PathBuf>,
    /// Field separator of the input file
    pub separator: char,
    /// Identifier columns removed right after reading
    pub drop_columns: Vec<String>,

    // Model
    /// Model formula, `response ~ terms`
    pub formula: String,
    /// Penalty strengths evaluated by the grid search
    pub alphas: Vec<f64>,
    /// Penalty families evaluated at every strength
    pub penalties: Vec<PenaltyType>,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed of the train/test shuffle
    pub random_seed: u64,
    /// Refit active columns without penalty after an L1 fit
    pub refit: bool,
    /// Maximum coordinate-descent sweeps
    pub max_iter: usize,
    /// Coordinate-descent convergence tolerance
    pub tolerance: f64,

    // Display
    /// Rows shown in the preview table
    pub preview_rows: usize,
    /// Histogram bin count
    pub histogram_bins: usize,
    /// Income display scale
    pub scale: Scale,
    /// Rows plotted in the employment-time scatter
    pub scatter_rows: usize,
    /// Directory receiving the dashboard page, charts and exports
    pub output_dir: PathBuf,
    /// Logging verbosity
    pub verbosity: VerbosityLevel,

    /// Final model selection policy
    pub selection: SelectionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: None,
            separator: ',',
            drop_columns: vec![COL_CLIENT_ID.to_string(), COL_REFERENCE_DATE.to_string()],
            formula: DEFAULT_FORMULA.to_string(),
            alphas: DEFAULT_ALPHAS.to_vec(),
            penalties: vec![PenaltyType::Ridge, PenaltyType::Lasso],
            test_fraction: DEFAULT_TEST_FRACTION,
            random_seed: DEFAULT_RANDOM_SEED,
            refit: true,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            scale: Scale::default(),
            scatter_rows: DEFAULT_SCATTER_ROWS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            verbosity: VerbosityLevel::default(),
            selection: SelectionPolicy::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.separator.is_ascii() {
            return Err(DashboardError::invalid_parameter(
                "separator",
                self.separator.to_string(),
                "must be a single ASCII character",
            ));
        }

        if !self.formula.contains('~') {
            return Err(DashboardError::invalid_parameter(
                "formula",
                self.formula.clone(),
                "must have the form 'response ~ terms'",
            ));
        }

        if self.alphas.is_empty() {
            return Err(DashboardError::invalid_parameter(
                "alphas",
                "[]",
                "at least one penalty strength is required",
            ));
        }
        if let Some(alpha) = self.alphas.iter().find(|a| !a.is_finite() || **a < 0.0) {
            return Err(DashboardError::invalid_parameter(
                "alphas",
                alpha.to_string(),
                "penalty strengths must be finite and non-negative",
            ));
        }

        if self.penalties.is_empty() {
            return Err(DashboardError::invalid_parameter(
                "penalties",
                "[]",
                "at least one penalty type is required",
            ));
        }

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(DashboardError::invalid_parameter(
                "test_fraction",
                self.test_fraction.to_string(),
                "must be in range (0.0, 1.0)",
            ));
        }

        if self.max_iter == 0 {
            return Err(DashboardError::invalid_parameter(
                "max_iter",
                "0",
                "must be at least 1",
            ));
        }

        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(DashboardError::invalid_parameter(
                "tolerance",
                self.tolerance.to_string(),
                "must be positive",
            ));
        }

        if !(MIN_PREVIEW_ROWS..=MAX_PREVIEW_ROWS).contains(&self.preview_rows) {
            return Err(DashboardError::invalid_parameter(
                "preview_rows",
                self.preview_rows.to_string(),
                format!("must be in range [{}, {}]", MIN_PREVIEW_ROWS, MAX_PREVIEW_ROWS),
            ));
        }

        if !(MIN_HISTOGRAM_BINS..=MAX_HISTOGRAM_BINS).contains(&self.histogram_bins) {
            return Err(DashboardError::invalid_parameter(
                "histogram_bins",
                self.histogram_bins.to_string(),
                format!(
                    "must be in range [{}, {}]",
                    MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS
                ),
            ));
        }

        if self.scatter_rows == 0 {
            return Err(DashboardError::invalid_parameter(
                "scatter_rows",
                "0",
                "must be at least 1",
            ));
        }

        if let SelectionPolicy::Fixed { alpha, .. } = self.selection {
            if !alpha.is_finite() || alpha < 0.0 {
                return Err(DashboardError::invalid_parameter(
                    "selection.alpha",
                    alpha.to_string(),
                    "must be finite and non-negative",
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                DashboardError::config(format!("Failed to parse JSON config: {}", e))
            })?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                DashboardError::config(format!("Failed to parse TOML config: {}", e))
            })?,
            _ => {
                return Err(DashboardError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self).map_err(|e| {
                DashboardError::config(format!("Failed to serialize to JSON: {}", e))
            })?,
            Some("toml") => toml::to_string_pretty(self).map_err(|e| {
                DashboardError::config(format!("Failed to serialize to TOML: {}", e))
            })?,
            _ => {
                return Err(DashboardError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| DashboardError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load the default configuration with environment overrides applied
    pub fn load_from_environment() -> Result<Self> {
        let mut config = Config::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Apply `INCOME_DASHBOARD_*` environment variables to this configuration
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(ENV_SEED) {
            self.random_seed = val
                .trim()
                .parse()
                .map_err(|_| DashboardError::config(format!("Invalid {}", ENV_SEED)))?;
        }

        if let Ok(val) = std::env::var(ENV_PREVIEW_ROWS) {
            self.preview_rows = val
                .trim()
                .parse()
                .map_err(|_| DashboardError::config(format!("Invalid {}", ENV_PREVIEW_ROWS)))?;
        }

        if let Ok(val) = std::env::var(ENV_BINS) {
            self.histogram_bins = val
                .trim()
                .parse()
                .map_err(|_| DashboardError::config(format!("Invalid {}", ENV_BINS)))?;
        }

        if let Ok(val) = std::env::var(ENV_SCALE) {
            self.scale = val
                .trim()
                .parse()
                .map_err(|e: String| DashboardError::config(format!("Invalid {}: {}", ENV_SCALE, e)))?;
        }

        self.validate()
    }

    /// Reader settings derived from this configuration
    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig::default()
            .with_separator(self.separator as u8)
            .with_drop_columns(self.drop_columns.clone())
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the input file path
    pub fn data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.data_path = Some(path.into());
        self
    }

    /// Set the field separator
    pub fn separator(mut self, separator: char) -> Self {
        if !separator.is_ascii() {
            self.validation_errors
                .push("separator must be a single ASCII character".to_string());
        }
        self.config.separator = separator;
        self
    }

    /// Set the identifier columns removed at load time
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.drop_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set the model formula
    pub fn formula<S: Into<String>>(mut self, formula: S) -> Self {
        self.config.formula = formula.into();
        self
    }

    /// Set the penalty strength grid
    pub fn alphas(mut self, alphas: Vec<f64>) -> Self {
        if alphas.iter().any(|a| !a.is_finite() || *a < 0.0) {
            self.validation_errors
                .push("alphas must be finite and non-negative".to_string());
        }
        self.config.alphas = alphas;
        self
    }

    /// Set the penalty families
    pub fn penalties(mut self, penalties: Vec<PenaltyType>) -> Self {
        self.config.penalties = penalties;
        self
    }

    /// Set the held-out fraction
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        if !(fraction > 0.0 && fraction < 1.0) {
            self.validation_errors
                .push("test_fraction must be in range (0.0, 1.0)".to_string());
        }
        self.config.test_fraction = fraction;
        self
    }

    /// Set the split seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Enable or disable the post-L1 refit
    pub fn refit(mut self, refit: bool) -> Self {
        self.config.refit = refit;
        self
    }

    /// Set the coordinate-descent sweep limit
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        if max_iter == 0 {
            self.validation_errors
                .push("max_iter must be at least 1".to_string());
        }
        self.config.max_iter = max_iter;
        self
    }

    /// Set the coordinate-descent tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the final model selection policy
    pub fn selection(mut self, selection: SelectionPolicy) -> Self {
        self.config.selection = selection;
        self
    }

    /// Set the preview row count
    pub fn preview_rows(mut self, rows: usize) -> Self {
        if !(MIN_PREVIEW_ROWS..=MAX_PREVIEW_ROWS).contains(&rows) {
            self.validation_errors.push(format!(
                "preview_rows must be in range [{}, {}]",
                MIN_PREVIEW_ROWS, MAX_PREVIEW_ROWS
            ));
        }
        self.config.preview_rows = rows;
        self
    }

    /// Set the histogram bin count
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        if !(MIN_HISTOGRAM_BINS..=MAX_HISTOGRAM_BINS).contains(&bins) {
            self.validation_errors.push(format!(
                "histogram_bins must be in range [{}, {}]",
                MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS
            ));
        }
        self.config.histogram_bins = bins;
        self
    }

    /// Set the income display scale
    pub fn scale(mut self, scale: Scale) -> Self {
        self.config.scale = scale;
        self
    }

    /// Set the scatter row limit
    pub fn scatter_rows(mut self, rows: usize) -> Self {
        self.config.scatter_rows = rows;
        self
    }

    /// Set the output directory
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Set the logging verbosity
    pub fn verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        if !self.validation_errors.is_empty() {
            return Err(DashboardError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
