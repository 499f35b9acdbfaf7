//! End-to-end run of the dashboard.
//!
//! Every stage takes the previous stage's value and returns a new one:
//! [`CleanedTable`] → [`ModelSelection`] → [`Predictions`] → [`Dashboard`].
//! Nothing is shared between stages except what is passed explicitly.

use crate::config::Config;
use crate::core::error::{DashboardError, Result};
use crate::dataset::{load_income_table, CleaningReport, IncomeTable};
use crate::model::{ModelSelection, ModelTrainer, TrainerConfig};
use crate::report::{
    build_predictions, write_predictions_csv, write_results_csv, Predictions, RunSummary,
};
use crate::visualization::{dashboard_page, render_charts, ChartSet, DisplayOptions, PageContent};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the dashboard page inside the output directory.
pub const DASHBOARD_FILE: &str = "dashboard.html";
pub const RESULTS_FILE: &str = "results.csv";
pub const PREDICTIONS_FILE: &str = "predictions.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// The cleaned dataset together with its cleaning counts.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    pub table: IncomeTable,
    pub report: CleaningReport,
}

/// Load and clean the input file named by `path`.
pub fn load<P: AsRef<Path>>(path: P, config: &Config) -> Result<CleanedTable> {
    info!("Loading {}", path.as_ref().display());
    let (table, report) = load_income_table(path, config)?;
    Ok(CleanedTable { table, report })
}

/// Split, grid-search and fit the final model.
pub fn train(cleaned: &CleanedTable, config: &Config) -> Result<ModelSelection> {
    ModelTrainer::new(TrainerConfig::from_config(config)).train(&cleaned.table)
}

/// Rendered dashboard, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub html: String,
    pub charts: ChartSet,
    pub summary: RunSummary,
    pub predictions: Predictions,
}

/// Render charts and page for a trained model.
pub fn build_dashboard(
    cleaned: &CleanedTable,
    selection: &ModelSelection,
    predictions: Predictions,
    options: &DisplayOptions,
    config: &Config,
) -> Result<Dashboard> {
    let charts = render_charts(&cleaned.table, &predictions, options)?;
    let html = dashboard_page(&PageContent {
        table: &cleaned.table,
        cleaning: &cleaned.report,
        selection,
        predictions: &predictions,
        charts: &charts,
        options,
    });
    let summary = RunSummary::new(cleaned.report, selection, config.selection);
    Ok(Dashboard {
        html,
        charts,
        summary,
        predictions,
    })
}

impl Dashboard {
    /// Write the page, every chart and the exports into `out_dir`, creating
    /// it when missing. Returns the path of the page.
    pub fn write<P: AsRef<Path>>(&self, out_dir: P) -> Result<PathBuf> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)?;

        for (name, svg) in self.charts.files() {
            fs::write(out_dir.join(name), svg)?;
        }
        write_results_csv(out_dir.join(RESULTS_FILE), &self.summary.results)?;
        write_predictions_csv(out_dir.join(PREDICTIONS_FILE), &self.predictions)?;
        self.summary.write_json(out_dir.join(SUMMARY_FILE))?;

        let page = out_dir.join(DASHBOARD_FILE);
        fs::write(&page, &self.html)?;
        info!("Dashboard written to {}", page.display());
        Ok(page)
    }
}

/// Every stage with the settings in `config`, returning the rendered
/// dashboard.
pub fn run(config: &Config) -> Result<Dashboard> {
    config.validate()?;
    let path = config
        .data_path
        .as_ref()
        .ok_or_else(|| DashboardError::config("No input file configured (data_path)"))?;

    let cleaned = load(path, config)?;
    let selection = train(&cleaned, config)?;
    let predictions = build_predictions(&selection)?;
    build_dashboard(
        &cleaned,
        &selection,
        predictions,
        &DisplayOptions::from_config(config),
        config,
    )
}

/// [`run`], then write everything to the configured output directory.
pub fn run_report(config: &Config) -> Result<PathBuf> {
    run(config)?.write(&config.output_dir)
}
