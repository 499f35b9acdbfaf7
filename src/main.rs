//! income-dashboard CLI: render the income dashboard, fit the model grid or
//! preview the cleaned data.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use income_dashboard::config::resolve_config;
use income_dashboard::{
    pipeline, report, Config, DashboardError, IncomeTable, ModelTrainer, RunSummary, Scale,
    TrainerConfig, MAX_HISTOGRAM_BINS, MAX_PREVIEW_ROWS, MIN_HISTOGRAM_BINS, MIN_PREVIEW_ROWS,
};
use log::error;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "income-dashboard")]
#[command(about = "Exploratory analysis and ridge/lasso income models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the full dashboard (HTML page, SVG charts, CSV and JSON exports)
    Report {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Rows shown in the preview table
        #[arg(long, value_parser = clap::value_parser!(u64).range(MIN_PREVIEW_ROWS as u64..=MAX_PREVIEW_ROWS as u64))]
        rows: Option<u64>,

        /// Histogram bin count
        #[arg(long, value_parser = clap::value_parser!(u64).range(MIN_HISTOGRAM_BINS as u64..=MAX_HISTOGRAM_BINS as u64))]
        bins: Option<u64>,

        /// Income display scale (log or original)
        #[arg(long)]
        scale: Option<Scale>,

        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Fit the penalty grid and print the results table and the chosen model
    Fit {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Configuration file (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the first rows of the cleaned data
    Preview {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Number of rows
        #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u64).range(MIN_PREVIEW_ROWS as u64..=MAX_PREVIEW_ROWS as u64))]
        rows: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            data,
            out,
            rows,
            bins,
            scale,
            config,
        } => cmd_report(&data, out, rows, bins, scale, config.as_deref()),
        Commands::Fit { data, config, json } => cmd_fit(&data, config.as_deref(), json),
        Commands::Preview { data, rows } => cmd_preview(&data, rows as usize),
    };

    if let Err(e) = result {
        error!("{} error: {:#}", error_category(&e), e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Category of the crate error behind `e`, or `"other"`.
fn error_category(e: &anyhow::Error) -> &'static str {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<DashboardError>())
        .map_or("other", DashboardError::category)
}

fn load_config(file: Option<&Path>, data: &Path) -> Result<Config> {
    let mut config = resolve_config(file)
        .with_context(|| match file {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Failed to read configuration from the environment".to_string(),
        })?;
    config.data_path = Some(data.to_path_buf());
    income_dashboard::init_with_level(config.verbosity);
    Ok(config)
}

fn cmd_report(
    data: &Path,
    out: Option<PathBuf>,
    rows: Option<u64>,
    bins: Option<u64>,
    scale: Option<Scale>,
    config_file: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_file, data)?;
    if let Some(out) = out {
        config.output_dir = out;
    }
    if let Some(rows) = rows {
        config.preview_rows = rows as usize;
    }
    if let Some(bins) = bins {
        config.histogram_bins = bins as usize;
    }
    if let Some(scale) = scale {
        config.scale = scale;
    }

    let page = pipeline::run_report(&config)
        .with_context(|| format!("Failed to build the dashboard for {}", data.display()))?;
    println!("Dashboard written to {}", page.display());
    Ok(())
}

fn cmd_fit(data: &Path, config_file: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_file, data)?;
    let cleaned = pipeline::load(data, &config)
        .with_context(|| format!("Failed to load {}", data.display()))?;
    let selection = ModelTrainer::new(TrainerConfig::from_config(&config))
        .train(&cleaned.table)
        .context("Model training failed")?;

    if json {
        let summary = RunSummary::new(cleaned.report, &selection, config.selection);
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    println!("{}", cleaned.report);
    println!();
    println!("{:<8} {:>12} {:>12}", "alpha", "R2 (Ridge)", "R2 (Lasso)");
    let cell = |v: Option<f64>| v.map(|v| format!("{:.6}", v)).unwrap_or_default();
    for row in selection.results_table() {
        println!(
            "{:<8} {:>12} {:>12}",
            row.alpha,
            cell(row.r2_ridge),
            cell(row.r2_lasso)
        );
    }

    let model = &selection.model;
    println!();
    println!(
        "Chosen model: {} at alpha = {} ({})",
        model.penalty, model.alpha, config.selection
    );
    println!(
        "Held-out R2 = {:.6}, RMSE = {:.6}, MAE = {:.6}",
        selection.held_out.r2, selection.held_out.rmse, selection.held_out.mae
    );
    let predictions = report::build_predictions(&selection)?;
    println!("{} test predictions", predictions.len());
    Ok(())
}

fn cmd_preview(data: &Path, rows: usize) -> Result<()> {
    let config = load_config(None, data)?;
    let cleaned = pipeline::load(data, &config)
        .with_context(|| format!("Failed to load {}", data.display()))?;

    let table: Vec<Vec<String>> = cleaned
        .table
        .head(rows)
        .iter()
        .map(IncomeTable::display_row)
        .collect();
    let widths: Vec<usize> = IncomeTable::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            table
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(IncomeTable::COLUMNS.to_vec()));
    for row in &table {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    println!("({} of {} rows)", table.len(), cleaned.table.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_category_through_context() {
        let err = Err::<(), _>(DashboardError::training("empty partition"))
            .context("Model training failed")
            .unwrap_err();
        assert_eq!(error_category(&err), "training");
        assert_eq!(error_category(&anyhow!("plain")), "other");
    }
}
