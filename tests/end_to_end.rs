//! End-to-end tests: a raw income file in, a written dashboard out.

use income_dashboard::pipeline::{self, DASHBOARD_FILE, PREDICTIONS_FILE, RESULTS_FILE, SUMMARY_FILE};
use income_dashboard::*;
use std::fs;
use tempfile::TempDir;

mod common;
use common::*;

fn report_config(temp_dir: &TempDir, rows: usize) -> Config {
    let data = write_income_csv(temp_dir.path(), "previsao_de_renda.csv", &synthetic_rows(rows, 40));
    ConfigBuilder::new()
        .data_path(data)
        .output_dir(temp_dir.path().join("dashboard"))
        .build()
        .unwrap()
}

#[test]
fn test_report_writes_every_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = report_config(&temp_dir, 220);

    let page = pipeline::run_report(&config).unwrap();
    let out_dir = temp_dir.path().join("dashboard");
    assert_eq!(page, out_dir.join(DASHBOARD_FILE));

    for name in [
        DASHBOARD_FILE,
        RESULTS_FILE,
        PREDICTIONS_FILE,
        SUMMARY_FILE,
        "income_histogram.svg",
        "income_box_plot.svg",
        "employment_scatter.svg",
        "correlation_heatmap.svg",
        "parity_scatter.svg",
    ] {
        let path = out_dir.join(name);
        assert!(path.exists(), "{} was not written", name);
        assert!(fs::metadata(&path).unwrap().len() > 0, "{} is empty", name);
    }

    let html = fs::read_to_string(&page).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<svg").count(), 5);
}

#[test]
fn test_results_csv_has_one_line_per_strength() {
    let temp_dir = TempDir::new().unwrap();
    let config = report_config(&temp_dir, 200);
    pipeline::run_report(&config).unwrap();

    let csv = fs::read_to_string(temp_dir.path().join("dashboard").join(RESULTS_FILE)).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "alpha,R2 (Ridge),R2 (Lasso)");
    assert!(lines[1].starts_with("0.0,"));
}

#[test]
fn test_predictions_csv_matches_test_partition() {
    let temp_dir = TempDir::new().unwrap();
    let config = report_config(&temp_dir, 200);
    let dashboard = pipeline::run(&config).unwrap();
    dashboard.write(&config.output_dir).unwrap();

    let path = config.output_dir.join(PREDICTIONS_FILE);
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec![
            "True Value (log)",
            "Predicted Value (log)",
            "Difference (Log)",
            "True Value",
            "Predicted Value",
            "Difference"
        ]
    );

    let mut count = 0;
    for record in reader.records() {
        let record = record.unwrap();
        let true_log: f64 = record[0].parse().unwrap();
        let predicted_log: f64 = record[1].parse().unwrap();
        let true_value: f64 = record[3].parse().unwrap();
        assert_relative_close(true_value, true_log.exp(), 1e-9);
        assert_relative_close(
            record[2].parse::<f64>().unwrap(),
            true_log - predicted_log,
            1e-9,
        );
        count += 1;
    }
    assert_eq!(count, dashboard.summary.n_test);
    assert_eq!(count, dashboard.predictions.len());
}

#[test]
fn test_summary_json_parses() {
    let temp_dir = TempDir::new().unwrap();
    let config = report_config(&temp_dir, 200);
    pipeline::run_report(&config).unwrap();

    let text = fs::read_to_string(config.output_dir.join(SUMMARY_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(json["n_train"].as_u64().unwrap() + json["n_test"].as_u64().unwrap(), 200);
    assert_eq!(json["results"].as_array().unwrap().len(), 6);
    assert_eq!(json["cleaning"]["rows_read"].as_u64(), Some(200));
    assert!(json["formula"].as_str().unwrap().starts_with("log_renda ~ C(sexo)"));
    assert!(json["held_out"]["r2"].is_number());
}

#[test]
fn test_display_options_leave_model_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = report_config(&temp_dir, 200);
    let log_run = pipeline::run(&config).unwrap();

    config.scale = Scale::Original;
    config.histogram_bins = 20;
    config.preview_rows = 5;
    let original_run = pipeline::run(&config).unwrap();

    assert_eq!(log_run.summary.results, original_run.summary.results);
    assert_eq!(log_run.predictions, original_run.predictions);
    assert_ne!(log_run.charts.histogram, original_run.charts.histogram);
}

#[test]
fn test_run_without_data_path_fails() {
    let config = Config::default();
    assert!(pipeline::run(&config).is_err());
}

#[test]
fn test_out_of_range_display_options_fail() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = report_config(&temp_dir, 50);
    config.histogram_bins = 5;
    assert!(pipeline::run(&config).is_err());
}
