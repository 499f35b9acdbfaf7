//! Data pipeline integration tests.
//!
//! Loading through cleaning: dropped columns, missing employment time,
//! duplicate removal, derived columns and the preview.

use income_dashboard::*;
use tempfile::TempDir;

mod common;
use common::*;

/// Copy of `row` with a new index and client id.
fn with_new_ids(row: &str, index: usize) -> String {
    let mut fields: Vec<String> = row.split(',').map(str::to_string).collect();
    fields[0] = index.to_string();
    fields[2] = (90_000 + index).to_string();
    fields.join(",")
}

/// Copy of `row` with an empty employment time.
fn without_employment(row: &str) -> String {
    let mut fields: Vec<String> = row.split(',').map(str::to_string).collect();
    fields[12] = String::new();
    fields.join(",")
}

#[test]
fn test_cleaning_counts() {
    let temp_dir = TempDir::new().unwrap();
    let mut rows = synthetic_rows(60, 7);
    rows[3] = without_employment(&rows[3]);
    rows[10] = without_employment(&rows[10]);
    let duplicate = with_new_ids(&rows[5], 60);
    rows.push(duplicate);
    let path = write_income_csv(temp_dir.path(), "renda.csv", &rows);

    let cleaned = pipeline::load(&path, &Config::default()).unwrap();
    let report = cleaned.report;
    assert_eq!(report.rows_read, 61);
    assert_eq!(report.rows_missing_employment, 2);
    assert_eq!(report.duplicate_rows_removed, 1);
    assert_eq!(report.rows_retained, 58);
    assert_eq!(cleaned.table.len(), 58);
    assert!(cleaned.table.len() < report.rows_read);
}

#[test]
fn test_cleaned_rows_keep_file_order() {
    let temp_dir = TempDir::new().unwrap();
    let mut rows = synthetic_rows(20, 11);
    rows[0] = without_employment(&rows[0]);
    let path = write_income_csv(temp_dir.path(), "renda.csv", &rows);

    let cleaned = pipeline::load(&path, &Config::default()).unwrap();
    let first = &cleaned.table.records()[0];

    // Row 1 of the file is the first survivor.
    let expected_income: f64 = rows[1].split(',').last().unwrap().parse().unwrap();
    assert_relative_close(first.income, expected_income, 1e-12);
    assert_relative_close(first.log_income, expected_income.ln(), 1e-12);
    assert_relative_close(
        first.employment_age_ratio,
        first.employment_years / first.age as f64,
        1e-12,
    );
}

#[test]
fn test_preview_defaults_to_nine_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_income_csv(temp_dir.path(), "renda.csv", &synthetic_rows(30, 3));
    let config = Config::default();
    let cleaned = pipeline::load(&path, &config).unwrap();

    let preview = cleaned.table.head(config.preview_rows);
    assert_eq!(preview.len(), 9);
    assert_eq!(preview, &cleaned.table.records()[..9]);

    let cells = IncomeTable::display_row(&preview[0]);
    assert_eq!(cells.len(), IncomeTable::COLUMNS.len());

    // Asking for more rows than exist returns the whole table.
    assert_eq!(cleaned.table.head(1000).len(), cleaned.table.len());
}

#[test]
fn test_frame_carries_derived_columns() {
    let table = synthetic_table(40, 5);
    let frame = table.to_frame();

    assert_eq!(frame.n_rows(), 40);
    for name in IncomeTable::COLUMNS {
        assert!(frame.column(name).is_some(), "missing column {}", name);
    }
    match frame.column(COL_LOG_INCOME) {
        Some(dataset::ColumnData::Numeric(values)) => {
            for (v, income) in values.iter().zip(table.incomes()) {
                assert_relative_close(*v, income.ln(), 1e-12);
            }
        }
        other => panic!("unexpected log income column: {:?}", other),
    }
}

#[test]
fn test_custom_separator() {
    let temp_dir = TempDir::new().unwrap();
    let rows: Vec<String> = synthetic_rows(15, 9)
        .iter()
        .map(|r| r.replace(',', ";"))
        .collect();
    let path = temp_dir.path().join("renda_semicolon.csv");
    let mut content = INCOME_CSV_HEADER.replace(',', ";");
    content.push('\n');
    for row in &rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();

    let config = ConfigBuilder::new().separator(';').build().unwrap();
    let cleaned = pipeline::load(&path, &config).unwrap();
    assert_eq!(cleaned.table.len(), 15);
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = pipeline::load(temp_dir.path().join("absent.csv"), &Config::default());
    assert!(result.is_err());
}

#[test]
fn test_missing_schema_column_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("renda.csv");
    let header = INCOME_CSV_HEADER.replace(",renda", "");
    let rows: Vec<String> = synthetic_rows(5, 1)
        .iter()
        .map(|r| {
            let mut fields: Vec<&str> = r.split(',').collect();
            fields.pop();
            fields.join(",")
        })
        .collect();
    std::fs::write(&path, format!("{}\n{}\n", header, rows.join("\n"))).unwrap();

    assert!(pipeline::load(&path, &Config::default()).is_err());
}
