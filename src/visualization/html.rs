//! HTML tables and the dashboard page.

use crate::core::constants::*;
use crate::core::types::Scale;
use crate::dataset::{CleaningReport, IncomeTable};
use crate::model::{ModelSelection, ResultsRow};
use crate::report::Predictions;
use crate::visualization::svg::escape;
use crate::visualization::{ChartSet, DisplayOptions};

/// Variable, description and type of every column of the cleaned table.
pub const DATA_DICTIONARY: [(&str, &str, &str); 14] = [
    (COL_GENDER, "Gender (Gender of the client)", "object"),
    (COL_OWNS_VEHICLE, "Vehicle ownership (Ownership of a vehicle or not)", "bool"),
    (COL_OWNS_PROPERTY, "Property ownership (Ownership of property or not)", "bool"),
    (COL_CHILDREN, "Number of children (The number of children the client has)", "int"),
    (
        COL_INCOME_TYPE,
        "Income type (Entrepreneur, Employee, Public Servant, Pensioner, or Scholar)",
        "object",
    ),
    (
        COL_EDUCATION,
        "Education (Primary, Secondary, Incomplete Higher Education, Complete Higher Education, or Postgraduate)",
        "object",
    ),
    (
        COL_MARITAL_STATUS,
        "Marital status (Single, Married, Widowed, Union, or Separated)",
        "object",
    ),
    (
        COL_RESIDENCE_TYPE,
        "Type of residence (House, Governmental, With parents, Rent, Studio, or Community)",
        "object",
    ),
    (COL_AGE, "Age (Age of the client)", "int"),
    (
        COL_EMPLOYMENT_YEARS,
        "Employment duration (in years) (Employment duration of the client)",
        "float",
    ),
    (
        COL_HOUSEHOLD_SIZE,
        "Number of residents (Number of people living in the client's residence)",
        "float",
    ),
    (COL_INCOME, "Income (Income of the client) (Dependent variable)", "float"),
    (
        COL_EMPLOYMENT_AGE_RATIO,
        "Employment duration to age ratio (Employment duration divided by age; higher for those who have worked longer and are younger)",
        "float",
    ),
    (
        COL_LOG_INCOME,
        "Logarithm of income (Natural logarithm of the income, which dampens outliers)",
        "float",
    ),
];

/// A `<table>` with a header row. Cell text is escaped.
pub fn html_table<H, R, C>(headers: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<C>>,
    C: AsRef<str>,
{
    let mut html = String::from("<table class=\"data-table\">\n<thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape(header.as_ref())));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape(cell.as_ref())));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

pub fn dictionary_table() -> String {
    html_table(
        &["Variable", "Description", "Type"],
        DATA_DICTIONARY
            .iter()
            .map(|(name, description, kind)| vec![*name, *description, *kind]),
    )
}

/// The first `rows` records of the cleaned table.
pub fn preview_table(table: &IncomeTable, rows: usize) -> String {
    html_table(
        &IncomeTable::COLUMNS,
        table.head(rows).iter().map(IncomeTable::display_row),
    )
}

fn format_r2(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.6}", v),
        Some(_) => "NaN".to_string(),
        None => String::new(),
    }
}

/// Strength against held-out R² for both penalties.
pub fn results_table(rows: &[ResultsRow]) -> String {
    html_table(
        &["alpha", "R2 (Ridge)", "R2 (Lasso)"],
        rows.iter().map(|row| {
            vec![
                row.alpha.to_string(),
                format_r2(row.r2_ridge),
                format_r2(row.r2_lasso),
            ]
        }),
    )
}

pub fn predictions_table(predictions: &Predictions) -> String {
    html_table(
        &[
            "True Value (log)",
            "Predicted Value (log)",
            "Difference (Log)",
            "True Value",
            "Predicted Value",
            "Difference",
        ],
        predictions.records().iter().map(|r| {
            vec![
                format!("{:.6}", r.true_log),
                format!("{:.6}", r.predicted_log),
                format!("{:.6}", r.difference_log),
                format!("{:.2}", r.true_value),
                format!("{:.2}", r.predicted_value),
                format!("{:.2}", r.difference),
            ]
        }),
    )
}

const STYLE: &str = "body { font-family: sans-serif; margin: 2em auto; max-width: 1100px; color: #222; }
h1 { text-align: center; }
.data-table { border-collapse: collapse; margin: 1em 0; font-size: 0.85em; }
.data-table th, .data-table td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
.data-table th { background: #f0f0f0; }
.chart { margin: 1.5em 0; }
.scroll { max-height: 480px; overflow-y: auto; }
pre { background: #f6f6f6; padding: 0.8em; white-space: pre-wrap; }";

/// Everything shown on the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct PageContent<'a> {
    pub table: &'a IncomeTable,
    pub cleaning: &'a CleaningReport,
    pub selection: &'a ModelSelection,
    pub predictions: &'a Predictions,
    pub charts: &'a ChartSet,
    pub options: &'a DisplayOptions,
}

/// The self-contained dashboard page with every chart inlined.
pub fn dashboard_page(content: &PageContent<'_>) -> String {
    let options = content.options;
    let selection = content.selection;
    let model = &selection.model;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Income Prediction Dashboard</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n");
    html.push_str("<h1>Income Prediction Dashboard</h1>\n");
    html.push_str(
        "<p>Exploratory analysis of the income dataset and a regularized linear model \
         predicting an individual's income from demographic and employment attributes.</p>\n",
    );

    html.push_str("<h2>Exploratory Analysis of the Data</h2>\n<h3>Data Dictionary</h3>\n");
    html.push_str(&dictionary_table());

    html.push_str(&format!(
        "<h3>Cleaned Data</h3>\n<p>{}.</p>\n<p>First {} rows:</p>\n",
        escape(&content.cleaning.to_string()),
        content.table.head(options.preview_rows).len()
    ));
    html.push_str(&preview_table(content.table, options.preview_rows));

    let scale_name = match options.scale {
        Scale::Log => "Log Scale",
        Scale::Original => "Original Scale",
    };
    html.push_str(&format!(
        "<h3>Distribution of Income ({})</h3>\n<div class=\"chart\">\n{}</div>\n",
        scale_name, content.charts.histogram
    ));
    html.push_str(&format!(
        "<h3>Box Plot of Income ({})</h3>\n<div class=\"chart\">\n{}</div>\n",
        scale_name, content.charts.box_plot
    ));
    html.push_str(&format!(
        "<h3>Employment Time vs. Income ({})</h3>\n<p>First {} rows with an OLS trend line.</p>\n<div class=\"chart\">\n{}</div>\n",
        scale_name, options.scatter_rows, content.charts.employment_scatter
    ));
    html.push_str(&format!(
        "<h3>Correlation Heatmap</h3>\n<p>Pearson correlations over all columns; text and \
         boolean columns are label-encoded in sorted order. Undefined correlations are grey.</p>\n\
         <div class=\"chart\">\n{}</div>\n",
        content.charts.heatmap
    ));

    html.push_str("<h2>Model Training</h2>\n");
    html.push_str(&format!(
        "<h3>Train-Test Split</h3>\n<p>{} training rows, {} test rows.</p>\n",
        selection.split.n_train(),
        selection.split.n_test()
    ));
    html.push_str(&format!(
        "<h3>Model Formula</h3>\n<pre>{}</pre>\n<p>{} design columns.</p>\n",
        escape(&selection.design.formula.to_string()),
        selection.design.n_columns()
    ));
    html.push_str("<h3>Ridge and Lasso Regression</h3>\n");
    html.push_str(&results_table(&selection.results_table()));

    html.push_str(&format!(
        "<h3>Final Model</h3>\n<p>{} with alpha = {}: held-out R² = {}, RMSE (log) = {:.6}, \
         {} of {} coefficients non-zero.</p>\n",
        model.penalty,
        model.alpha,
        format_r2(Some(selection.held_out.r2)),
        selection.held_out.rmse,
        model.n_active(),
        model.params.len()
    ));
    html.push_str(&html_table(
        &["Column", "Coefficient"],
        model
            .coefficients()
            .map(|(name, value)| vec![name.to_string(), format!("{:.6}", value)]),
    ));

    html.push_str("<h3>Predictions</h3>\n<div class=\"scroll\">\n");
    html.push_str(&predictions_table(content.predictions));
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<h3>True vs Predicted Values ({})</h3>\n<p>The red dashed line marks perfect predictions.</p>\n<div class=\"chart\">\n{}</div>\n",
        scale_name, content.charts.parity
    ));

    html.push_str("</body>\n</html>\n");
    html
}
