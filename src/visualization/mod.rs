//! Charts and the dashboard page.
//!
//! Rendering is a pure function of the cleaned table, the predictions and
//! the [`DisplayOptions`]; the display options never influence the model.

pub mod charts;
pub mod html;
pub mod svg;

pub use charts::{
    box_stats, correlation_heatmap, employment_scatter, histogram_bins, income_box_plot,
    income_histogram, parity_scatter, trend_line, BoxStats, HistogramBins, TrendLine,
};
pub use html::{dashboard_page, PageContent, DATA_DICTIONARY};

use crate::config::Config;
use crate::core::constants::*;
use crate::core::error::{DashboardError, Result};
use crate::core::types::Scale;
use crate::dataset::{CorrelationMatrix, IncomeTable};
use crate::report::Predictions;
use log::debug;
use serde::{Deserialize, Serialize};

/// User-facing display controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub preview_rows: usize,
    pub bins: usize,
    pub scale: Scale,
    pub scatter_rows: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions {
            preview_rows: DEFAULT_PREVIEW_ROWS,
            bins: DEFAULT_HISTOGRAM_BINS,
            scale: Scale::default(),
            scatter_rows: DEFAULT_SCATTER_ROWS,
        }
    }
}

impl DisplayOptions {
    pub fn from_config(config: &Config) -> Self {
        DisplayOptions {
            preview_rows: config.preview_rows,
            bins: config.histogram_bins,
            scale: config.scale,
            scatter_rows: config.scatter_rows,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_PREVIEW_ROWS..=MAX_PREVIEW_ROWS).contains(&self.preview_rows) {
            return Err(DashboardError::invalid_parameter(
                "preview_rows",
                self.preview_rows.to_string(),
                format!("must be in {}..={}", MIN_PREVIEW_ROWS, MAX_PREVIEW_ROWS),
            ));
        }
        if !(MIN_HISTOGRAM_BINS..=MAX_HISTOGRAM_BINS).contains(&self.bins) {
            return Err(DashboardError::invalid_parameter(
                "bins",
                self.bins.to_string(),
                format!("must be in {}..={}", MIN_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS),
            ));
        }
        if self.scatter_rows == 0 {
            return Err(DashboardError::invalid_parameter(
                "scatter_rows",
                "0",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Rendered SVG documents of one dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub histogram: String,
    pub box_plot: String,
    pub employment_scatter: String,
    pub heatmap: String,
    pub parity: String,
}

impl ChartSet {
    /// File names and contents, in page order.
    pub fn files(&self) -> [(&'static str, &str); 5] {
        [
            ("income_histogram.svg", self.histogram.as_str()),
            ("income_box_plot.svg", self.box_plot.as_str()),
            ("employment_scatter.svg", self.employment_scatter.as_str()),
            ("correlation_heatmap.svg", self.heatmap.as_str()),
            ("parity_scatter.svg", self.parity.as_str()),
        ]
    }
}

/// Render every chart of the dashboard.
pub fn render_charts(
    table: &IncomeTable,
    predictions: &Predictions,
    options: &DisplayOptions,
) -> Result<ChartSet> {
    options.validate()?;
    let correlations = CorrelationMatrix::from_frame(&table.to_frame());
    let charts = ChartSet {
        histogram: income_histogram(table, options.scale, options.bins)?,
        box_plot: income_box_plot(table, options.scale)?,
        employment_scatter: employment_scatter(table, options.scale, options.scatter_rows)?,
        heatmap: correlation_heatmap(&correlations)?,
        parity: parity_scatter(predictions, options.scale)?,
    };
    debug!("Rendered {} charts on the {} scale", charts.files().len(), options.scale);
    Ok(charts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_options_bounds() {
        assert!(DisplayOptions::default().validate().is_ok());
        let mut options = DisplayOptions::default();
        options.preview_rows = 4;
        assert!(options.validate().is_err());
        options.preview_rows = 100;
        options.bins = 201;
        assert!(options.validate().is_err());
    }
}
