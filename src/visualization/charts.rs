//! Chart builders. Each takes data plus display options and returns an SVG
//! document; none of them mutate their input.

use crate::core::constants::LOG_SCALE_TICKS;
use crate::core::error::{DashboardError, Result};
use crate::core::types::Scale;
use crate::dataset::encoding::CorrelationMatrix;
use crate::dataset::IncomeTable;
use crate::model::linalg::least_squares;
use crate::report::Predictions;
use crate::visualization::svg::{LinearScale, Margins, SvgCanvas};
use ndarray::{Array1, Array2};

const BAR_FILL: &str = "#636efa";
const POINT_FILL: &str = "#636efa";
const TREND_STROKE: &str = "green";
const PARITY_STROKE: &str = "red";
const MISSING_FILL: &str = "#bdbdbd";

/// Viridis colour stops, dark to bright.
const VIRIDIS: [(u8, u8, u8); 10] = [
    (0x44, 0x01, 0x54),
    (0x48, 0x28, 0x78),
    (0x3e, 0x49, 0x89),
    (0x31, 0x68, 0x8e),
    (0x26, 0x82, 0x8e),
    (0x1f, 0x9e, 0x89),
    (0x35, 0xb7, 0x79),
    (0x6e, 0xce, 0x58),
    (0xb5, 0xde, 0x2b),
    (0xfd, 0xe7, 0x25),
];

/// Reject series that cannot be plotted.
pub fn check_series(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(DashboardError::rendering(format!(
            "No values to plot for '{}'",
            name
        )));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(DashboardError::rendering(format!(
            "Non-finite value {} in '{}'",
            bad, name
        )));
    }
    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 0.5 };
    (lo - pad, hi + pad)
}

fn format_tick(value: f64, step: f64) -> String {
    if step >= 1.0 || value == 0.0 {
        format!("{:.0}", value)
    } else {
        let decimals = (-step.log10().floor()) as usize;
        format!("{:.*}", decimals, value)
    }
}

/// Round-numbered ticks covering `[lo, hi]`.
pub fn linear_ticks(lo: f64, hi: f64) -> Vec<(f64, String)> {
    if !(hi > lo) {
        return vec![(lo, format_tick(lo, 1.0))];
    }
    let raw = (hi - lo) / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = match raw / magnitude {
        n if n < 1.5 => magnitude,
        n if n < 3.5 => 2.0 * magnitude,
        n if n < 7.5 => 5.0 * magnitude,
        _ => 10.0 * magnitude,
    };

    let mut ticks = Vec::new();
    let mut value = (lo / step).ceil() * step;
    while value <= hi + step * 1e-9 {
        ticks.push((value, format_tick(value, step)));
        value += step;
    }
    ticks
}

/// Axis ticks for an income axis. On the log scale the ticks sit at
/// `ln(1000), ..., ln(10000)` and carry the income value as label.
pub fn income_ticks(scale: Scale, lo: f64, hi: f64) -> Vec<(f64, String)> {
    match scale {
        Scale::Log => {
            let ticks: Vec<(f64, String)> = LOG_SCALE_TICKS
                .iter()
                .map(|v| (v.ln(), format!("{:.0}", v)))
                .filter(|(t, _)| *t >= lo && *t <= hi)
                .collect();
            if ticks.is_empty() {
                linear_ticks(lo, hi)
            } else {
                ticks
            }
        }
        Scale::Original => linear_ticks(lo, hi),
    }
}

fn income_series(table: &IncomeTable, scale: Scale) -> (Vec<f64>, &'static str) {
    match scale {
        Scale::Log => (table.log_incomes(), "Income (log scale)"),
        Scale::Original => (table.incomes(), "Income"),
    }
}

/// Equal-width histogram counts.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    /// `counts.len() + 1` edges, ascending
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Count `values` into `bins` equal-width bins spanning their range. The
/// maximum falls in the last bin.
pub fn histogram_bins(values: &[f64], bins: usize) -> Result<HistogramBins> {
    check_series("histogram", values)?;
    if bins == 0 {
        return Err(DashboardError::rendering("Histogram needs at least one bin"));
    }

    let (lo, hi) = min_max(values);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    Ok(HistogramBins { edges, counts })
}

/// Income histogram with black bar outlines.
pub fn income_histogram(table: &IncomeTable, scale: Scale, bins: usize) -> Result<String> {
    let (values, label) = income_series(table, scale);
    let histogram = histogram_bins(&values, bins)?;
    let max_count = histogram.counts.iter().copied().max().unwrap_or(0).max(1);

    let mut canvas = SvgCanvas::new(800.0, 450.0);
    let lo = histogram.edges[0];
    let hi = histogram.edges[histogram.edges.len() - 1];
    let x = LinearScale::new((lo, hi), canvas.x_range());
    let y = LinearScale::new((0.0, max_count as f64 * 1.05), canvas.y_range());

    canvas.title(match scale {
        Scale::Log => "Income Distribution (Log Scale)",
        Scale::Original => "Income Distribution",
    })?;
    for (i, &count) in histogram.counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let x0 = x.map(histogram.edges[i]);
        let x1 = x.map(histogram.edges[i + 1]);
        let top = y.map(count as f64);
        canvas.rect(x0, top, x1 - x0, y.map(0.0) - top, BAR_FILL, Some("black"))?;
    }
    canvas.plot_frame()?;
    canvas.x_ticks(&x, &income_ticks(scale, lo, hi))?;
    canvas.y_ticks(&y, &linear_ticks(0.0, max_count as f64))?;
    canvas.axis_labels(label, "count")?;
    Ok(canvas.finish())
}

/// Five-number summary with Tukey fences.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5·IQR`
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5·IQR`
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    let fraction = position - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * fraction
}

/// Quartiles by linear interpolation, whiskers at the most extreme values
/// inside 1.5·IQR, everything beyond them an outlier.
pub fn box_stats(values: &[f64]) -> Result<BoxStats> {
    check_series("box plot", values)?;
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let mut lower_whisker = f64::INFINITY;
    let mut upper_whisker = f64::NEG_INFINITY;
    let mut outliers = Vec::new();
    for &v in &sorted {
        if v < low_fence || v > high_fence {
            outliers.push(v);
        } else {
            lower_whisker = lower_whisker.min(v);
            upper_whisker = upper_whisker.max(v);
        }
    }

    Ok(BoxStats {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

/// Vertical box plot of income.
pub fn income_box_plot(table: &IncomeTable, scale: Scale) -> Result<String> {
    let (values, label) = income_series(table, scale);
    let stats = box_stats(&values)?;
    let (lo, hi) = min_max(&values);
    let (lo, hi) = padded(lo, hi);

    let mut canvas = SvgCanvas::new(800.0, 600.0);
    let y = LinearScale::new((lo, hi), canvas.y_range());
    let (x0, x1) = canvas.x_range();
    let center = (x0 + x1) / 2.0;
    let half = (x1 - x0) * 0.15;

    canvas.title(match scale {
        Scale::Log => "Income Box Plot (Log Scale)",
        Scale::Original => "Income Box Plot",
    })?;
    let top = y.map(stats.q3);
    canvas.rect(center - half, top, 2.0 * half, y.map(stats.q1) - top, "#c6cbfd", Some(BAR_FILL))?;
    canvas.line((center - half, y.map(stats.median)), (center + half, y.map(stats.median)), BAR_FILL, 2.0, false)?;
    canvas.line((center, y.map(stats.q3)), (center, y.map(stats.upper_whisker)), BAR_FILL, 1.5, false)?;
    canvas.line((center, y.map(stats.q1)), (center, y.map(stats.lower_whisker)), BAR_FILL, 1.5, false)?;
    for whisker in [stats.lower_whisker, stats.upper_whisker] {
        let wy = y.map(whisker);
        canvas.line((center - half / 2.0, wy), (center + half / 2.0, wy), BAR_FILL, 1.5, false)?;
    }
    for &outlier in &stats.outliers {
        canvas.circle(center, y.map(outlier), 2.5, POINT_FILL)?;
    }
    canvas.plot_frame()?;
    canvas.y_ticks(&y, &income_ticks(scale, lo, hi))?;
    canvas.axis_labels("", label)?;
    Ok(canvas.finish())
}

/// Intercept and slope of an ordinary least-squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub intercept: f64,
    pub slope: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = a + b·x` by least squares.
pub fn trend_line(x: &[f64], y: &[f64]) -> Result<TrendLine> {
    if x.len() != y.len() {
        return Err(DashboardError::dimension_mismatch(
            format!("{} x values", x.len()),
            format!("{} y values", y.len()),
        ));
    }
    check_series("trend line x", x)?;
    check_series("trend line y", y)?;

    let mut design = Array2::<f64>::ones((x.len(), 2));
    for (i, &v) in x.iter().enumerate() {
        design[[i, 1]] = v;
    }
    let solution = least_squares(&design, &Array1::from(y.to_vec()))?;
    Ok(TrendLine {
        intercept: solution.params[0],
        slope: solution.params[1],
    })
}

/// Employment time against income over the first `max_rows` rows, with a
/// green OLS trend line.
pub fn employment_scatter(table: &IncomeTable, scale: Scale, max_rows: usize) -> Result<String> {
    let rows = table.head(max_rows);
    let xs: Vec<f64> = rows.iter().map(|r| r.employment_years).collect();
    let (ys, y_label): (Vec<f64>, &str) = match scale {
        Scale::Log => (rows.iter().map(|r| r.log_income).collect(), "Log of income"),
        Scale::Original => (rows.iter().map(|r| r.income).collect(), "Income"),
    };
    check_series("employment time", &xs)?;
    check_series("income", &ys)?;
    let trend = trend_line(&xs, &ys)?;

    let (x_lo, x_hi) = min_max(&xs);
    let (y_lo, y_hi) = min_max(&ys);
    let (x_lo, x_hi) = padded(x_lo, x_hi);
    let (y_lo, y_hi) = padded(y_lo.min(trend.at(x_lo)), y_hi.max(trend.at(x_hi)));

    let mut canvas = SvgCanvas::new(800.0, 600.0);
    let x = LinearScale::new((x_lo, x_hi), canvas.x_range());
    let y = LinearScale::new((y_lo, y_hi), canvas.y_range());

    canvas.title("Income vs. Employment Time (years)")?;
    for (&px, &py) in xs.iter().zip(ys.iter()) {
        canvas.circle(x.map(px), y.map(py), 2.5, POINT_FILL)?;
    }
    canvas.line(
        (x.map(x_lo), y.map(trend.at(x_lo))),
        (x.map(x_hi), y.map(trend.at(x_hi))),
        TREND_STROKE,
        2.0,
        false,
    )?;
    canvas.plot_frame()?;
    canvas.x_ticks(&x, &linear_ticks(x_lo, x_hi))?;
    canvas.y_ticks(&y, &income_ticks(scale, y_lo, y_hi))?;
    canvas.axis_labels("Employment time (years)", y_label)?;
    Ok(canvas.finish())
}

/// Viridis colour for a correlation in `[-1, 1]`; undefined values are grey.
pub fn correlation_colour(value: f64) -> String {
    if !value.is_finite() {
        return MISSING_FILL.to_string();
    }
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) * (VIRIDIS.len() - 1) as f64;
    let i = (t.floor() as usize).min(VIRIDIS.len() - 2);
    let f = t - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Correlation heatmap with a colour bar pinned to `[-1, 1]`.
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> Result<String> {
    let k = matrix.names.len();
    if k == 0 {
        return Err(DashboardError::rendering("Correlation matrix has no columns"));
    }

    let cell = 32.0;
    let margins = Margins {
        top: 50.0,
        right: 100.0,
        bottom: 170.0,
        left: 170.0,
    };
    let side = cell * k as f64;
    let mut canvas = SvgCanvas::new(margins.left + side + margins.right, margins.top + side + margins.bottom)
        .with_margins(margins);

    canvas.title("Correlation Heatmap")?;
    for i in 0..k {
        for j in 0..k {
            let value = matrix.values[[i, j]];
            let x = margins.left + cell * j as f64;
            let y = margins.top + cell * i as f64;
            canvas.rect(x, y, cell, cell, &correlation_colour(value), None)?;
            let label = if value.is_finite() {
                format!("{:.2}", value)
            } else {
                "n/a".to_string()
            };
            canvas.text(x + cell / 2.0, y + cell / 2.0 + 3.0, "middle", 8, &label)?;
        }
    }
    for (i, name) in matrix.names.iter().enumerate() {
        let offset = cell * i as f64 + cell / 2.0;
        canvas.text(margins.left - 6.0, margins.top + offset + 4.0, "end", 11, name)?;
        canvas.rotated_text(margins.left + offset, margins.top + side + 10.0, -45.0, "end", 11, name)?;
    }

    // Colour bar.
    let bar_x = margins.left + side + 30.0;
    let steps = 40;
    let step_h = side / steps as f64;
    for s in 0..steps {
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / steps as f64;
        canvas.rect(bar_x, margins.top + step_h * s as f64, 18.0, step_h + 0.5, &correlation_colour(value), None)?;
    }
    for (value, label) in [(1.0, "1"), (0.0, "0"), (-1.0, "-1")] {
        let y = margins.top + side * (1.0 - value) / 2.0;
        canvas.text(bar_x + 24.0, y + 4.0, "start", 11, label)?;
    }
    Ok(canvas.finish())
}

/// True against predicted values with a red dashed `y = x` reference line
/// spanning the joint range of both.
pub fn parity_scatter(predictions: &Predictions, scale: Scale) -> Result<String> {
    let truth = predictions.true_values(scale);
    let predicted = predictions.predicted_values(scale);
    check_series("true values", &truth)?;
    check_series("predicted values", &predicted)?;

    let (t_lo, t_hi) = min_max(&truth);
    let (p_lo, p_hi) = min_max(&predicted);
    let (lo, hi) = (t_lo.min(p_lo), t_hi.max(p_hi));
    let (view_lo, view_hi) = padded(lo, hi);

    let mut canvas = SvgCanvas::new(700.0, 700.0);
    let x = LinearScale::new((view_lo, view_hi), canvas.x_range());
    let y = LinearScale::new((view_lo, view_hi), canvas.y_range());

    let (title, x_label, y_label) = match scale {
        Scale::Log => (
            "True Values vs Predicted Values (Log Scale)",
            "True Value (log)",
            "Predicted Value (log)",
        ),
        Scale::Original => (
            "True Values vs Predicted Values",
            "True Value",
            "Predicted Value",
        ),
    };
    canvas.title(title)?;
    for (&t, &p) in truth.iter().zip(predicted.iter()) {
        canvas.circle(x.map(t), y.map(p), 3.0, POINT_FILL)?;
    }
    canvas.line((x.map(lo), y.map(lo)), (x.map(hi), y.map(hi)), PARITY_STROKE, 2.0, true)?;
    canvas.plot_frame()?;
    let ticks = income_ticks(scale, view_lo, view_hi);
    canvas.x_ticks(&x, &ticks)?;
    canvas.y_ticks(&y, &ticks)?;
    canvas.axis_labels(x_label, y_label)?;
    Ok(canvas.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_histogram_bins_cover_all_values() {
        let values = [1.0, 2.0, 2.5, 3.0, 10.0];
        let histogram = histogram_bins(&values, 3).unwrap();
        assert_eq!(histogram.edges.len(), 4);
        assert_eq!(histogram.counts, vec![4, 0, 1]);
        assert_eq!(histogram.counts.iter().sum::<usize>(), values.len());
    }

    #[test]
    fn test_histogram_rejects_bad_input() {
        assert!(histogram_bins(&[], 10).is_err());
        assert!(histogram_bins(&[1.0, f64::NAN], 10).is_err());
        assert!(histogram_bins(&[1.0], 0).is_err());
        // Constant input still gets a usable range.
        assert_eq!(histogram_bins(&[4.0, 4.0], 10).unwrap().counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_box_stats() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 100.0];
        let stats = box_stats(&values).unwrap();
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.q3, 7.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 8.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn test_trend_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let line = trend_line(&x, &y).unwrap();
        assert_abs_diff_eq!(line.intercept, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(line.slope, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_log_ticks_in_range() {
        let ticks = income_ticks(Scale::Log, 7.0, 8.6);
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        // ln(1000) ≈ 6.91 is out of range, ln(5000) ≈ 8.52 is in.
        assert_eq!(labels, vec!["2000", "3000", "4000", "5000"]);
        assert_abs_diff_eq!(ticks[0].0, 2000f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_ticks() {
        let ticks = linear_ticks(0.0, 10.0);
        let labels: Vec<&str> = ticks.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(labels, vec!["0", "2", "4", "6", "8", "10"]);
    }

    #[test]
    fn test_correlation_colour() {
        assert_eq!(correlation_colour(-1.0), "#440154");
        assert_eq!(correlation_colour(1.0), "#fde725");
        assert_eq!(correlation_colour(f64::NAN), MISSING_FILL);
    }
}
