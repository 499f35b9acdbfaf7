//! Minimal SVG document builder.

use crate::core::error::{DashboardError, Result};
use std::fmt::Write;

/// Escape text for use in SVG/HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain is widened by one unit on each side.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (lo, hi) = domain;
        let domain = if hi > lo { (lo, hi) } else { (lo - 1.0, lo + 1.0) };
        LinearScale { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.domain.0 && value <= self.domain.1
    }
}

/// Plot area margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 50.0,
            right: 30.0,
            bottom: 60.0,
            left: 70.0,
        }
    }
}

/// An SVG document being assembled element by element.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    margins: Margins,
    body: String,
}

impl SvgCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        SvgCanvas {
            width,
            height,
            margins: Margins::default(),
            body: String::new(),
        }
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal pixel span of the plot area.
    pub fn x_range(&self) -> (f64, f64) {
        (self.margins.left, self.width - self.margins.right)
    }

    /// Vertical pixel span of the plot area, bottom to top.
    pub fn y_range(&self) -> (f64, f64) {
        (self.height - self.margins.bottom, self.margins.top)
    }

    fn push(&mut self, args: std::fmt::Arguments<'_>) -> Result<()> {
        self.body
            .write_fmt(args)
            .map_err(|e| DashboardError::rendering(format!("SVG write failed: {}", e)))?;
        self.body.push('\n');
        Ok(())
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) -> Result<()> {
        match stroke {
            Some(stroke) => self.push(format_args!(
                "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
                x, y, w, h, fill, stroke
            )),
            None => self.push(format_args!(
                "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                x, y, w, h, fill
            )),
        }
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: &str, width: f64, dashed: bool) -> Result<()> {
        let dash = if dashed { " stroke-dasharray=\"6,4\"" } else { "" };
        self.push(format_args!(
            "  <line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"{}/>",
            from.0, from.1, to.0, to.1, stroke, width, dash
        ))
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) -> Result<()> {
        self.push(format_args!(
            "  <circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{}\" fill=\"{}\" fill-opacity=\"0.7\"/>",
            cx, cy, r, fill
        ))
    }

    pub fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, content: &str) -> Result<()> {
        self.push(format_args!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{}\">{}</text>",
            x,
            y,
            anchor,
            size,
            escape(content)
        ))
    }

    /// Text rotated by `angle` degrees around its anchor point.
    pub fn rotated_text(&mut self, x: f64, y: f64, angle: f64, anchor: &str, size: u32, content: &str) -> Result<()> {
        self.push(format_args!(
            "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" font-size=\"{}\" transform=\"rotate({} {:.2} {:.2})\">{}</text>",
            x,
            y,
            anchor,
            size,
            angle,
            x,
            y,
            escape(content)
        ))
    }

    pub fn vertical_text(&mut self, x: f64, y: f64, size: u32, content: &str) -> Result<()> {
        self.rotated_text(x, y, -90.0, "middle", size, content)
    }

    pub fn title(&mut self, content: &str) -> Result<()> {
        let x = self.width / 2.0;
        self.text(x, 28.0, "middle", 16, content)
    }

    /// Frame of the plot area.
    pub fn plot_frame(&mut self) -> Result<()> {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        self.push(format_args!(
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#444\"/>",
            x0,
            y1,
            x1 - x0,
            y0 - y1
        ))
    }

    /// Tick marks and labels under the plot area.
    pub fn x_ticks(&mut self, scale: &LinearScale, ticks: &[(f64, String)]) -> Result<()> {
        let (y0, _) = self.y_range();
        for (value, label) in ticks {
            let x = scale.map(*value);
            self.line((x, y0), (x, y0 + 5.0), "#444", 1.0, false)?;
            self.text(x, y0 + 18.0, "middle", 11, label)?;
        }
        Ok(())
    }

    /// Tick marks and labels left of the plot area.
    pub fn y_ticks(&mut self, scale: &LinearScale, ticks: &[(f64, String)]) -> Result<()> {
        let (x0, _) = self.x_range();
        for (value, label) in ticks {
            let y = scale.map(*value);
            self.line((x0 - 5.0, y), (x0, y), "#444", 1.0, false)?;
            self.text(x0 - 8.0, y + 4.0, "end", 11, label)?;
        }
        Ok(())
    }

    pub fn axis_labels(&mut self, x_label: &str, y_label: &str) -> Result<()> {
        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        self.text((x0 + x1) / 2.0, self.height - 15.0, "middle", 13, x_label)?;
        self.vertical_text(18.0, (y0 + y1) / 2.0, 13, y_label)
    }

    pub fn finish(self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 256);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"sans-serif\">\n",
            w = self.width,
            h = self.height
        ));
        svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0));
        assert_eq!(scale.map(5.0), 150.0);
        assert!(scale.contains(10.0));
        assert!(!scale.contains(10.5));

        let flat = LinearScale::new((3.0, 3.0), (0.0, 100.0));
        assert_eq!(flat.map(3.0), 50.0);
    }

    #[test]
    fn test_canvas_document() {
        let mut canvas = SvgCanvas::new(200.0, 100.0);
        canvas.title("T & T").unwrap();
        canvas.circle(10.0, 10.0, 2.0, "#000").unwrap();
        let svg = canvas.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("T &amp; T"));
        assert!(svg.contains("<circle"));
    }
}
