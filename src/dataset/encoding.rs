//! Label encoding and pairwise correlations for the heatmap.
//!
//! Categorical columns are mapped to integer codes following the sorted order
//! of their distinct labels, so `False < True` and text levels sort
//! alphabetically. The mapping is stable across runs.

use crate::dataset::frame::{ColumnData, Frame};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Sorted-label integer encoder for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the sorted distinct labels of a column.
    pub fn fit(column: &ColumnData) -> Self {
        LabelEncoder {
            classes: column.levels(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Integer code of every row; labels unseen at fit time map to `NaN`.
    pub fn transform(&self, column: &ColumnData) -> Vec<f64> {
        (0..column.len())
            .map(|i| {
                let label = column.label(i);
                self.classes
                    .binary_search(&label)
                    .map(|code| code as f64)
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }
}

/// Numeric view of every column: numeric columns as-is, categorical ones
/// label-encoded.
pub fn encode_frame(frame: &Frame) -> Vec<(String, Vec<f64>)> {
    frame
        .iter()
        .map(|(name, column)| {
            let values = match column {
                ColumnData::Numeric(v) => v.clone(),
                other => LabelEncoder::fit(other).transform(other),
            };
            (name.to_string(), values)
        })
        .collect()
}

/// Pearson correlation. `NaN` when either input is constant or the lengths
/// differ.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n != y.len() || n < 2 {
        return f64::NAN;
    }
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Symmetric matrix of pairwise correlations with its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Correlations over all columns of `frame`, categoricals label-encoded.
    pub fn from_frame(frame: &Frame) -> Self {
        let encoded = encode_frame(frame);
        let k = encoded.len();
        let mut values = Array2::from_elem((k, k), f64::NAN);

        for i in 0..k {
            for j in i..k {
                let r = pearson(&encoded[i].1, &encoded[j].1);
                // Constant columns keep NaN even on the diagonal.
                let r = if i == j && r.is_finite() { 1.0 } else { r };
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }

        CorrelationMatrix {
            names: encoded.into_iter().map(|(name, _)| name).collect(),
            values,
        }
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[[i, j]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_label_encoder_sorted() {
        let column = ColumnData::Text(vec!["solteiro".into(), "casado".into(), "viúvo".into()]);
        let encoder = LabelEncoder::fit(&column);
        assert_eq!(encoder.classes(), &["casado", "solteiro", "viúvo"]);
        assert_eq!(encoder.transform(&column), vec![1.0, 0.0, 2.0]);

        let flags = ColumnData::Flag(vec![true, false]);
        assert_eq!(LabelEncoder::fit(&flags).transform(&flags), vec![1.0, 0.0]);
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0);
        assert!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix() {
        let frame = Frame::default()
            .with_column("a", ColumnData::Numeric(vec![1.0, 2.0, 3.0]))
            .unwrap()
            .with_column("b", ColumnData::Flag(vec![false, false, true]))
            .unwrap()
            .with_column("c", ColumnData::Numeric(vec![5.0, 5.0, 5.0]))
            .unwrap();

        let corr = CorrelationMatrix::from_frame(&frame);
        assert_eq!(corr.names, vec!["a", "b", "c"]);
        assert_relative_eq!(corr.get("a", "a").unwrap(), 1.0);
        assert_relative_eq!(corr.get("a", "b").unwrap(), corr.get("b", "a").unwrap());
        assert!(corr.get("c", "c").unwrap().is_nan());
        assert!(corr.get("a", "c").unwrap().is_nan());
    }
}
