//! Design matrix construction.
//!
//! A [`DesignInfo`] fixes the column basis of a formula once: which factors
//! are categorical, their sorted levels, how each is coded and the resulting
//! column names. Building a matrix for any row subset with the same
//! `DesignInfo` always yields the same columns, whatever levels the subset
//! happens to contain.

use crate::core::error::{FormulaError, Result};
use crate::dataset::frame::{ColumnData, Frame};
use crate::formula::parser::{parse_formula, Factor, ParsedFormula, Term};
use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How a factor contributes columns within a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactorCoding {
    /// The numeric value itself
    Numeric,
    /// One indicator per level except the reference (first) level
    Treatment { levels: Vec<String> },
    /// One indicator per level
    Full { levels: Vec<String> },
}

impl FactorCoding {
    fn width(&self) -> usize {
        match self {
            FactorCoding::Numeric => 1,
            FactorCoding::Treatment { levels } => levels.len().saturating_sub(1),
            FactorCoding::Full { levels } => levels.len(),
        }
    }

    fn column_labels(&self, factor: &Factor) -> Vec<String> {
        let base = if factor.explicit_categorical {
            format!("C({})", factor.name)
        } else {
            factor.name.clone()
        };
        match self {
            FactorCoding::Numeric => vec![base],
            FactorCoding::Treatment { levels } => levels
                .iter()
                .skip(1)
                .map(|level| format!("{}[T.{}]", base, level))
                .collect(),
            FactorCoding::Full { levels } => levels
                .iter()
                .map(|level| format!("{}[{}]", base, level))
                .collect(),
        }
    }
}

/// One term of the design, with its factors' codings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    pub factors: Vec<(Factor, FactorCoding)>,
    /// First design column of this term
    pub start: usize,
    pub width: usize,
}

/// The fixed column basis of a formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignInfo {
    pub formula: ParsedFormula,
    pub terms: Vec<TermInfo>,
    pub column_names: Vec<String>,
}

/// A design matrix with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    pub x: Array2<f64>,
    pub column_names: Vec<String>,
}

impl DesignMatrix {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.x.ncols()
    }
}

fn lookup<'a>(frame: &'a Frame, name: &str) -> std::result::Result<&'a ColumnData, FormulaError> {
    frame
        .column(name)
        .ok_or_else(|| FormulaError::UnknownColumn(name.to_string()))
}

impl DesignInfo {
    /// Derive the column basis of `formula` from `frame`.
    ///
    /// Categorical levels are taken from `frame`, so pass the full cleaned
    /// table and build partitions with [`DesignInfo::build`].
    pub fn from_formula(formula: &str, frame: &Frame) -> Result<Self> {
        let parsed = parse_formula(formula)?;

        match lookup(frame, &parsed.response)? {
            ColumnData::Numeric(_) => {}
            _ => return Err(FormulaError::NonNumericResponse(parsed.response.clone()).into()),
        }

        let all_terms = parsed.all_terms();
        // Factor sets already spanned by earlier terms; the intercept is the
        // empty set.
        let mut spanned: HashSet<BTreeSet<&str>> = HashSet::new();
        let mut terms = Vec::new();
        let mut column_names = Vec::new();

        for term in &all_terms {
            let names: BTreeSet<&str> = term.factors.iter().map(|f| f.name.as_str()).collect();
            let mut newly_spanned = Vec::new();
            let mut factors = Vec::with_capacity(term.degree());
            for factor in &term.factors {
                let column = lookup(frame, &factor.name)?;
                let coding = if factor.explicit_categorical || column.is_categorical() {
                    let levels = column.levels();
                    // A factor whose margin is not in the model yet carries
                    // every level, and spans that margin from here on.
                    let mut margin = names.clone();
                    margin.remove(factor.name.as_str());
                    if spanned.contains(&margin) {
                        FactorCoding::Treatment { levels }
                    } else {
                        newly_spanned.push(margin);
                        FactorCoding::Full { levels }
                    }
                } else {
                    FactorCoding::Numeric
                };
                factors.push((factor.clone(), coding));
            }
            spanned.extend(newly_spanned);
            spanned.insert(names);

            let names = term_column_names(term, &factors);
            let info = TermInfo {
                factors,
                start: column_names.len(),
                width: names.len(),
            };
            column_names.extend(names);
            terms.push(info);
        }

        if column_names.is_empty() {
            return Err(FormulaError::EmptyDesign.into());
        }

        debug!(
            "Design for '{}': {} terms, {} columns",
            parsed.response,
            terms.len(),
            column_names.len()
        );

        Ok(DesignInfo {
            formula: parsed,
            terms,
            column_names,
        })
    }

    pub fn response(&self) -> &str {
        &self.formula.response
    }

    pub fn n_columns(&self) -> usize {
        self.column_names.len()
    }

    /// Response vector of `frame`.
    pub fn build_response(&self, frame: &Frame) -> Result<Array1<f64>> {
        let name = &self.formula.response;
        match lookup(frame, name)? {
            ColumnData::Numeric(values) => {
                if let Some(row) = values.iter().position(|v| !v.is_finite()) {
                    return Err(FormulaError::NonFiniteValue {
                        column: name.clone(),
                        row,
                    }
                    .into());
                }
                Ok(Array1::from_vec(values.clone()))
            }
            _ => Err(FormulaError::NonNumericResponse(name.clone()).into()),
        }
    }

    /// Design matrix of `frame` in this basis.
    pub fn build(&self, frame: &Frame) -> Result<DesignMatrix> {
        let n = frame.n_rows();
        let mut x = Array2::<f64>::zeros((n, self.n_columns()));

        for term in &self.terms {
            let encoded = term
                .factors
                .iter()
                .map(|(factor, coding)| encode_factor(frame, factor, coding))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for row in 0..n {
                let values = row_product(&encoded, row);
                debug_assert_eq!(values.len(), term.width);
                for (offset, value) in values.into_iter().enumerate() {
                    x[[row, term.start + offset]] = value;
                }
            }
        }

        Ok(DesignMatrix {
            x,
            column_names: self.column_names.clone(),
        })
    }

    /// Response and design matrix of `frame`.
    pub fn build_both(&self, frame: &Frame) -> Result<(Array1<f64>, DesignMatrix)> {
        Ok((self.build_response(frame)?, self.build(frame)?))
    }
}

fn term_column_names(term: &Term, factors: &[(Factor, FactorCoding)]) -> Vec<String> {
    if term.is_intercept() {
        return vec!["Intercept".to_string()];
    }
    // The first factor varies fastest.
    let mut names = vec![String::new()];
    for (i, (factor, coding)) in factors.iter().enumerate() {
        let labels = coding.column_labels(factor);
        let mut next = Vec::with_capacity(names.len() * labels.len());
        for label in &labels {
            for prefix in &names {
                if i == 0 {
                    next.push(label.clone());
                } else {
                    next.push(format!("{}:{}", prefix, label));
                }
            }
        }
        names = next;
    }
    names
}

/// Per-row coded values of one factor, `width` values per row.
struct EncodedFactor {
    width: usize,
    values: Vec<f64>,
}

fn encode_factor(
    frame: &Frame,
    factor: &Factor,
    coding: &FactorCoding,
) -> std::result::Result<EncodedFactor, FormulaError> {
    let column = lookup(frame, &factor.name)?;
    let n = column.len();
    let width = coding.width();
    let mut values = vec![0.0; n * width];

    match coding {
        FactorCoding::Numeric => {
            let data = match column {
                ColumnData::Numeric(v) => v,
                _ => return Err(FormulaError::UnknownColumn(factor.name.clone())),
            };
            for (row, v) in data.iter().enumerate() {
                if !v.is_finite() {
                    return Err(FormulaError::NonFiniteValue {
                        column: factor.name.clone(),
                        row,
                    });
                }
                values[row] = *v;
            }
        }
        FactorCoding::Treatment { levels } | FactorCoding::Full { levels } => {
            let skip = usize::from(matches!(coding, FactorCoding::Treatment { .. }));
            for row in 0..n {
                let label = column.label(row);
                let index = levels
                    .binary_search_by(|l| compare_levels(column, l, &label))
                    .map_err(|_| FormulaError::UnknownLevel {
                        factor: factor.to_string(),
                        level: label.clone(),
                    })?;
                if index >= skip {
                    values[row * width + index - skip] = 1.0;
                }
            }
        }
    }

    Ok(EncodedFactor { width, values })
}

/// Level order used by [`ColumnData::levels`].
fn compare_levels(column: &ColumnData, a: &str, b: &str) -> std::cmp::Ordering {
    match column {
        ColumnData::Numeric(_) => {
            let (x, y) = (a.parse::<f64>(), b.parse::<f64>());
            match (x, y) {
                (Ok(x), Ok(y)) => x.total_cmp(&y),
                _ => a.cmp(b),
            }
        }
        _ => a.cmp(b),
    }
}

fn row_product(encoded: &[EncodedFactor], row: usize) -> Vec<f64> {
    let mut out = vec![1.0];
    for factor in encoded {
        let slice = &factor.values[row * factor.width..(row + 1) * factor.width];
        let mut next = Vec::with_capacity(out.len() * slice.len());
        for v in slice {
            for prefix in &out {
                next.push(prefix * v);
            }
        }
        out = next;
    }
    out
}

/// Derive a basis from `frame` and build its response and design matrix.
pub fn dmatrices(formula: &str, frame: &Frame) -> Result<(Array1<f64>, DesignMatrix)> {
    DesignInfo::from_formula(formula, frame)?.build_both(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DashboardError;

    fn frame() -> Frame {
        Frame::default()
            .with_column("y", ColumnData::Numeric(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap()
            .with_column("x", ColumnData::Numeric(vec![0.5, 1.5, 2.5, 3.5]))
            .unwrap()
            .with_column(
                "g",
                ColumnData::Text(vec!["b".into(), "a".into(), "c".into(), "a".into()]),
            )
            .unwrap()
            .with_column("f", ColumnData::Flag(vec![true, false, true, true]))
            .unwrap()
    }

    #[test]
    fn test_treatment_coding() {
        let (y, design) = dmatrices("y ~ C(g) + x", &frame()).unwrap();
        assert_eq!(y.len(), 4);
        assert_eq!(
            design.column_names,
            vec!["Intercept", "C(g)[T.b]", "C(g)[T.c]", "x"]
        );
        assert_eq!(design.x.row(0).to_vec(), vec![1.0, 1.0, 0.0, 0.5]);
        assert_eq!(design.x.row(1).to_vec(), vec![1.0, 0.0, 0.0, 1.5]);
        assert_eq!(design.x.row(2).to_vec(), vec![1.0, 0.0, 1.0, 2.5]);
    }

    #[test]
    fn test_implicit_categorical_and_interaction() {
        let (_, design) = dmatrices("y ~ g * f", &frame()).unwrap();
        assert_eq!(
            design.column_names,
            vec![
                "Intercept",
                "g[T.b]",
                "g[T.c]",
                "f[T.True]",
                "g[T.b]:f[T.True]",
                "g[T.c]:f[T.True]"
            ]
        );
        // row 0: g = b, f = True
        assert_eq!(design.x.row(0).to_vec(), vec![1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_full_coding_without_intercept() {
        let (_, design) = dmatrices("y ~ C(g) + C(f) - 1", &frame()).unwrap();
        assert_eq!(
            design.column_names,
            vec!["C(g)[a]", "C(g)[b]", "C(g)[c]", "C(f)[T.True]"]
        );
        for row in design.x.rows() {
            assert_eq!(row[0] + row[1] + row[2], 1.0);
        }
    }

    #[test]
    fn test_interaction_without_main_effect_keeps_every_level() {
        let (_, design) = dmatrices("y ~ x:C(g)", &frame()).unwrap();
        assert_eq!(
            design.column_names,
            vec!["Intercept", "x:C(g)[a]", "x:C(g)[b]", "x:C(g)[c]"]
        );
        // row 0: g = b, x = 0.5
        assert_eq!(design.x.row(0).to_vec(), vec![1.0, 0.0, 0.5, 0.0]);

        // With the main effect present the reference level drops out again.
        let (_, design) = dmatrices("y ~ C(g) + x:C(g)", &frame()).unwrap();
        assert_eq!(
            design.column_names,
            vec![
                "Intercept",
                "C(g)[T.b]",
                "C(g)[T.c]",
                "x:C(g)[a]",
                "x:C(g)[b]",
                "x:C(g)[c]"
            ]
        );

        let (_, design) = dmatrices("y ~ C(g):C(f)", &frame()).unwrap();
        assert_eq!(design.n_columns(), 1 + 3 * 2);
    }

    #[test]
    fn test_partition_keeps_basis() {
        let full = frame();
        let info = DesignInfo::from_formula("y ~ C(g)", &full).unwrap();
        let subset = full.take(&[1, 3]).unwrap(); // only level "a"
        let design = info.build(&subset).unwrap();
        assert_eq!(design.column_names, info.column_names);
        assert_eq!(design.n_columns(), 3);
        assert_eq!(design.x.row(0).to_vec(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_level_is_error() {
        let full = frame();
        let basis = full.take(&[0, 1]).unwrap();
        let info = DesignInfo::from_formula("y ~ C(g)", &basis).unwrap();
        let err = info.build(&full).unwrap_err();
        assert!(matches!(err, DashboardError::Formula { .. }));
        assert!(err.to_string().contains("'c'"));
    }

    #[test]
    fn test_unknown_column_and_text_response() {
        assert!(dmatrices("y ~ missing", &frame()).is_err());
        let err = dmatrices("g ~ x", &frame()).unwrap_err();
        assert!(err.to_string().contains("must be numeric"));
    }
}
