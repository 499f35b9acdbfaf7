//! Model formulas and design matrices.
//!
//! Formulas use the familiar `response ~ terms` notation: `+` adds terms,
//! `-` removes them, `a * b` expands to `a + b + a:b`, `C(x)` marks `x` as
//! categorical and `0`/`1` control the intercept. Text and boolean columns
//! are categorical even without `C(..)`.
//!
//! Categorical factors use treatment coding against their first sorted
//! level. Column names follow the usual convention, e.g. `Intercept`,
//! `C(sexo)[T.M]` or `C(posse_de_veiculo)[T.True]:C(posse_de_imovel)[T.True]`.

pub mod design;
pub mod parser;

pub use design::{dmatrices, DesignInfo, DesignMatrix, FactorCoding, TermInfo};
pub use parser::{parse_formula, Factor, ParsedFormula, Term};
