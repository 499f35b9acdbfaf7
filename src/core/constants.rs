//! Column names, default model settings and display limits.
//!
//! The column names are the ones used by the source dataset
//! (`previsao_de_renda.csv`); see the glossary in the crate docs for their
//! English meaning.

/// Gender.
pub const COL_GENDER: &str = "sexo";
/// Vehicle ownership flag.
pub const COL_OWNS_VEHICLE: &str = "posse_de_veiculo";
/// Property ownership flag.
pub const COL_OWNS_PROPERTY: &str = "posse_de_imovel";
/// Number of children.
pub const COL_CHILDREN: &str = "qtd_filhos";
/// Income type.
pub const COL_INCOME_TYPE: &str = "tipo_renda";
/// Education level.
pub const COL_EDUCATION: &str = "educacao";
/// Marital status.
pub const COL_MARITAL_STATUS: &str = "estado_civil";
/// Residence type.
pub const COL_RESIDENCE_TYPE: &str = "tipo_residencia";
/// Age in years.
pub const COL_AGE: &str = "idade";
/// Employment duration in years (may be missing in the raw file).
pub const COL_EMPLOYMENT_YEARS: &str = "tempo_emprego";
/// Number of people living in the residence.
pub const COL_HOUSEHOLD_SIZE: &str = "qt_pessoas_residencia";
/// Income, the modelled quantity.
pub const COL_INCOME: &str = "renda";
/// Derived: employment duration divided by age.
pub const COL_EMPLOYMENT_AGE_RATIO: &str = "tempo_emprego_idade_ratio";
/// Derived: natural log of income.
pub const COL_LOG_INCOME: &str = "log_renda";

/// Client identifier, dropped at load time.
pub const COL_CLIENT_ID: &str = "id_cliente";
/// Reference date, dropped at load time.
pub const COL_REFERENCE_DATE: &str = "data_ref";

/// Raw schema columns in file order, after identifier columns are dropped.
pub const SCHEMA_COLUMNS: [&str; 12] = [
    COL_GENDER,
    COL_OWNS_VEHICLE,
    COL_OWNS_PROPERTY,
    COL_CHILDREN,
    COL_INCOME_TYPE,
    COL_EDUCATION,
    COL_MARITAL_STATUS,
    COL_RESIDENCE_TYPE,
    COL_AGE,
    COL_EMPLOYMENT_YEARS,
    COL_HOUSEHOLD_SIZE,
    COL_INCOME,
];

/// Default model formula.
pub const DEFAULT_FORMULA: &str = "log_renda ~ C(sexo) + C(posse_de_veiculo) * C(posse_de_imovel) + \
     qtd_filhos + C(tipo_renda) + C(posse_de_imovel) + C(educacao) + C(estado_civil) + \
     C(tipo_residencia) + C(tipo_residencia) + idade + tempo_emprego + \
     qt_pessoas_residencia + tempo_emprego_idade_ratio";

/// Default grid of penalty strengths.
pub const DEFAULT_ALPHAS: [f64; 6] = [0.0, 0.001, 0.005, 0.01, 0.05, 0.1];

/// Default seed for the train/test split. Held constant across runs.
pub const DEFAULT_RANDOM_SEED: u64 = 40;

/// Default held-out fraction.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default coordinate-descent sweep limit.
pub const DEFAULT_MAX_ITER: usize = 1000;

/// Default coordinate-descent convergence tolerance (max coefficient change).
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Coefficients with absolute value below this are treated as exactly zero.
pub const DEFAULT_ZERO_TOLERANCE: f64 = 1e-8;

/// Relative eigenvalue cutoff for the least-squares pseudo-inverse.
pub const EIGEN_RELATIVE_CUTOFF: f64 = 1e-12;

/// Held-out R² values closer than this are considered tied.
pub const R2_TIE_TOLERANCE: f64 = 1e-9;

/// Preview row bounds and default.
pub const MIN_PREVIEW_ROWS: usize = 5;
pub const MAX_PREVIEW_ROWS: usize = 100;
pub const DEFAULT_PREVIEW_ROWS: usize = 9;

/// Histogram bin bounds and default.
pub const MIN_HISTOGRAM_BINS: usize = 10;
pub const MAX_HISTOGRAM_BINS: usize = 200;
pub const DEFAULT_HISTOGRAM_BINS: usize = 80;

/// Rows plotted in the employment-time scatter.
pub const DEFAULT_SCATTER_ROWS: usize = 2000;

/// Income values labelled on log-scale axes.
pub const LOG_SCALE_TICKS: [f64; 10] = [
    1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0, 9000.0, 10000.0,
];

/// Default output directory for the rendered dashboard.
pub const DEFAULT_OUTPUT_DIR: &str = "dashboard";

/// Crate version.
pub const INCOME_DASHBOARD_VERSION: &str = env!("CARGO_PKG_VERSION");
