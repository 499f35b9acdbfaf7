//! Cleaned income records and the table that holds them.

use crate::core::constants::*;
use crate::core::error::{DatasetError, Result};
use crate::dataset::frame::{ColumnData, Frame};
use serde::{Deserialize, Serialize};

/// One cleaned observation, including the two derived columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// `sexo`
    pub gender: String,
    /// `posse_de_veiculo`
    pub owns_vehicle: bool,
    /// `posse_de_imovel`
    pub owns_property: bool,
    /// `qtd_filhos`
    pub children: u32,
    /// `tipo_renda`
    pub income_type: String,
    /// `educacao`
    pub education: String,
    /// `estado_civil`
    pub marital_status: String,
    /// `tipo_residencia`
    pub residence_type: String,
    /// `idade`
    pub age: u32,
    /// `tempo_emprego`, always defined once cleaned
    pub employment_years: f64,
    /// `qt_pessoas_residencia`
    pub household_size: f64,
    /// `renda`, strictly positive
    pub income: f64,
    /// `tempo_emprego_idade_ratio`
    pub employment_age_ratio: f64,
    /// `log_renda`
    pub log_income: f64,
}

impl IncomeRecord {
    /// Build a record from its raw fields, deriving the ratio and log-income
    /// columns. `row` is only used for error reporting.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gender: impl Into<String>,
        owns_vehicle: bool,
        owns_property: bool,
        children: u32,
        income_type: impl Into<String>,
        education: impl Into<String>,
        marital_status: impl Into<String>,
        residence_type: impl Into<String>,
        age: u32,
        employment_years: f64,
        household_size: f64,
        income: f64,
        row: usize,
    ) -> std::result::Result<Self, DatasetError> {
        if !employment_years.is_finite() {
            return Err(DatasetError::MissingValue {
                column: COL_EMPLOYMENT_YEARS.to_string(),
                row,
            });
        }
        if !(income > 0.0) || !income.is_finite() {
            return Err(DatasetError::NonPositiveIncome { row, value: income });
        }
        if age == 0 {
            return Err(DatasetError::ZeroAge { row });
        }

        Ok(IncomeRecord {
            gender: gender.into(),
            owns_vehicle,
            owns_property,
            children,
            income_type: income_type.into(),
            education: education.into(),
            marital_status: marital_status.into(),
            residence_type: residence_type.into(),
            age,
            employment_years,
            household_size,
            income,
            employment_age_ratio: employment_years / age as f64,
            log_income: income.ln(),
        })
    }
}

/// The cleaned dataset, in file order of the retained rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeTable {
    records: Vec<IncomeRecord>,
}

impl IncomeTable {
    /// Column names of the cleaned table, in display order.
    pub const COLUMNS: [&'static str; 14] = [
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
        COL_EMPLOYMENT_AGE_RATIO,
        COL_LOG_INCOME,
    ];

    /// Wrap already-cleaned records.
    pub fn from_records(records: Vec<IncomeRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(DatasetError::Empty.into());
        }
        Ok(IncomeTable { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[IncomeRecord] {
        &self.records
    }

    /// First `n` rows, or every row when the table is shorter.
    pub fn head(&self, n: usize) -> &[IncomeRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// `renda` column.
    pub fn incomes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.income).collect()
    }

    /// `log_renda` column.
    pub fn log_incomes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.log_income).collect()
    }

    /// `tempo_emprego` column.
    pub fn employment_years(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.employment_years).collect()
    }

    /// Column-oriented copy of the table, typed per column.
    pub fn to_frame(&self) -> Frame {
        let r = &self.records;
        let text = |f: fn(&IncomeRecord) -> &String| {
            ColumnData::Text(r.iter().map(|x| f(x).clone()).collect())
        };
        let flag = |f: fn(&IncomeRecord) -> bool| ColumnData::Flag(r.iter().map(f).collect());
        let num = |f: fn(&IncomeRecord) -> f64| ColumnData::Numeric(r.iter().map(f).collect());

        let columns = vec![
            text(|x| &x.gender),
            flag(|x| x.owns_vehicle),
            flag(|x| x.owns_property),
            num(|x| x.children as f64),
            text(|x| &x.income_type),
            text(|x| &x.education),
            text(|x| &x.marital_status),
            text(|x| &x.residence_type),
            num(|x| x.age as f64),
            num(|x| x.employment_years),
            num(|x| x.household_size),
            num(|x| x.income),
            num(|x| x.employment_age_ratio),
            num(|x| x.log_income),
        ];

        let mut frame = Frame::with_rows(self.records.len());
        for (name, data) in Self::COLUMNS.iter().zip(columns) {
            // Every column has exactly `len()` values.
            frame.insert_unchecked(name, data);
        }
        frame
    }

    /// Display values of one record, aligned with [`IncomeTable::COLUMNS`].
    pub fn display_row(record: &IncomeRecord) -> Vec<String> {
        vec![
            record.gender.clone(),
            flag_label(record.owns_vehicle).to_string(),
            flag_label(record.owns_property).to_string(),
            record.children.to_string(),
            record.income_type.clone(),
            record.education.clone(),
            record.marital_status.clone(),
            record.residence_type.clone(),
            record.age.to_string(),
            format!("{:.6}", record.employment_years),
            format!("{:.1}", record.household_size),
            format!("{:.2}", record.income),
            format!("{:.6}", record.employment_age_ratio),
            format!("{:.6}", record.log_income),
        ]
    }
}

/// Level name used for boolean values throughout the crate.
pub fn flag_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
