//! Row-level cleaning of the raw income table.
//!
//! Rows without an employment duration are discarded, exact duplicates are
//! removed keeping the first occurrence, and the derived ratio and log-income
//! columns are appended. The retained rows keep their file order.

use crate::core::error::Result;
use crate::dataset::dataset::{IncomeRecord, IncomeTable};
use crate::dataset::loader::{RawRecord, RawTable};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Row counts of one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub rows_missing_employment: usize,
    pub duplicate_rows_removed: usize,
    pub rows_retained: usize,
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} without employment duration, {} duplicates removed, {} retained",
            self.rows_read,
            self.rows_missing_employment,
            self.duplicate_rows_removed,
            self.rows_retained
        )
    }
}

/// Hashable identity of a raw row. Floats compare by bit pattern with
/// `-0.0` folded into `0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    text: [String; 5],
    flags: [bool; 2],
    counts: [u32; 2],
    floats: [u64; 3],
}

fn float_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl RecordKey {
    fn new(record: &RawRecord, employment_years: f64) -> Self {
        RecordKey {
            text: [
                record.gender.clone(),
                record.income_type.clone(),
                record.education.clone(),
                record.marital_status.clone(),
                record.residence_type.clone(),
            ],
            flags: [record.owns_vehicle, record.owns_property],
            counts: [record.children, record.age],
            floats: [
                float_bits(employment_years),
                float_bits(record.household_size),
                float_bits(record.income),
            ],
        }
    }
}

/// Clean a raw table into an [`IncomeTable`].
///
/// Fails when no row survives, or when a retained row has a non-positive
/// income or a zero age.
pub fn clean(raw: RawTable) -> Result<(IncomeTable, CleaningReport)> {
    let mut report = CleaningReport {
        rows_read: raw.len(),
        ..Default::default()
    };

    let mut seen = HashSet::with_capacity(raw.len());
    let mut records = Vec::with_capacity(raw.len());

    for (row, record) in raw.records.into_iter().enumerate() {
        let employment_years = match record.employment_years {
            Some(v) if !v.is_nan() => v,
            _ => {
                report.rows_missing_employment += 1;
                continue;
            }
        };

        if !seen.insert(RecordKey::new(&record, employment_years)) {
            report.duplicate_rows_removed += 1;
            continue;
        }

        let RawRecord {
            gender,
            owns_vehicle,
            owns_property,
            children,
            income_type,
            education,
            marital_status,
            residence_type,
            age,
            household_size,
            income,
            ..
        } = record;

        records.push(IncomeRecord::new(
            gender,
            owns_vehicle,
            owns_property,
            children,
            income_type,
            education,
            marital_status,
            residence_type,
            age,
            employment_years,
            household_size,
            income,
            row,
        )?);
    }

    report.rows_retained = records.len();
    info!("Cleaning: {}", report);

    let table = IncomeTable::from_records(records)?;
    Ok((table, report))
}
