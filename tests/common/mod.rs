//! Common test utilities for income dashboard integration tests.

#![allow(dead_code)]

use income_dashboard::*;
use rand::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Header of the raw income file, index and identifier columns included.
pub const INCOME_CSV_HEADER: &str = "Unnamed: 0,data_ref,id_cliente,sexo,posse_de_veiculo,\
posse_de_imovel,qtd_filhos,tipo_renda,educacao,estado_civil,tipo_residencia,idade,\
tempo_emprego,qt_pessoas_residencia,renda";

const INCOME_TYPES: [&str; 4] = ["Assalariado", "Empresário", "Pensionista", "Servidor público"];
const EDUCATION: [&str; 3] = ["Secundário", "Superior completo", "Superior incompleto"];
const MARITAL: [&str; 3] = ["Casado", "Solteiro", "União"];
const RESIDENCE: [&str; 3] = ["Casa", "Aluguel", "Com os pais"];

/// Raw data rows (without the header) with log income roughly linear in
/// gender, education and employment time.
pub fn synthetic_rows(num_rows: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(num_rows);

    for i in 0..num_rows {
        let male = rng.gen_bool(0.45);
        let vehicle = rng.gen_bool(0.4);
        let property = rng.gen_bool(0.6);
        let children: u32 = rng.gen_range(0..3);
        let income_type = INCOME_TYPES[i % INCOME_TYPES.len()];
        let education_index = rng.gen_range(0..EDUCATION.len());
        let marital = MARITAL[rng.gen_range(0..MARITAL.len())];
        let residence = RESIDENCE[rng.gen_range(0..RESIDENCE.len())];
        let age: u32 = rng.gen_range(22..65);
        let employment: f64 = rng.gen_range(0.2..(age as f64 - 18.0));
        let household = 1.0 + children as f64 + rng.gen_range(0..2) as f64;

        let log_income = 7.6
            + if male { 0.35 } else { 0.0 }
            + 0.15 * education_index as f64
            + 0.04 * employment
            + rng.gen_range(-0.3..0.3);
        let income = log_income.exp();

        rows.push(format!(
            "{},2015-01-01,{},{},{},{},{},{},{},{},{},{},{:.6},{:.1},{:.2}",
            i,
            10_000 + i,
            if male { "M" } else { "F" },
            if vehicle { "True" } else { "False" },
            if property { "True" } else { "False" },
            children,
            income_type,
            EDUCATION[education_index],
            marital,
            residence,
            age,
            employment,
            household,
            income
        ));
    }
    rows
}

/// Write a raw income file into `dir` and return its path.
pub fn write_income_csv(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::from(INCOME_CSV_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).expect("Failed to write test CSV");
    path
}

/// A cleaned table built directly from synthetic rows.
pub fn synthetic_table(num_rows: usize, seed: u64) -> IncomeTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let records = (0..num_rows)
        .map(|row| {
            let age: u32 = rng.gen_range(22..65);
            let employment = rng.gen_range(0.2..(age as f64 - 18.0));
            let male = rng.gen_bool(0.5);
            let income = (7.6 + if male { 0.35 } else { 0.0 } + 0.04 * employment
                + rng.gen_range(-0.3..0.3))
            .exp();
            IncomeRecord::new(
                if male { "M" } else { "F" },
                rng.gen_bool(0.4),
                rng.gen_bool(0.6),
                rng.gen_range(0..3),
                INCOME_TYPES[row % INCOME_TYPES.len()],
                EDUCATION[row % EDUCATION.len()],
                MARITAL[rng.gen_range(0..MARITAL.len())],
                RESIDENCE[rng.gen_range(0..RESIDENCE.len())],
                age,
                employment,
                rng.gen_range(1..5) as f64,
                income,
                row,
            )
            .expect("Synthetic record should be valid")
        })
        .collect();
    IncomeTable::from_records(records).expect("Synthetic table should not be empty")
}

/// Assert that two floats agree within a relative tolerance.
pub fn assert_relative_close(a: f64, b: f64, tolerance: f64) {
    let scale = a.abs().max(b.abs()).max(1.0);
    assert!(
        (a - b).abs() <= tolerance * scale,
        "{} and {} differ by more than {} (relative)",
        a,
        b,
        tolerance
    );
}
