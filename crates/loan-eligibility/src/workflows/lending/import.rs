//! Batch intake of applicant profiles from CSV exports.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::domain::{ApplicantProfile, Employment, LoanKind, ProfileError};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read applicant export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid applicant CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    InvalidRow { row: usize, source: ProfileError },
    #[error("row {row}: {field} expects yes/no, got '{value}'")]
    InvalidFlag {
        row: usize,
        field: &'static str,
        value: String,
    },
}

pub fn read_profiles_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<ApplicantProfile>, ImportError> {
    let file = File::open(path)?;
    read_profiles(file)
}

/// Parses one profile per row; rows are numbered from 1 after the header.
pub fn read_profiles<R: Read>(reader: R) -> Result<Vec<ApplicantProfile>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut profiles = Vec::new();

    for (index, record) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
        let row = record?;
        profiles.push(row.into_profile(index + 1)?);
    }

    Ok(profiles)
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    name: String,
    age: u32,
    work: String,
    income: f64,
    outstanding_debts: f64,
    credit_score: i32,
    requested: f64,
    cosigner: String,
    #[serde(alias = "type_loan")]
    loan_kind: String,
    months: u32,
    blacklisted: String,
}

impl ApplicantRow {
    fn into_profile(self, row: usize) -> Result<ApplicantProfile, ImportError> {
        let work = self
            .work
            .parse::<Employment>()
            .map_err(|source| ImportError::InvalidRow { row, source })?;
        let loan_kind = self
            .loan_kind
            .parse::<LoanKind>()
            .map_err(|source| ImportError::InvalidRow { row, source })?;

        Ok(ApplicantProfile {
            name: self.name,
            age: self.age,
            work,
            income: self.income,
            outstanding_debts: self.outstanding_debts,
            credit_score: self.credit_score,
            requested: self.requested,
            cosigner: parse_flag(row, "cosigner", &self.cosigner)?,
            loan_kind,
            months: self.months,
            blacklisted: parse_flag(row, "blacklisted", &self.blacklisted)?,
        })
    }
}

/// Empty cells are rejected like any other unreadable value.
fn parse_flag(row: usize, field: &'static str, raw: &str) -> Result<bool, ImportError> {
    let raw = raw.trim();
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(ImportError::InvalidFlag {
            row,
            field,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,age,work,income,outstanding_debts,credit_score,requested,cosigner,loan_kind,months,blacklisted\n";

    #[test]
    fn reads_profiles_with_trimmed_cells() {
        let data = format!(
            "{HEADER}Maria, 54 ,Permanent,3400,0,650,40000,yes,car,120,no\nLuca,23,temporary,2100,250,720,8000,TRUE,personal,36,N\n"
        );

        let profiles = read_profiles(data.as_bytes()).expect("csv parses");

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Maria");
        assert_eq!(profiles[0].age, 54);
        assert_eq!(profiles[0].work, Employment::Permanent);
        assert_eq!(profiles[0].loan_kind, LoanKind::Car);
        assert!(profiles[0].cosigner);
        assert!(!profiles[0].blacklisted);
        assert_eq!(profiles[1].outstanding_debts, 250.0);
        assert_eq!(profiles[1].work, Employment::Temporary);
        assert!(profiles[1].cosigner);
        assert!(!profiles[1].blacklisted);
    }

    #[test]
    fn rejects_unknown_loan_category_with_row_number() {
        let data = format!(
            "{HEADER}Maria,54,permanent,3400,0,650,40000,yes,car,120,no\nPaolo,40,permanent,3000,0,700,9000,no,boat,24,no\n"
        );

        let err = read_profiles(data.as_bytes()).expect_err("boat is not a loan kind");
        match err {
            ImportError::InvalidRow {
                row: 2,
                source: ProfileError::UnknownCategory { field, value },
            } => {
                assert_eq!(field, "loan_kind");
                assert_eq!(value, "boat");
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_flags() {
        let data = format!("{HEADER}Maria,54,permanent,3400,0,650,40000,maybe,car,120,no\n");

        let err = read_profiles(data.as_bytes()).expect_err("maybe is not a flag");
        assert!(matches!(
            err,
            ImportError::InvalidFlag {
                row: 1,
                field: "cosigner",
                ..
            }
        ));
    }

    #[test]
    fn empty_blacklist_cell_is_not_read_as_clear() {
        let data = format!("{HEADER}Maria,54,permanent,3400,0,650,40000,yes,car,120,\n");

        let err = read_profiles(data.as_bytes()).expect_err("blacklist status missing");
        match err {
            ImportError::InvalidFlag { row, field, value } => {
                assert_eq!((row, field), (1, "blacklisted"));
                assert!(value.is_empty());
            }
            other => panic!("expected invalid flag, got {other:?}"),
        }
    }

    #[test]
    fn empty_debts_cell_is_not_read_as_zero() {
        let data = format!("{HEADER}Maria,54,permanent,3400,,650,40000,yes,car,120,no\n");

        let err = read_profiles(data.as_bytes()).expect_err("debts missing");
        assert!(matches!(err, ImportError::Csv(_)));
    }

    #[test]
    fn malformed_numbers_surface_as_csv_errors() {
        let data = format!("{HEADER}Maria,fifty,permanent,3400,0,650,40000,yes,car,120,no\n");

        let err = read_profiles(data.as_bytes()).expect_err("age must be numeric");
        assert!(matches!(err, ImportError::Csv(_)));
    }
}
