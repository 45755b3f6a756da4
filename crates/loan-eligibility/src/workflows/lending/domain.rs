use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Upper bound on the magnitude of any monetary field.
pub const MAX_AMOUNT: f64 = 1e12;

/// Inputs of a single eligibility decision.
///
/// Every field is required when deserializing; a missing flag is never read as `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantProfile {
    pub name: String,
    pub age: u32,
    pub work: Employment,
    /// Monthly income.
    pub income: f64,
    pub outstanding_debts: f64,
    pub credit_score: i32,
    /// Principal requested.
    pub requested: f64,
    pub cosigner: bool,
    #[serde(alias = "type_loan")]
    pub loan_kind: LoanKind,
    /// Repayment term in months.
    pub months: u32,
    pub blacklisted: bool,
}

impl ApplicantProfile {
    /// Domain preconditions checked before any constraint is built.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (field, value) in [
            ("income", self.income),
            ("outstanding_debts", self.outstanding_debts),
            ("requested", self.requested),
        ] {
            if !value.is_finite() {
                return Err(ProfileError::NotFinite { field });
            }
            if value.abs() > MAX_AMOUNT {
                return Err(ProfileError::OutOfRange {
                    field,
                    value,
                    limit: MAX_AMOUNT,
                });
            }
        }

        if self.months == 0 {
            return Err(ProfileError::NotPositive {
                field: "months",
                value: 0.0,
            });
        }
        if self.requested <= 0.0 {
            return Err(ProfileError::NotPositive {
                field: "requested",
                value: self.requested,
            });
        }
        if self.income <= 0.0 {
            return Err(ProfileError::NotPositive {
                field: "income",
                value: self.income,
            });
        }
        if self.outstanding_debts < 0.0 {
            return Err(ProfileError::NegativeDebts {
                value: self.outstanding_debts,
            });
        }

        Ok(())
    }
}

/// Employment category of the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Employment {
    Permanent,
    Temporary,
    Unemployed,
}

impl Employment {
    pub const ALL: [Employment; 3] = [
        Employment::Permanent,
        Employment::Temporary,
        Employment::Unemployed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Employment::Permanent => "permanent",
            Employment::Temporary => "temporary",
            Employment::Unemployed => "unemployed",
        }
    }
}

/// Product the applicant is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanKind {
    Personal,
    Car,
    House,
}

impl LoanKind {
    pub const ALL: [LoanKind; 3] = [LoanKind::Personal, LoanKind::Car, LoanKind::House];

    pub const fn label(self) -> &'static str {
        match self {
            LoanKind::Personal => "personal",
            LoanKind::Car => "car",
            LoanKind::House => "house",
        }
    }
}

impl fmt::Display for Employment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for LoanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Employment {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Employment::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
            .ok_or_else(|| ProfileError::UnknownCategory {
                field: "work",
                value: value.to_string(),
            })
    }
}

impl FromStr for LoanKind {
    type Err = ProfileError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        LoanKind::ALL
            .into_iter()
            .find(|kind| kind.label() == normalized)
            .ok_or_else(|| ProfileError::UnknownCategory {
                field: "loan_kind",
                value: value.to_string(),
            })
    }
}

/// Precondition violations on an [`ApplicantProfile`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be strictly positive (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not exceed {limit} in magnitude (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
    #[error("outstanding_debts must not be negative (got {value})")]
    NegativeDebts { value: f64 },
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("unknown {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },
}
