use super::super::domain::ApplicantProfile;
use super::rules::{COSIGNER_AGE, MAX_AGE};
use serde::{Deserialize, Serialize};

const MIN_CREDIT_SCORE: i32 = 100;
const MIN_INCOME: f64 = 1000.0;

/// Outcome of resolving one applicant profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Decision {
    /// `rate` is a percentage; `monthly_payment` is in the currency of the request.
    Approved { rate: f64, monthly_payment: f64 },
    Rejected { reason: RejectionReason },
}

impl Decision {
    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved { .. })
    }

    pub fn rate(&self) -> Option<f64> {
        match self {
            Decision::Approved { rate, .. } => Some(*rate),
            Decision::Rejected { .. } => None,
        }
    }

    pub fn monthly_payment(&self) -> Option<f64> {
        match self {
            Decision::Approved {
                monthly_payment, ..
            } => Some(*monthly_payment),
            Decision::Rejected { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Decision::Approved { .. } => None,
            Decision::Rejected { reason } => Some(*reason),
        }
    }

    /// Interest paid over the whole term: `monthly_payment * months - requested`.
    pub fn total_interest(&self, profile: &ApplicantProfile) -> Option<f64> {
        self.monthly_payment()
            .map(|payment| payment * f64::from(profile.months) - profile.requested)
    }

    pub fn summary(&self) -> String {
        match self {
            Decision::Approved {
                rate,
                monthly_payment,
            } => format!("approved at {rate:.2}% with a monthly payment of {monthly_payment:.2}"),
            Decision::Rejected { reason } => format!("rejected: {}", reason.label()),
        }
    }
}

/// Rejection tags, listed in diagnosis priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Blacklisted,
    AgeNotEligible,
    MissingCosigner,
    InsufficientCreditScore,
    InsufficientIncome,
    RateOrAffordability,
}

impl RejectionReason {
    pub const fn label(self) -> &'static str {
        match self {
            RejectionReason::Blacklisted => "blacklisted",
            RejectionReason::AgeNotEligible => "age not eligible (too old)",
            RejectionReason::MissingCosigner => "missing required cosigner",
            RejectionReason::InsufficientCreditScore => "insufficient credit score",
            RejectionReason::InsufficientIncome => "insufficient income",
            RejectionReason::RateOrAffordability => "rate or affordability requirements not met",
        }
    }
}

/// Best-effort explanation of an infeasible system.
///
/// Checks the profile against a fixed priority list instead of inspecting why
/// the solver failed, so a rejection caused by affordability can be reported
/// under an earlier heading when that threshold is also violated.
pub(crate) fn diagnose_rejection(profile: &ApplicantProfile) -> RejectionReason {
    let age = f64::from(profile.age);

    if profile.blacklisted {
        RejectionReason::Blacklisted
    } else if age >= MAX_AGE {
        RejectionReason::AgeNotEligible
    } else if age <= COSIGNER_AGE && !profile.cosigner {
        RejectionReason::MissingCosigner
    } else if profile.credit_score < MIN_CREDIT_SCORE {
        RejectionReason::InsufficientCreditScore
    } else if profile.income < MIN_INCOME {
        RejectionReason::InsufficientIncome
    } else {
        RejectionReason::RateOrAffordability
    }
}
