//! Loan eligibility: applicant intake, constraint-based pricing, and decision routing.

pub mod domain;
pub mod evaluation;
pub mod import;
pub mod router;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantProfile, Employment, LoanKind, ProfileError, MAX_AMOUNT};
pub use evaluation::{
    Decision, EligibilityResolver, PricingBreakdown, RejectionReason, ResolutionOutcome,
    ResolveError,
};
pub use import::{read_profiles, read_profiles_from_path, ImportError};
pub use router::{decision_router, BatchEntry, MAX_BATCH_SIZE};
