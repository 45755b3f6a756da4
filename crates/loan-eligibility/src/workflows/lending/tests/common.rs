use std::sync::Arc;

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::solver::{ConstraintSolver, ConstraintSystem, PropagatingSolver, SolverError, Verdict};
use crate::workflows::lending::domain::{ApplicantProfile, Employment, LoanKind};
use crate::workflows::lending::evaluation::{Decision, EligibilityResolver, RejectionReason};
use crate::workflows::lending::{decision_router, ResolutionOutcome};

/// Reference applicant: 54, permanent job, 40k car loan over ten years.
pub(crate) fn profile() -> ApplicantProfile {
    ApplicantProfile {
        name: "Maria".to_string(),
        age: 54,
        work: Employment::Permanent,
        income: 3400.0,
        outstanding_debts: 0.0,
        credit_score: 650,
        requested: 40_000.0,
        cosigner: true,
        loan_kind: LoanKind::Car,
        months: 120,
        blacklisted: false,
    }
}

/// Financially comfortable applicant used to isolate hard disqualifiers.
pub(crate) fn ideal_profile(name: &str) -> ApplicantProfile {
    ApplicantProfile {
        name: name.to_string(),
        age: 45,
        work: Employment::Permanent,
        income: 12_000.0,
        outstanding_debts: 0.0,
        credit_score: 950,
        requested: 10_000.0,
        cosigner: true,
        loan_kind: LoanKind::Personal,
        months: 60,
        blacklisted: false,
    }
}

pub(crate) fn resolver() -> EligibilityResolver {
    EligibilityResolver::new()
}

pub(crate) fn resolve(profile: &ApplicantProfile) -> ResolutionOutcome {
    resolver()
        .resolve(profile)
        .expect("profile resolves to a decision")
}

/// Resolves the profile once per compiled-in solver backend.
pub(crate) fn resolve_on_every_backend(
    profile: &ApplicantProfile,
) -> Vec<(&'static str, ResolutionOutcome)> {
    let mut outcomes = vec![(
        "propagating",
        EligibilityResolver::with_solver(PropagatingSolver::default())
            .resolve(profile)
            .expect("propagating search decides"),
    )];
    #[cfg(feature = "z3")]
    outcomes.push((
        "z3",
        EligibilityResolver::with_solver(crate::solver::Z3Solver::default())
            .resolve(profile)
            .expect("z3 decides"),
    ));
    outcomes
}

pub(crate) fn approved_terms(outcome: &ResolutionOutcome) -> (f64, f64) {
    match outcome.decision {
        Decision::Approved {
            rate,
            monthly_payment,
        } => (rate, monthly_payment),
        ref other => panic!("expected approval for {}, got {other:?}", outcome.applicant),
    }
}

pub(crate) fn rejection_reason(outcome: &ResolutionOutcome) -> RejectionReason {
    match outcome.decision {
        Decision::Rejected { reason } => reason,
        ref other => panic!("expected rejection for {}, got {other:?}", outcome.applicant),
    }
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

/// Solver that never reaches a verdict.
pub(crate) struct UndecidedSolver;

impl ConstraintSolver for UndecidedSolver {
    fn check(&self, _system: &ConstraintSystem) -> Result<Verdict, SolverError> {
        Err(SolverError::Unknown {
            reason: "timeout".to_string(),
        })
    }
}

pub(crate) fn router() -> axum::Router {
    decision_router(Arc::new(resolver()))
}

pub(crate) async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
