mod brackets;
mod indicators;
mod policy;
mod rules;

pub use brackets::{Bound, BracketTable, AMOUNT_ADJUSTMENTS, INCOME_ADJUSTMENTS};
pub use policy::{Decision, RejectionReason};

use super::domain::{ApplicantProfile, ProfileError};
use crate::config::SolverConfig;
use crate::solver::{ConstraintSolver, DefaultSolver, Model, RealVar, SolverError, Verdict};
use policy::diagnose_rejection;
use rules::{build_policy_system, PolicySystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Stateless resolver turning an applicant profile into a priced decision.
///
/// Every call builds its own constraint system, so one resolver can serve
/// concurrent requests as long as the solver itself keeps no per-check state.
#[derive(Debug, Clone)]
pub struct EligibilityResolver<S = DefaultSolver> {
    solver: S,
}

impl Default for EligibilityResolver<DefaultSolver> {
    fn default() -> Self {
        Self::with_solver(DefaultSolver::default())
    }
}

impl EligibilityResolver<DefaultSolver> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_solver(DefaultSolver::from_config(config))
    }
}

impl<S: ConstraintSolver> EligibilityResolver<S> {
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn resolve(&self, profile: &ApplicantProfile) -> Result<ResolutionOutcome, ResolveError> {
        profile.validate()?;

        let policy = build_policy_system(profile);
        debug!(
            applicant = %profile.name,
            assertions = policy.system.assertions().len(),
            "constraint system built"
        );

        let verdict = self.solver.check(&policy.system).map_err(|err| {
            warn!(applicant = %profile.name, error = %err, "solver returned no verdict");
            err
        })?;

        let outcome = match verdict {
            Verdict::Satisfiable(model) => {
                let pricing = PricingBreakdown::read(&policy, &model)?;
                let decision = Decision::Approved {
                    rate: read_real(&policy, &model, policy.rate)?,
                    monthly_payment: read_real(&policy, &model, policy.monthly_payment)?,
                };
                ResolutionOutcome {
                    applicant: profile.name.clone(),
                    decision,
                    pricing: Some(pricing),
                }
            }
            Verdict::Unsatisfiable => ResolutionOutcome {
                applicant: profile.name.clone(),
                decision: Decision::Rejected {
                    reason: diagnose_rejection(profile),
                },
                pricing: None,
            },
        };

        info!(
            applicant = %outcome.applicant,
            loan_kind = %profile.loan_kind,
            approved = outcome.decision.is_approved(),
            "loan decision resolved"
        );
        Ok(outcome)
    }
}

fn read_real(policy: &PolicySystem, model: &Model, var: RealVar) -> Result<f64, SolverError> {
    model.real(var).ok_or_else(|| SolverError::MissingValue {
        name: policy
            .system
            .real_name(var)
            .unwrap_or("<undeclared>")
            .to_string(),
    })
}

/// Rate components read back from the satisfying model, for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub base_rate: f64,
    pub type_adjustment: f64,
    pub income_adjustment: f64,
    pub amount_adjustment: f64,
}

impl PricingBreakdown {
    fn read(policy: &PolicySystem, model: &Model) -> Result<Self, SolverError> {
        Ok(Self {
            base_rate: read_real(policy, model, policy.base_rate)?,
            type_adjustment: read_real(policy, model, policy.type_adjustment)?,
            income_adjustment: read_real(policy, model, policy.income_adjustment)?,
            amount_adjustment: read_real(policy, model, policy.amount_adjustment)?,
        })
    }
}

/// Decision for one applicant together with its pricing trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub applicant: String,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pricing: Option<PricingBreakdown>,
}

/// Failure to reach a decision; a policy rejection is never an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid applicant profile: {0}")]
    InvalidProfile(#[from] ProfileError),
    #[error("constraint solver failed: {0}")]
    Solver(#[from] SolverError),
}
