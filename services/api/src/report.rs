use chrono::{DateTime, Utc};
use loan_eligibility::workflows::lending::{ApplicantProfile, Decision, ResolutionOutcome};
use serde::Serialize;

/// Outcome stamped with the time it was produced, for machine-readable output.
#[derive(Debug, Serialize)]
pub(crate) struct DecisionEnvelope {
    pub(crate) evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) outcome: ResolutionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) total_interest: Option<f64>,
}

impl DecisionEnvelope {
    pub(crate) fn new(
        profile: &ApplicantProfile,
        outcome: ResolutionOutcome,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let total_interest = outcome.decision.total_interest(profile);
        Self {
            evaluated_at,
            outcome,
            total_interest,
        }
    }
}

/// Console rendering of one decision.
pub(crate) fn render_outcome(profile: &ApplicantProfile, outcome: &ResolutionOutcome) -> String {
    let mut lines = Vec::new();
    match &outcome.decision {
        Decision::Approved {
            rate,
            monthly_payment,
        } => {
            lines.push("APPROVED".to_string());
            lines.push(outcome.applicant.clone());
            lines.push(format!("Rate: {rate:.2}%"));
            lines.push(format!("Income: {:.2}", profile.income));
            lines.push(format!("Requested: {:.2}", profile.requested));
            lines.push(format!("Credit score: {}", profile.credit_score));
            lines.push(format!(
                "Monthly payment ({} months): {monthly_payment:.2}",
                profile.months
            ));
            if let Some(interest) = outcome.decision.total_interest(profile) {
                lines.push(format!("Total interest: {interest:.2}"));
            }
        }
        Decision::Rejected { reason } => {
            lines.push("REJECTED".to_string());
            lines.push(outcome.applicant.clone());
            lines.push(format!("Reason: {}", reason.label()));
        }
    }
    lines.join("\n")
}
