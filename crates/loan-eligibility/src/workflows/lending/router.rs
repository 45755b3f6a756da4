use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::ApplicantProfile;
use super::evaluation::{EligibilityResolver, ResolutionOutcome, ResolveError};
use crate::solver::ConstraintSolver;

/// Largest number of applicants accepted by one batch request.
pub const MAX_BATCH_SIZE: usize = 500;

/// Router builder exposing the decision endpoints.
pub fn decision_router<S>(resolver: Arc<EligibilityResolver<S>>) -> Router
where
    S: ConstraintSolver + 'static,
{
    Router::new()
        .route("/api/v1/loans/decisions", post(decide_handler::<S>))
        .route("/api/v1/loans/decisions/batch", post(batch_handler::<S>))
        .with_state(resolver)
}

/// Per-applicant slot of a batch response; exactly one of `outcome` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub applicant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ResolutionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub(crate) async fn decide_handler<S>(
    State(resolver): State<Arc<EligibilityResolver<S>>>,
    axum::Json(profile): axum::Json<ApplicantProfile>,
) -> Response
where
    S: ConstraintSolver + 'static,
{
    // Solving is CPU-bound; keep it off the async workers.
    let resolved = tokio::task::spawn_blocking(move || resolver.resolve(&profile)).await;

    match resolved {
        Ok(Ok(outcome)) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Ok(Err(error @ ResolveError::InvalidProfile(_))) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        Ok(Err(error @ ResolveError::Solver(_))) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
        Err(join_error) => internal_error(join_error),
    }
}

pub(crate) async fn batch_handler<S>(
    State(resolver): State<Arc<EligibilityResolver<S>>>,
    axum::Json(profiles): axum::Json<Vec<ApplicantProfile>>,
) -> Response
where
    S: ConstraintSolver + 'static,
{
    if profiles.len() > MAX_BATCH_SIZE {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "batch of {} applicants exceeds the limit of {MAX_BATCH_SIZE}",
                profiles.len()
            ),
        );
    }

    let resolved = tokio::task::spawn_blocking(move || {
        profiles
            .iter()
            .map(|profile| match resolver.resolve(profile) {
                Ok(outcome) => BatchEntry {
                    applicant: profile.name.clone(),
                    outcome: Some(outcome),
                    error: None,
                },
                Err(error) => BatchEntry {
                    applicant: profile.name.clone(),
                    outcome: None,
                    error: Some(error.to_string()),
                },
            })
            .collect::<Vec<_>>()
    })
    .await;

    match resolved {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(join_error) => internal_error(join_error),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn internal_error(join_error: tokio::task::JoinError) -> Response {
    error!(error = %join_error, "decision task failed");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "decision task failed".to_string(),
    )
}
