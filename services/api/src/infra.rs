use loan_eligibility::config::AppConfig;
use loan_eligibility::error::AppError;
use loan_eligibility::workflows::lending::{ApplicantProfile, EligibilityResolver};
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Resolver tuned by `APP_SOLVER_*`; falls back to defaults when unset.
pub(crate) fn configured_resolver() -> Result<EligibilityResolver, AppError> {
    let config = AppConfig::load()?;
    Ok(EligibilityResolver::from_config(&config.solver))
}

pub(crate) fn read_profile_json(path: &Path) -> Result<ApplicantProfile, AppError> {
    let reader = BufReader::new(File::open(path)?);
    let profile = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
    Ok(profile)
}
