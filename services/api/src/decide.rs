use crate::infra::{configured_resolver, read_profile_json};
use crate::report::{render_outcome, DecisionEnvelope};
use chrono::Utc;
use clap::Args;
use loan_eligibility::error::AppError;
use loan_eligibility::workflows::lending::{
    read_profiles_from_path, ApplicantProfile, Employment, LoanKind, ProfileError,
    ResolutionOutcome, ResolveError,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// JSON file holding the applicant profile; replaces the individual flags
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    #[arg(long, default_value = "applicant")]
    pub(crate) name: String,
    #[arg(long, required_unless_present = "profile")]
    pub(crate) age: Option<u32>,
    /// permanent, temporary or unemployed
    #[arg(long, required_unless_present = "profile")]
    pub(crate) work: Option<Employment>,
    /// Monthly income
    #[arg(long, required_unless_present = "profile")]
    pub(crate) income: Option<f64>,
    /// Outstanding debts; pass 0 when there are none
    #[arg(long, required_unless_present = "profile")]
    pub(crate) debts: Option<f64>,
    #[arg(long, required_unless_present = "profile")]
    pub(crate) credit_score: Option<i32>,
    /// Principal requested
    #[arg(long, required_unless_present = "profile")]
    pub(crate) requested: Option<f64>,
    /// true or false
    #[arg(long, required_unless_present = "profile")]
    pub(crate) cosigner: Option<bool>,
    /// personal, car or house
    #[arg(long, required_unless_present = "profile")]
    pub(crate) loan_kind: Option<LoanKind>,
    /// Repayment term in months
    #[arg(long, required_unless_present = "profile")]
    pub(crate) months: Option<u32>,
    /// true or false
    #[arg(long, required_unless_present = "profile")]
    pub(crate) blacklisted: Option<bool>,
    /// Print a JSON envelope instead of the console report
    #[arg(long)]
    pub(crate) json: bool,
}

impl DecideArgs {
    pub(crate) fn into_profile(self) -> Result<ApplicantProfile, AppError> {
        if let Some(path) = self.profile {
            return read_profile_json(&path);
        }

        Ok(ApplicantProfile {
            name: self.name,
            age: required("age", self.age)?,
            work: required("work", self.work)?,
            income: required("income", self.income)?,
            outstanding_debts: required("outstanding_debts", self.debts)?,
            credit_score: required("credit_score", self.credit_score)?,
            requested: required("requested", self.requested)?,
            cosigner: required("cosigner", self.cosigner)?,
            loan_kind: required("loan_kind", self.loan_kind)?,
            months: required("months", self.months)?,
            blacklisted: required("blacklisted", self.blacklisted)?,
        })
    }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| ResolveError::from(ProfileError::Missing { field }).into())
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one applicant per row
    pub(crate) path: PathBuf,
    /// Print one JSON envelope per line instead of console reports
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let json = args.json;
    let profile = args.into_profile()?;
    let resolver = configured_resolver()?;

    let outcome = resolver.resolve(&profile)?;
    print_outcome(&profile, outcome, json)
}

/// Decides every row; a failing row is reported and the rest still run.
pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let profiles = read_profiles_from_path(&args.path)?;
    let resolver = configured_resolver()?;

    let mut approved = 0usize;
    let mut failed = 0usize;
    for profile in &profiles {
        match resolver.resolve(profile) {
            Ok(outcome) => {
                approved += usize::from(outcome.decision.is_approved());
                print_outcome(profile, outcome, args.json)?;
            }
            Err(err) => {
                failed += 1;
                eprintln!("{}: {err}", profile.name);
            }
        }
        if !args.json {
            println!();
        }
    }

    if !args.json {
        println!(
            "{} applications | {} approved | {} rejected | {} undecided",
            profiles.len(),
            approved,
            profiles.len() - approved - failed,
            failed
        );
    }
    Ok(())
}

fn print_outcome(
    profile: &ApplicantProfile,
    outcome: ResolutionOutcome,
    json: bool,
) -> Result<(), AppError> {
    if json {
        let envelope = DecisionEnvelope::new(profile, outcome, Utc::now());
        let line = serde_json::to_string(&envelope).map_err(std::io::Error::from)?;
        println!("{line}");
    } else {
        println!("{}", render_outcome(profile, &outcome));
    }
    Ok(())
}
