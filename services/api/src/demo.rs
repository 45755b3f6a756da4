use crate::infra::configured_resolver;
use crate::report::render_outcome;
use clap::Args;
use loan_eligibility::error::AppError;
use loan_eligibility::workflows::lending::{ApplicantProfile, Employment, LoanKind};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only run the reference car loan.
    #[arg(long)]
    pub(crate) quick: bool,
    /// Print the pricing components behind each approval.
    #[arg(long)]
    pub(crate) show_pricing: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let resolver = configured_resolver()?;
    let applicants = if args.quick {
        vec![reference_applicant()]
    } else {
        demo_applicants()
    };

    println!("Loan eligibility demo");
    for (index, profile) in applicants.iter().enumerate() {
        let outcome = resolver.resolve(profile)?;
        println!(
            "\n[{}] {} | {} loan of {:.2} over {} months",
            index + 1,
            profile.work,
            profile.loan_kind,
            profile.requested,
            profile.months
        );
        println!("{}", render_outcome(profile, &outcome));

        if args.show_pricing {
            if let Some(pricing) = &outcome.pricing {
                println!(
                    "  base {:.2} | type {:+.2} | income {:+.2} | amount {:+.2}",
                    pricing.base_rate,
                    pricing.type_adjustment,
                    pricing.income_adjustment,
                    pricing.amount_adjustment
                );
            }
        }
    }

    Ok(())
}

pub(crate) fn reference_applicant() -> ApplicantProfile {
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

/// Reference applicant followed by variations that each trip a different rule.
pub(crate) fn demo_applicants() -> Vec<ApplicantProfile> {
    let maria = reference_applicant();

    let house = ApplicantProfile {
        name: "Maria (house)".to_string(),
        loan_kind: LoanKind::House,
        ..maria.clone()
    };
    let stretched = ApplicantProfile {
        name: "Giulia".to_string(),
        income: 1500.0,
        ..maria.clone()
    };
    let stretched_house = ApplicantProfile {
        name: "Giulia (house)".to_string(),
        loan_kind: LoanKind::House,
        ..stretched.clone()
    };
    let young = ApplicantProfile {
        name: "Luca".to_string(),
        age: 23,
        work: Employment::Temporary,
        cosigner: false,
        requested: 8_000.0,
        loan_kind: LoanKind::Personal,
        months: 36,
        ..maria.clone()
    };
    let listed = ApplicantProfile {
        name: "Franco".to_string(),
        blacklisted: true,
        ..maria.clone()
    };

    vec![maria, house, stretched, stretched_house, young, listed]
}
