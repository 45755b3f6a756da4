use super::common::*;
use crate::config::SolverConfig;
use crate::solver::{PropagatingSolver, SolverError};
use crate::workflows::lending::domain::{Employment, LoanKind, ProfileError, MAX_AMOUNT};
use crate::workflows::lending::evaluation::{
    Decision, EligibilityResolver, RejectionReason, ResolveError,
};

#[test]
fn car_loan_within_bounds_is_priced_by_the_solver() {
    let applicant = profile();

    let outcome = resolve(&applicant);
    let (rate, payment) = approved_terms(&outcome);

    // 350 points below the ceiling at 0.017, plus the 2500-3500 income band and the 25k-40k band.
    assert_close(rate, 6.15);
    assert_close(payment, 40_000.0 / 120.0 * 1.0615);
    assert_close(
        outcome.decision.total_interest(&applicant).expect("approved"),
        2460.0,
    );
    assert!(applicant.requested <= 50_000.0 && applicant.outstanding_debts <= 5_000.0);
    assert!(payment <= 0.2 * applicant.income);

    let pricing = outcome.pricing.expect("pricing trail on approval");
    assert_close(pricing.base_rate, 5.95);
    assert_close(pricing.type_adjustment, 0.0);
    assert_close(pricing.income_adjustment, 0.1);
    assert_close(pricing.amount_adjustment, 0.1);
}

#[test]
fn car_loan_with_excess_debt_is_rejected() {
    let mut applicant = profile();
    applicant.outstanding_debts = 5_000.01;

    let outcome = resolve(&applicant);

    assert_eq!(
        rejection_reason(&outcome),
        RejectionReason::RateOrAffordability
    );
    assert!(outcome.pricing.is_none());
}

#[test]
fn house_loan_gets_discount_and_wider_affordability() {
    let mut applicant = profile();
    applicant.loan_kind = LoanKind::House;

    let outcome = resolve(&applicant);
    let (rate, payment) = approved_terms(&outcome);

    assert_close(rate, 4.15);
    assert_close(payment, 40_000.0 / 120.0 * 1.0415);
    let pricing = outcome.pricing.expect("pricing trail on approval");
    assert_close(pricing.type_adjustment, -2.0);

    let (car_rate, car_payment) = approved_terms(&resolve(&profile()));
    assert_close(car_rate - rate, 2.0);
    assert!(payment < car_payment);
}

#[test]
fn wider_house_margin_turns_rejection_into_approval() {
    let mut car = profile();
    car.income = 1_500.0;
    let mut house = car.clone();
    house.loan_kind = LoanKind::House;

    let car_outcome = resolve(&car);
    let house_outcome = resolve(&house);

    // Car: 6.35% leaves a 354.50 installment against a 300 ceiling.
    assert_eq!(
        rejection_reason(&car_outcome),
        RejectionReason::RateOrAffordability
    );
    let (rate, payment) = approved_terms(&house_outcome);
    assert_close(rate, 4.35);
    assert!(payment > 0.2 * house.income && payment <= 0.5 * house.income);
}

#[test]
fn blacklisted_applicants_are_always_rejected_as_blacklisted() {
    let mut variants = vec![profile(), ideal_profile("ideal")];
    let mut old = ideal_profile("old");
    old.age = 80;
    variants.push(old);
    let mut young = ideal_profile("young");
    young.age = 20;
    young.cosigner = false;
    variants.push(young);

    for mut applicant in variants {
        applicant.blacklisted = true;
        let outcome = resolve(&applicant);
        assert_eq!(rejection_reason(&outcome), RejectionReason::Blacklisted);
    }
}

#[test]
fn applicants_aged_75_or_more_are_not_eligible() {
    for age in [75, 76, 90] {
        let mut applicant = ideal_profile("senior");
        applicant.age = age;

        let outcome = resolve(&applicant);
        assert_eq!(
            rejection_reason(&outcome),
            RejectionReason::AgeNotEligible,
            "age {age}"
        );
    }

    let mut applicant = ideal_profile("senior");
    applicant.age = 74;
    assert!(resolve(&applicant).decision.is_approved());
}

#[test]
fn young_applicants_need_a_cosigner() {
    for age in [18, 22, 25] {
        let mut applicant = ideal_profile("junior");
        applicant.age = age;
        applicant.cosigner = false;

        let outcome = resolve(&applicant);
        assert_eq!(
            rejection_reason(&outcome),
            RejectionReason::MissingCosigner,
            "age {age}"
        );

        applicant.cosigner = true;
        assert!(resolve(&applicant).decision.is_approved(), "age {age}");
    }
}

#[test]
fn temporary_or_unemployed_applicants_need_a_cosigner() {
    for work in [Employment::Temporary, Employment::Unemployed] {
        let mut applicant = ideal_profile("contract");
        applicant.work = work;
        applicant.cosigner = false;

        let outcome = resolve(&applicant);
        assert_eq!(
            rejection_reason(&outcome),
            RejectionReason::RateOrAffordability,
            "{work}"
        );

        applicant.cosigner = true;
        assert!(resolve(&applicant).decision.is_approved(), "{work}");
    }

    let mut permanent = ideal_profile("permanent");
    permanent.cosigner = false;
    assert!(resolve(&permanent).decision.is_approved());
}

#[test]
fn car_loans_above_fifty_thousand_are_rejected() {
    let mut applicant = profile();
    applicant.income = 100_000.0;
    applicant.requested = 50_000.0;
    assert!(resolve(&applicant).decision.is_approved());

    for requested in [50_000.5, 50_001.0, 80_000.0] {
        applicant.requested = requested;
        let outcome = resolve(&applicant);
        assert!(!outcome.decision.is_approved(), "requested {requested}");
    }
}

#[test]
fn house_loans_below_thirty_thousand_are_rejected() {
    let mut applicant = profile();
    applicant.loan_kind = LoanKind::House;
    applicant.income = 100_000.0;
    applicant.requested = 30_000.0;
    assert!(resolve(&applicant).decision.is_approved());

    for requested in [29_999.5, 20_000.0, 1_000.0] {
        applicant.requested = requested;
        let outcome = resolve(&applicant);
        assert!(!outcome.decision.is_approved(), "requested {requested}");
    }
}

#[test]
fn policy_bounds_are_exact_on_every_backend() {
    let mut car = profile();
    car.income = 100_000.0;
    car.requested = 50_000.00001;

    let mut house = profile();
    house.loan_kind = LoanKind::House;
    house.income = 100_000.0;
    house.requested = 29_999.99999;

    let mut indebted = profile();
    indebted.outstanding_debts = 5_000.00001;

    for applicant in [car, house, indebted] {
        for (backend, outcome) in resolve_on_every_backend(&applicant) {
            assert!(
                !outcome.decision.is_approved(),
                "{backend} approved {} {}",
                applicant.loan_kind,
                applicant.requested
            );
        }
    }
}

#[test]
fn income_just_below_a_bracket_edge_keeps_the_lower_band() {
    let mut applicant = ideal_profile("edge");
    applicant.income = 4_499.99999;

    for (backend, outcome) in resolve_on_every_backend(&applicant) {
        let pricing = outcome.pricing.expect("approved");
        assert_eq!(pricing.income_adjustment, 0.0, "{backend}");
        assert_eq!(
            pricing.income_adjustment,
            crate::workflows::lending::evaluation::INCOME_ADJUSTMENTS.lookup(applicant.income)
        );
    }
}

#[test]
fn backends_agree_on_reference_applicants() {
    let mut stretched = profile();
    stretched.income = 1500.0;
    let mut young = ideal_profile("young");
    young.age = 23;
    let mut house = profile();
    house.loan_kind = LoanKind::House;

    for applicant in [profile(), stretched, young, house, ideal_profile("ideal")] {
        let outcomes = resolve_on_every_backend(&applicant);
        let (_, first) = &outcomes[0];
        for (backend, outcome) in &outcomes[1..] {
            assert_eq!(
                outcome.decision.is_approved(),
                first.decision.is_approved(),
                "{backend} on {}",
                applicant.name
            );
            assert_eq!(outcome.decision.reason(), first.decision.reason());
            if let (Some(rate), Some(expected)) = (outcome.decision.rate(), first.decision.rate()) {
                assert_close(rate, expected);
            }
        }
    }
}

#[test]
fn resolving_twice_yields_identical_decisions() {
    let resolver = resolver();
    for applicant in [profile(), ideal_profile("twice")] {
        let first = resolver.resolve(&applicant).expect("resolves");
        let second = resolver.resolve(&applicant).expect("resolves");

        assert_eq!(first, second);
        assert_eq!(
            first.decision.rate().map(f64::to_bits),
            second.decision.rate().map(f64::to_bits)
        );
    }
}

#[test]
fn base_rate_never_increases_with_credit_score() {
    let mut previous = f64::INFINITY;
    for credit_score in [300, 450, 650, 800, 1000] {
        let mut applicant = ideal_profile("score");
        applicant.credit_score = credit_score;

        let pricing = resolve(&applicant).pricing.expect("approved");
        assert!(pricing.base_rate <= previous, "score {credit_score}");
        previous = pricing.base_rate;
    }
}

#[test]
fn base_rate_surcharge_never_shrinks_for_younger_applicants() {
    let mut previous = f64::NEG_INFINITY;
    for age in [45, 36, 35, 30, 26, 21, 18] {
        let mut applicant = ideal_profile("age");
        applicant.age = age;

        let pricing = resolve(&applicant).pricing.expect("approved");
        assert!(pricing.base_rate >= previous, "age {age}");
        previous = pricing.base_rate;
    }

    let mut applicant = ideal_profile("age");
    applicant.age = 26;
    let pricing = resolve(&applicant).pricing.expect("approved");
    assert_close(pricing.base_rate, 50.0 * 0.017 + 0.5 * 3.0);
}

#[test]
fn payment_exactly_at_the_affordability_ceiling_is_approved() {
    // Zero rate: perfect score, 3500-4500 income band, 10k-25k amount band.
    let mut applicant = ideal_profile("boundary");
    applicant.credit_score = 1000;
    applicant.income = 4_000.0;
    applicant.requested = 20_000.0;
    applicant.months = 25;

    let outcome = resolve(&applicant);
    let (rate, payment) = approved_terms(&outcome);
    assert_close(rate, 0.0);
    assert_close(payment, 0.2 * applicant.income);

    for requested in [20_000.5, 20_001.0, 24_000.0] {
        applicant.requested = requested;
        let outcome = resolve(&applicant);
        assert_eq!(
            rejection_reason(&outcome),
            RejectionReason::RateOrAffordability,
            "requested {requested}"
        );
    }
}

#[test]
fn diagnosis_follows_fixed_priority() {
    let mut low_score = ideal_profile("low-score");
    low_score.credit_score = 50;
    low_score.income = 3_000.0;
    low_score.requested = 60_000.0;
    assert_eq!(
        rejection_reason(&resolve(&low_score)),
        RejectionReason::InsufficientCreditScore
    );

    let mut low_income = ideal_profile("low-income");
    low_income.income = 900.0;
    low_income.months = 12;
    assert_eq!(
        rejection_reason(&resolve(&low_income)),
        RejectionReason::InsufficientIncome
    );

    let mut both = low_income.clone();
    both.age = 19;
    both.cosigner = false;
    both.credit_score = 10;
    assert_eq!(
        rejection_reason(&resolve(&both)),
        RejectionReason::MissingCosigner
    );
}

#[test]
fn invalid_profiles_fail_before_solving() {
    let mut zero_term = profile();
    zero_term.months = 0;
    let mut no_income = profile();
    no_income.income = 0.0;
    let mut negative_request = profile();
    negative_request.requested = -5.0;
    let mut nan_debts = profile();
    nan_debts.outstanding_debts = f64::NAN;
    let mut negative_debts = profile();
    negative_debts.outstanding_debts = -1.0;

    let resolver = EligibilityResolver::with_solver(UndecidedSolver);
    let cases = [
        (zero_term, "months"),
        (no_income, "income"),
        (negative_request, "requested"),
        (nan_debts, "outstanding_debts"),
        (negative_debts, "outstanding_debts"),
    ];
    for (applicant, field) in cases {
        match resolver.resolve(&applicant) {
            Err(ResolveError::InvalidProfile(err)) => {
                assert!(err.to_string().contains(field), "{err}");
            }
            other => panic!("expected invalid profile for {field}, got {other:?}"),
        }
    }
}

#[test]
fn astronomical_amounts_are_invalid_rather_than_undecided() {
    let mut huge_request = profile();
    huge_request.requested = 1e308;
    let mut huge_income = profile();
    huge_income.income = 2e12;
    let mut huge_debts = profile();
    huge_debts.outstanding_debts = -1e15;

    for applicant in [huge_request, huge_income, huge_debts] {
        match resolver().resolve(&applicant) {
            Err(ResolveError::InvalidProfile(ProfileError::OutOfRange { limit, .. })) => {
                assert_eq!(limit, MAX_AMOUNT);
            }
            other => panic!("expected an out-of-range profile, got {other:?}"),
        }
    }

    let mut at_limit = ideal_profile("limit");
    at_limit.income = MAX_AMOUNT;
    assert!(resolver().resolve(&at_limit).is_ok());
}

#[test]
fn solver_without_verdict_is_an_infrastructure_error() {
    let resolver = EligibilityResolver::with_solver(UndecidedSolver);

    let err = resolver
        .resolve(&profile())
        .expect_err("no verdict means no decision");

    assert_eq!(
        err,
        ResolveError::Solver(SolverError::Unknown {
            reason: "timeout".to_string()
        })
    );
}

#[test]
fn search_budget_exhaustion_is_not_a_rejection() {
    let config = SolverConfig {
        max_nodes: 2,
        ..SolverConfig::default()
    };
    let resolver = EligibilityResolver::with_solver(PropagatingSolver::from_config(&config));

    let err = resolver.resolve(&profile()).expect_err("budget too small");
    assert!(matches!(
        err,
        ResolveError::Solver(SolverError::BudgetExhausted { limit: 2 })
    ));
}

#[test]
fn decisions_serialize_with_status_tag() {
    let rejected = Decision::Rejected {
        reason: RejectionReason::MissingCosigner,
    };
    let value = serde_json::to_value(&rejected).expect("serializes");
    assert_eq!(value["status"], "rejected");
    assert_eq!(value["reason"], "missing_cosigner");
    assert_eq!(rejected.summary(), "rejected: missing required cosigner");

    let approved = Decision::Approved {
        rate: 6.15,
        monthly_payment: 353.8333,
    };
    assert_eq!(
        approved.summary(),
        "approved at 6.15% with a monthly payment of 353.83"
    );
    let round_trip: Decision =
        serde_json::from_value(serde_json::to_value(&approved).expect("serializes"))
            .expect("deserializes");
    assert_eq!(round_trip, approved);
}

#[test]
fn unknown_categories_are_rejected_when_parsing() {
    assert_eq!("House".parse::<LoanKind>(), Ok(LoanKind::House));
    assert_eq!(
        "freelance".parse::<Employment>(),
        Err(ProfileError::UnknownCategory {
            field: "work",
            value: "freelance".to_string()
        })
    );
}
