use super::super::domain::{ApplicantProfile, Employment, LoanKind};
use super::brackets::{AMOUNT_ADJUSTMENTS, INCOME_ADJUSTMENTS};
use super::indicators::Indicators;
use crate::solver::{BoolVar, ConstraintSystem, Formula, RealVar, Term};

pub(crate) const MAX_AGE: f64 = 75.0;
pub(crate) const COSIGNER_AGE: f64 = 25.0;
const SURCHARGE_AGE: f64 = 35.0;
const SURCHARGE_FACTOR: f64 = 0.5;
const CREDIT_CEILING: f64 = 1000.0;
const CREDIT_SLOPE: f64 = 0.017;
const CAR_MAX_REQUESTED: f64 = 50_000.0;
const CAR_MAX_DEBTS: f64 = 5_000.0;
const HOUSE_MIN_REQUESTED: f64 = 30_000.0;
const HOUSE_RATE_ADJUSTMENT: f64 = -2.0;
const HOUSE_AFFORDABILITY: f64 = 0.5;
const DEFAULT_AFFORDABILITY: f64 = 0.2;

/// Constraint system for one applicant plus the unknowns the resolver reads back.
pub(crate) struct PolicySystem {
    pub system: ConstraintSystem,
    pub approved: BoolVar,
    pub rate: RealVar,
    pub monthly_payment: RealVar,
    pub base_rate: RealVar,
    pub type_adjustment: RealVar,
    pub income_adjustment: RealVar,
    pub amount_adjustment: RealVar,
}

pub(crate) fn build_policy_system(profile: &ApplicantProfile) -> PolicySystem {
    let mut system = ConstraintSystem::new();
    let approved = system.bool_var("approved");
    let rate = system.real_var("rate");
    let monthly_payment = system.real_var("monthly_payment");

    let age = Term::from(f64::from(profile.age));
    let income = Term::from(profile.income);
    let requested = Term::from(profile.requested);
    let months = Term::from(f64::from(profile.months));
    let cosigner = Formula::from(profile.cosigner);

    system.assert(age.clone().ge(MAX_AGE).implies(!Formula::from(approved)));
    system.assert(
        Formula::and([age.clone().le(COSIGNER_AGE), !cosigner.clone()])
            .implies(!Formula::from(approved)),
    );

    let work = Indicators::encode(&mut system, profile.work);
    system.assert(
        work.is(Employment::Unemployed)
            .xor(work.is(Employment::Temporary))
            .implies(cosigner),
    );

    let kind = Indicators::encode(&mut system, profile.loan_kind);
    system.assert(
        kind.is(LoanKind::Car)
            .implies(requested.clone().le(CAR_MAX_REQUESTED)),
    );
    system.assert(
        kind.is(LoanKind::House)
            .implies(requested.clone().ge(HOUSE_MIN_REQUESTED)),
    );
    system.assert(
        kind.is(LoanKind::Car)
            .implies(Term::from(profile.outstanding_debts).le(CAR_MAX_DEBTS)),
    );

    let base_rate = system.real_var("base_rate");
    let credit_component = (CREDIT_CEILING - f64::from(profile.credit_score)) * CREDIT_SLOPE;
    system.assert(age.clone().le(SURCHARGE_AGE).implies(
        Term::from(base_rate).equals(
            Term::from(credit_component)
                + Term::from(SURCHARGE_FACTOR) * (Term::from(SURCHARGE_AGE) - age.clone()).sqrt(),
        ),
    ));
    system.assert(
        age.gt(SURCHARGE_AGE)
            .implies(Term::from(base_rate).equals(credit_component)),
    );

    let type_adjustment = system.real_var("type_adj");
    system.assert(Term::from(type_adjustment).equals(Term::ite(
        kind.is(LoanKind::House),
        HOUSE_RATE_ADJUSTMENT,
        0.0,
    )));

    let income_adjustment = system.real_var("income_adj");
    system.assert(Term::from(income_adjustment).equals(INCOME_ADJUSTMENTS.to_term(&income)));

    let amount_adjustment = system.real_var("dti_adj");
    system.assert(Term::from(amount_adjustment).equals(AMOUNT_ADJUSTMENTS.to_term(&requested)));

    system.assert(Term::from(rate).equals(Term::ite(
        approved.into(),
        Term::from(base_rate) + type_adjustment + income_adjustment + amount_adjustment,
        0.0,
    )));

    // Flat interest spread evenly over the term.
    let installment = |rate: Term| {
        requested.clone() / months.clone() + rate / 100.0 * requested.clone() / months.clone()
    };
    system.assert(Term::from(monthly_payment).equals(Term::ite(
        approved.into(),
        installment(Term::from(rate)),
        0.0,
    )));

    // `approved` is defined through `rate`, which is gated on `approved`.
    let payment = installment(Term::from(rate));
    system.assert(Formula::from(approved).iff(Formula::ite(
        kind.is(LoanKind::House),
        payment
            .clone()
            .le_approx(Term::from(HOUSE_AFFORDABILITY) * income.clone()),
        payment.le_approx(Term::from(DEFAULT_AFFORDABILITY) * income),
    )));

    system.assert(Formula::from(profile.blacklisted).implies(!Formula::from(approved)));

    system.assert(approved.into());

    PolicySystem {
        system,
        approved,
        rate,
        monthly_payment,
        base_rate,
        type_adjustment,
        income_adjustment,
        amount_adjustment,
    }
}
