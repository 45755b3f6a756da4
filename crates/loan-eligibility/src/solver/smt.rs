//! Z3 backend: lowers a [`ConstraintSystem`] into Z3 assertions over exact rationals.

use tracing::trace;
use z3::{
    ast::{Ast, Bool, Real},
    Config, Context, SatResult, Solver,
};

use super::formula::{Comparison, Formula, Term};
use super::{BoolVar, ConstraintSolver, ConstraintSystem, Model, RealVar, SolverError, Verdict};
use super::{DEFAULT_TIMEOUT_MS, DEFAULT_TOLERANCE};
use crate::config::SolverConfig;

/// Decimal digits requested when reading an algebraic model value back as `f64`.
const READBACK_PRECISION: usize = 17;

/// [`ConstraintSolver`] delegating to Z3.
///
/// Literals are lowered through their shortest decimal rendering, so `0.017`
/// becomes `17/1000` and comparisons are decided over exact rationals.
/// [`Comparison::ApproxLe`] widens its right-hand side by `tolerance` times
/// `max(1, |rhs|)`, the same slack the propagating search grants. A fresh
/// [`Context`] is created per check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Z3Solver {
    timeout_ms: u64,
    tolerance: f64,
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS, DEFAULT_TOLERANCE)
    }
}

impl Z3Solver {
    pub fn new(timeout_ms: u64, tolerance: f64) -> Self {
        Self {
            timeout_ms,
            tolerance: tolerance.abs(),
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.timeout_ms, config.tolerance)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl ConstraintSolver for Z3Solver {
    fn check(&self, system: &ConstraintSystem) -> Result<Verdict, SolverError> {
        let mut cfg = Config::new();
        cfg.set_timeout_msec(self.timeout_ms);
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);

        let lowering = Lowering::declare(&ctx, system, self.tolerance)?;
        for assertion in system.assertions() {
            solver.assert(&lowering.formula(assertion)?);
        }

        let result = solver.check();
        trace!(?result, assertions = system.assertions().len(), "z3 check finished");

        match result {
            SatResult::Unsat => Ok(Verdict::Unsatisfiable),
            SatResult::Unknown => Err(SolverError::Unknown {
                reason: solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "z3 gave no reason".to_string()),
            }),
            SatResult::Sat => {
                let model = solver.get_model().ok_or_else(|| SolverError::Unknown {
                    reason: "z3 reported sat without a model".to_string(),
                })?;
                lowering.read_model(system, &model).map(Verdict::Satisfiable)
            }
        }
    }
}

struct Lowering<'ctx> {
    ctx: &'ctx Context,
    bools: Vec<Bool<'ctx>>,
    reals: Vec<Real<'ctx>>,
    tolerance: Real<'ctx>,
}

impl<'ctx> Lowering<'ctx> {
    fn declare(
        ctx: &'ctx Context,
        system: &ConstraintSystem,
        tolerance: f64,
    ) -> Result<Self, SolverError> {
        let bools = (0..system.bool_count())
            .map(|index| Bool::new_const(ctx, format!("b{index}")))
            .collect();
        let reals = (0..system.real_count())
            .map(|index| Real::new_const(ctx, format!("r{index}")))
            .collect();
        let tolerance = literal(ctx, tolerance)?;
        Ok(Self {
            ctx,
            bools,
            reals,
            tolerance,
        })
    }

    fn formula(&self, formula: &Formula) -> Result<Bool<'ctx>, SolverError> {
        Ok(match formula {
            Formula::Const(value) => Bool::from_bool(self.ctx, *value),
            Formula::Var(var) => self
                .bools
                .get(var.0)
                .cloned()
                .ok_or_else(|| undeclared("boolean", var.0))?,
            Formula::Not(inner) => self.formula(inner)?.not(),
            Formula::And(parts) => {
                let parts = self.formulas(parts)?;
                Bool::and(self.ctx, &parts.iter().collect::<Vec<_>>())
            }
            Formula::Or(parts) => {
                let parts = self.formulas(parts)?;
                Bool::or(self.ctx, &parts.iter().collect::<Vec<_>>())
            }
            Formula::Xor(lhs, rhs) => self.formula(lhs)?.xor(&self.formula(rhs)?),
            Formula::Implies(antecedent, consequent) => self
                .formula(antecedent)?
                .implies(&self.formula(consequent)?),
            Formula::Iff(lhs, rhs) => self.formula(lhs)?.iff(&self.formula(rhs)?),
            Formula::Ite(condition, then, otherwise) => self
                .formula(condition)?
                .ite(&self.formula(then)?, &self.formula(otherwise)?),
            Formula::Compare(op, lhs, rhs) => {
                let lhs = self.term(lhs)?;
                let rhs = self.term(rhs)?;
                match op {
                    Comparison::Eq => lhs._eq(&rhs),
                    Comparison::Le => lhs.le(&rhs),
                    Comparison::ApproxLe => lhs.le(&self.widened(&rhs)),
                    Comparison::Lt => lhs.lt(&rhs),
                    Comparison::Ge => lhs.ge(&rhs),
                    Comparison::Gt => lhs.gt(&rhs),
                }
            }
        })
    }

    fn formulas(&self, parts: &[Formula]) -> Result<Vec<Bool<'ctx>>, SolverError> {
        parts.iter().map(|part| self.formula(part)).collect()
    }

    /// `rhs + tolerance * max(1, |rhs|)`.
    fn widened(&self, rhs: &Real<'ctx>) -> Real<'ctx> {
        let one = Real::from_real(self.ctx, 1, 1);
        let magnitude = rhs.ge(&Real::from_real(self.ctx, 0, 1)).ite(rhs, &rhs.unary_minus());
        let scale = magnitude.ge(&one).ite(&magnitude, &one);
        Real::add(self.ctx, &[rhs, &Real::mul(self.ctx, &[&self.tolerance, &scale])])
    }

    fn term(&self, term: &Term) -> Result<Real<'ctx>, SolverError> {
        Ok(match term {
            Term::Const(value) => literal(self.ctx, *value)?,
            Term::Var(var) => self
                .reals
                .get(var.0)
                .cloned()
                .ok_or_else(|| undeclared("real", var.0))?,
            Term::Add(lhs, rhs) => Real::add(self.ctx, &[&self.term(lhs)?, &self.term(rhs)?]),
            Term::Sub(lhs, rhs) => Real::sub(self.ctx, &[&self.term(lhs)?, &self.term(rhs)?]),
            Term::Mul(lhs, rhs) => Real::mul(self.ctx, &[&self.term(lhs)?, &self.term(rhs)?]),
            Term::Div(lhs, rhs) => self.term(lhs)?.div(&self.term(rhs)?),
            Term::Sqrt(inner) => self.term(inner)?.power(&Real::from_real(self.ctx, 1, 2)),
            Term::Ite(condition, then, otherwise) => self
                .formula(condition)?
                .ite(&self.term(then)?, &self.term(otherwise)?),
        })
    }

    fn read_model(
        &self,
        system: &ConstraintSystem,
        model: &z3::Model<'ctx>,
    ) -> Result<Model, SolverError> {
        let bools = self
            .bools
            .iter()
            .enumerate()
            .map(|(index, var)| {
                model
                    .eval(var, true)
                    .and_then(|value| value.as_bool())
                    .ok_or_else(|| missing(system.bool_name(BoolVar(index))))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let reals = self
            .reals
            .iter()
            .enumerate()
            .map(|(index, var)| {
                model
                    .eval(var, true)
                    .and_then(|value| read_decimal(&value.approx(READBACK_PRECISION)))
                    .ok_or_else(|| missing(system.real_name(RealVar(index))))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Model::new(bools, reals))
    }
}

fn literal(ctx: &Context, value: f64) -> Result<Real<'_>, SolverError> {
    let (numerator, denominator) = decimal_fraction(value).ok_or_else(|| SolverError::Unknown {
        reason: format!("literal {value} has no exact rational form"),
    })?;
    Real::from_real_str(ctx, &numerator, &denominator).ok_or_else(|| SolverError::Unknown {
        reason: format!("z3 rejected literal {numerator}/{denominator}"),
    })
}

/// Splits a finite `f64` into decimal numerator and denominator strings.
fn decimal_fraction(value: f64) -> Option<(String, String)> {
    if !value.is_finite() {
        return None;
    }

    // `Display` for f64 never switches to exponent notation.
    let rendered = value.to_string();
    let (sign, digits) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    let joined = format!("{whole}{fraction}");
    let trimmed = joined.trim_start_matches('0');
    let numerator = if trimmed.is_empty() {
        "0".to_string()
    } else {
        format!("{sign}{trimmed}")
    };
    let denominator = format!("1{}", "0".repeat(fraction.len()));

    Some((numerator, denominator))
}

/// Parses Z3's decimal rendering; irrational values carry a trailing `?`.
fn read_decimal(rendered: &str) -> Option<f64> {
    rendered.trim_end_matches('?').parse().ok()
}

fn undeclared(kind: &str, index: usize) -> SolverError {
    SolverError::Unknown {
        reason: format!("{kind} unknown #{index} is not declared on this system"),
    }
}

fn missing(name: Option<&str>) -> SolverError {
    SolverError::MissingValue {
        name: name.unwrap_or("<undeclared>").to_string(),
    }
}
