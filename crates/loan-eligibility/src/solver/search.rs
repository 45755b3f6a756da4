use tracing::trace;

use super::formula::{Comparison, Formula, Term};
use super::{ConstraintSolver, ConstraintSystem, Model, SolverError, Verdict};
use crate::config::SolverConfig;

pub const DEFAULT_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_MAX_NODES: u64 = 100_000;

/// Backtracking solver for systems whose real unknowns are defined by equalities.
///
/// Boolean unknowns are branched on in declaration order, `true` first. At every
/// node the real unknowns are re-derived by propagating definitional equalities
/// (`x = t`, also under a satisfied implication antecedent or inside a
/// conjunction) to a fixed point, and every assertion is evaluated with
/// three-valued logic so that a branch is cut as soon as one assertion is false.
///
/// Real comparisons are exact, except [`Comparison::ApproxLe`] which accepts a
/// relative slack of `tolerance` for quantities computed in floating point.
/// When an assertion stays undecided with every boolean fixed (a real unknown
/// with no defining equality, a negative square root, a division by zero) and
/// no branch yields a model, the check reports [`SolverError::Unknown`] instead of guessing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatingSolver {
    tolerance: f64,
    max_nodes: u64,
}

impl Default for PropagatingSolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_MAX_NODES)
    }
}

impl PropagatingSolver {
    pub fn new(tolerance: f64, max_nodes: u64) -> Self {
        Self {
            tolerance: tolerance.abs(),
            max_nodes,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.tolerance, config.max_nodes)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_nodes(&self) -> u64 {
        self.max_nodes
    }
}

impl ConstraintSolver for PropagatingSolver {
    fn check(&self, system: &ConstraintSystem) -> Result<Verdict, SolverError> {
        let mut search = Search {
            system,
            tolerance: self.tolerance,
            max_nodes: self.max_nodes,
            nodes: 0,
            undetermined: None,
        };
        let mut bools = vec![None; system.bool_count()];
        let found = search.explore(&mut bools)?;
        trace!(nodes = search.nodes, satisfiable = found.is_some(), "search finished");

        match (found, search.undetermined) {
            (Some(model), _) => Ok(Verdict::Satisfiable(model)),
            (None, Some(reason)) => Err(SolverError::Unknown { reason }),
            (None, None) => Ok(Verdict::Unsatisfiable),
        }
    }
}

struct Search<'a> {
    system: &'a ConstraintSystem,
    tolerance: f64,
    max_nodes: u64,
    nodes: u64,
    undetermined: Option<String>,
}

impl Search<'_> {
    fn explore(&mut self, bools: &mut [Option<bool>]) -> Result<Option<Model>, SolverError> {
        self.nodes += 1;
        if self.nodes > self.max_nodes {
            return Err(SolverError::BudgetExhausted {
                limit: self.max_nodes,
            });
        }

        let reals = self.propagate(bools);
        let env = Env {
            bools: &*bools,
            reals: &reals,
            tolerance: self.tolerance,
        };

        let mut pending = None;
        for (index, assertion) in self.system.assertions().iter().enumerate() {
            match env.formula(assertion) {
                Some(true) => {}
                Some(false) => return Ok(None),
                None if pending.is_none() => pending = Some(index),
                None => {}
            }
        }

        let Some(index) = pending else {
            // Kleene-true assertions hold for every completion of the open unknowns.
            let model = Model::new(
                bools.iter().map(|value| value.unwrap_or(false)).collect(),
                reals.iter().map(|value| value.unwrap_or(0.0)).collect(),
            );
            return Ok(Some(model));
        };

        let Some(next) = bools.iter().position(Option::is_none) else {
            self.undetermined.get_or_insert_with(|| {
                format!(
                    "assertion #{index} cannot be evaluated once every boolean is fixed \
                     (real unknown without a defining equality, negative square root, \
                     or division by zero)"
                )
            });
            return Ok(None);
        };

        for value in [true, false] {
            bools[next] = Some(value);
            if let Some(model) = self.explore(bools)? {
                bools[next] = None;
                return Ok(Some(model));
            }
        }
        bools[next] = None;
        Ok(None)
    }

    fn propagate(&self, bools: &[Option<bool>]) -> Vec<Option<f64>> {
        let mut reals = vec![None; self.system.real_count()];
        loop {
            let mut progressed = false;
            for assertion in self.system.assertions() {
                progressed |= bind_definitions(assertion, bools, &mut reals, self.tolerance);
            }
            if !progressed {
                return reals;
            }
        }
    }
}

fn bind_definitions(
    formula: &Formula,
    bools: &[Option<bool>],
    reals: &mut [Option<f64>],
    tolerance: f64,
) -> bool {
    match formula {
        Formula::And(parts) => {
            let mut progressed = false;
            for part in parts {
                progressed |= bind_definitions(part, bools, reals, tolerance);
            }
            progressed
        }
        Formula::Implies(antecedent, consequent) => {
            let holds = Env {
                bools,
                reals: &*reals,
                tolerance,
            }
            .formula(antecedent);
            holds == Some(true) && bind_definitions(consequent, bools, reals, tolerance)
        }
        Formula::Ite(condition, then, otherwise) => {
            let branch = Env {
                bools,
                reals: &*reals,
                tolerance,
            }
            .formula(condition);
            match branch {
                Some(true) => bind_definitions(then, bools, reals, tolerance),
                Some(false) => bind_definitions(otherwise, bools, reals, tolerance),
                None => false,
            }
        }
        Formula::Compare(Comparison::Eq, lhs, rhs) => {
            let (var, definition) = match (lhs, rhs) {
                (Term::Var(var), definition) if matches!(reals.get(var.0), Some(None)) => {
                    (*var, definition)
                }
                (definition, Term::Var(var)) if matches!(reals.get(var.0), Some(None)) => {
                    (*var, definition)
                }
                _ => return false,
            };
            let value = Env {
                bools,
                reals: &*reals,
                tolerance,
            }
            .term(definition);
            match value {
                Some(value) => {
                    reals[var.0] = Some(value);
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

/// Three-valued evaluation under a partial assignment; `None` means undecided.
struct Env<'a> {
    bools: &'a [Option<bool>],
    reals: &'a [Option<f64>],
    tolerance: f64,
}

impl Env<'_> {
    fn formula(&self, formula: &Formula) -> Option<bool> {
        match formula {
            Formula::Const(value) => Some(*value),
            Formula::Var(var) => self.bools.get(var.0).copied().flatten(),
            Formula::Not(inner) => self.formula(inner).map(|value| !value),
            Formula::And(parts) => {
                let mut result = Some(true);
                for part in parts {
                    match self.formula(part) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Formula::Or(parts) => {
                let mut result = Some(false);
                for part in parts {
                    match self.formula(part) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Formula::Xor(lhs, rhs) => Some(self.formula(lhs)? != self.formula(rhs)?),
            Formula::Implies(antecedent, consequent) => {
                match (self.formula(antecedent), self.formula(consequent)) {
                    (Some(false), _) | (_, Some(true)) => Some(true),
                    (Some(true), Some(false)) => Some(false),
                    _ => None,
                }
            }
            Formula::Iff(lhs, rhs) => Some(self.formula(lhs)? == self.formula(rhs)?),
            Formula::Ite(condition, then, otherwise) => match self.formula(condition) {
                Some(true) => self.formula(then),
                Some(false) => self.formula(otherwise),
                None => {
                    let then = self.formula(then);
                    if then.is_some() && then == self.formula(otherwise) {
                        then
                    } else {
                        None
                    }
                }
            },
            Formula::Compare(op, lhs, rhs) => self.compare(*op, lhs, rhs),
        }
    }

    fn compare(&self, op: Comparison, lhs: &Term, rhs: &Term) -> Option<bool> {
        let lhs = self.term(lhs)?;
        let rhs = self.term(rhs)?;

        Some(match op {
            Comparison::Eq => lhs == rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::ApproxLe => {
                lhs <= rhs + self.tolerance * 1f64.max(lhs.abs()).max(rhs.abs())
            }
        })
    }

    fn term(&self, term: &Term) -> Option<f64> {
        let value = match term {
            Term::Const(value) => *value,
            Term::Var(var) => self.reals.get(var.0).copied().flatten()?,
            Term::Add(lhs, rhs) => self.term(lhs)? + self.term(rhs)?,
            Term::Sub(lhs, rhs) => self.term(lhs)? - self.term(rhs)?,
            Term::Mul(lhs, rhs) => self.term(lhs)? * self.term(rhs)?,
            Term::Div(lhs, rhs) => {
                let divisor = self.term(rhs)?;
                if divisor == 0.0 {
                    return None;
                }
                self.term(lhs)? / divisor
            }
            Term::Sqrt(inner) => {
                let radicand = self.term(inner)?;
                if radicand < -self.tolerance {
                    return None;
                }
                radicand.max(0.0).sqrt()
            }
            Term::Ite(condition, then, otherwise) => {
                if self.formula(condition)? {
                    self.term(then)?
                } else {
                    self.term(otherwise)?
                }
            }
        };

        value.is_finite().then_some(value)
    }
}
