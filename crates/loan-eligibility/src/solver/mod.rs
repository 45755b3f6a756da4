//! Constraint-solving capability used by the eligibility resolver.
//!
//! A [`ConstraintSystem`] collects declared unknowns and assertions; a
//! [`ConstraintSolver`] decides whether every assertion can hold at once and,
//! when it can, hands back a [`Model`] assigning a concrete value to each
//! declared unknown. Build one system per decision; systems are never shared.

mod formula;
mod search;
#[cfg(feature = "z3")]
mod smt;

pub use formula::{BoolVar, Comparison, Formula, RealVar, Term};
pub use search::{PropagatingSolver, DEFAULT_MAX_NODES, DEFAULT_TOLERANCE};
#[cfg(feature = "z3")]
pub use smt::Z3Solver;

/// Wall-clock limit handed to the SMT backend for one check.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Backend the resolver uses unless another one is injected.
#[cfg(feature = "z3")]
pub type DefaultSolver = Z3Solver;
#[cfg(not(feature = "z3"))]
pub type DefaultSolver = PropagatingSolver;

/// Declared unknowns plus the assertions that must hold simultaneously.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem {
    bool_names: Vec<String>,
    real_names: Vec<String>,
    assertions: Vec<Formula>,
}

impl ConstraintSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.bool_names.push(name.into());
        BoolVar(self.bool_names.len() - 1)
    }

    pub fn real_var(&mut self, name: impl Into<String>) -> RealVar {
        self.real_names.push(name.into());
        RealVar(self.real_names.len() - 1)
    }

    pub fn assert(&mut self, formula: Formula) {
        self.assertions.push(formula);
    }

    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    pub fn bool_count(&self) -> usize {
        self.bool_names.len()
    }

    pub fn real_count(&self) -> usize {
        self.real_names.len()
    }

    pub fn bool_name(&self, var: BoolVar) -> Option<&str> {
        self.bool_names.get(var.0).map(String::as_str)
    }

    pub fn real_name(&self, var: RealVar) -> Option<&str> {
        self.real_names.get(var.0).map(String::as_str)
    }
}

/// Concrete assignment satisfying every assertion of one system.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    bools: Vec<bool>,
    reals: Vec<f64>,
}

impl Model {
    pub(crate) fn new(bools: Vec<bool>, reals: Vec<f64>) -> Self {
        Self { bools, reals }
    }

    /// Value of a boolean unknown, `None` if it was not declared on the solved system.
    pub fn boolean(&self, var: BoolVar) -> Option<bool> {
        self.bools.get(var.0).copied()
    }

    /// Value of a real unknown, `None` if it was not declared on the solved system.
    pub fn real(&self, var: RealVar) -> Option<f64> {
        self.reals.get(var.0).copied()
    }
}

/// Definitive answer of a satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Satisfiable(Model),
    Unsatisfiable,
}

impl Verdict {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, Verdict::Satisfiable(_))
    }
}

/// Raised when the solver cannot give a definitive answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    #[error("satisfiability undetermined: {reason}")]
    Unknown { reason: String },
    #[error("search budget of {limit} nodes exhausted")]
    BudgetExhausted { limit: u64 },
    #[error("model carries no value for unknown `{name}`")]
    MissingValue { name: String },
}

/// Decides satisfiability of a [`ConstraintSystem`].
///
/// Implementations must not keep per-check state: the resolver shares one
/// solver across concurrent decisions.
pub trait ConstraintSolver: Send + Sync {
    fn check(&self, system: &ConstraintSystem) -> Result<Verdict, SolverError>;
}
