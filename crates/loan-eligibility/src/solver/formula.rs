use std::ops::{Add, Div, Mul, Neg, Not, Sub};

/// Handle to a boolean unknown declared on a [`super::ConstraintSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(pub(crate) usize);

/// Handle to a real-valued unknown declared on a [`super::ConstraintSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RealVar(pub(crate) usize);

/// Real-valued expression over literals and declared unknowns.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Const(f64),
    Var(RealVar),
    Add(Box<Term>, Box<Term>),
    Sub(Box<Term>, Box<Term>),
    Mul(Box<Term>, Box<Term>),
    Div(Box<Term>, Box<Term>),
    Sqrt(Box<Term>),
    Ite(Box<Formula>, Box<Term>, Box<Term>),
}

/// Relational operator between two real terms.
///
/// Every operator is exact except `ApproxLe`, which each backend relaxes by
/// its configured tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
    ApproxLe,
}

/// Boolean formula accepted as an assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Const(bool),
    Var(BoolVar),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Xor(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
    Ite(Box<Formula>, Box<Formula>, Box<Formula>),
    Compare(Comparison, Term, Term),
}

impl Term {
    pub fn sqrt(self) -> Self {
        Term::Sqrt(Box::new(self))
    }

    pub fn ite(condition: Formula, then: impl Into<Term>, otherwise: impl Into<Term>) -> Self {
        Term::Ite(
            Box::new(condition),
            Box::new(then.into()),
            Box::new(otherwise.into()),
        )
    }

    pub fn equals(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::Eq, self, rhs.into())
    }

    pub fn le(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::Le, self, rhs.into())
    }

    pub fn lt(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::Lt, self, rhs.into())
    }

    pub fn ge(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::Ge, self, rhs.into())
    }

    pub fn gt(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::Gt, self, rhs.into())
    }

    /// `self <= rhs` up to the solver's rounding slack, for computed quantities.
    pub fn le_approx(self, rhs: impl Into<Term>) -> Formula {
        Formula::Compare(Comparison::ApproxLe, self, rhs.into())
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Const(value)
    }
}

impl From<RealVar> for Term {
    fn from(var: RealVar) -> Self {
        Term::Var(var)
    }
}

impl<T: Into<Term>> Add<T> for Term {
    type Output = Term;

    fn add(self, rhs: T) -> Term {
        Term::Add(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Term>> Sub<T> for Term {
    type Output = Term;

    fn sub(self, rhs: T) -> Term {
        Term::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Term>> Mul<T> for Term {
    type Output = Term;

    fn mul(self, rhs: T) -> Term {
        Term::Mul(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<Term>> Div<T> for Term {
    type Output = Term;

    fn div(self, rhs: T) -> Term {
        Term::Div(Box::new(self), Box::new(rhs.into()))
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        Term::Sub(Box::new(Term::Const(0.0)), Box::new(self))
    }
}

impl Formula {
    pub fn and(parts: impl IntoIterator<Item = Formula>) -> Self {
        Formula::And(parts.into_iter().collect())
    }

    pub fn or(parts: impl IntoIterator<Item = Formula>) -> Self {
        Formula::Or(parts.into_iter().collect())
    }

    pub fn xor(self, other: Formula) -> Self {
        Formula::Xor(Box::new(self), Box::new(other))
    }

    pub fn implies(self, consequent: Formula) -> Self {
        Formula::Implies(Box::new(self), Box::new(consequent))
    }

    pub fn iff(self, other: Formula) -> Self {
        Formula::Iff(Box::new(self), Box::new(other))
    }

    pub fn ite(condition: Formula, then: Formula, otherwise: Formula) -> Self {
        Formula::Ite(Box::new(condition), Box::new(then), Box::new(otherwise))
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Self {
        Formula::Const(value)
    }
}

impl From<BoolVar> for Formula {
    fn from(var: BoolVar) -> Self {
        Formula::Var(var)
    }
}

impl Not for Formula {
    type Output = Formula;

    fn not(self) -> Formula {
        Formula::Not(Box::new(self))
    }
}

impl Not for BoolVar {
    type Output = Formula;

    fn not(self) -> Formula {
        Formula::Not(Box::new(Formula::Var(self)))
    }
}
