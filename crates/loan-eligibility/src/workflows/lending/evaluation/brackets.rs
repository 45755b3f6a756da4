use crate::solver::{Formula, Term};

/// Threshold side of one bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    AtLeast(f64),
    AtMost(f64),
}

impl Bound {
    pub fn matches(self, value: f64) -> bool {
        match self {
            Bound::AtLeast(threshold) => value >= threshold,
            Bound::AtMost(threshold) => value <= threshold,
        }
    }

    fn formula(self, subject: &Term) -> Formula {
        match self {
            Bound::AtLeast(threshold) => subject.clone().ge(threshold),
            Bound::AtMost(threshold) => subject.clone().le(threshold),
        }
    }
}

/// Ordered rate adjustments; the first matching bracket wins, `fallback` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BracketTable {
    brackets: &'static [(Bound, f64)],
    fallback: f64,
}

impl BracketTable {
    pub const fn new(brackets: &'static [(Bound, f64)], fallback: f64) -> Self {
        Self { brackets, fallback }
    }

    pub fn brackets(&self) -> &'static [(Bound, f64)] {
        self.brackets
    }

    pub fn lookup(&self, value: f64) -> f64 {
        self.brackets
            .iter()
            .find(|(bound, _)| bound.matches(value))
            .map_or(self.fallback, |(_, adjustment)| *adjustment)
    }

    /// Lowers the table into nested if-then-else terms over `subject`.
    pub fn to_term(&self, subject: &Term) -> Term {
        self.brackets
            .iter()
            .rev()
            .fold(Term::Const(self.fallback), |otherwise, (bound, adjustment)| {
                Term::ite(bound.formula(subject), *adjustment, otherwise)
            })
    }
}

/// Monthly income brackets, highest band first.
pub const INCOME_ADJUSTMENTS: BracketTable = BracketTable::new(
    &[
        (Bound::AtLeast(4500.0), -0.1),
        (Bound::AtLeast(3500.0), 0.0),
        (Bound::AtLeast(2500.0), 0.1),
        (Bound::AtLeast(2000.0), 0.2),
    ],
    0.3,
);

/// Requested principal brackets, smallest band first.
pub const AMOUNT_ADJUSTMENTS: BracketTable = BracketTable::new(
    &[
        (Bound::AtMost(10_000.0), -0.1),
        (Bound::AtMost(25_000.0), 0.0),
        (Bound::AtMost(40_000.0), 0.1),
    ],
    0.2,
);
