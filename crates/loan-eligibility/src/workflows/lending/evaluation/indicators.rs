use super::super::domain::{Employment, LoanKind};
use crate::solver::{BoolVar, ConstraintSystem, Formula};

/// Closed set of tags that the solver reasons about as one boolean per variant.
pub(crate) trait Category: Copy + Eq + 'static {
    const VARIANTS: &'static [Self];

    fn label(self) -> &'static str;
}

impl Category for Employment {
    const VARIANTS: &'static [Self] = &Employment::ALL;

    fn label(self) -> &'static str {
        Employment::label(self)
    }
}

impl Category for LoanKind {
    const VARIANTS: &'static [Self] = &LoanKind::ALL;

    fn label(self) -> &'static str {
        LoanKind::label(self)
    }
}

/// Indicator unknowns for one categorical attribute, bound to its concrete tag.
pub(crate) struct Indicators<C: Category> {
    vars: Vec<(C, BoolVar)>,
}

impl<C: Category> Indicators<C> {
    /// Declares `is_<variant>` unknowns and asserts exactly one holds, the one matching `tag`.
    pub(crate) fn encode(system: &mut ConstraintSystem, tag: C) -> Self {
        let vars: Vec<(C, BoolVar)> = C::VARIANTS
            .iter()
            .map(|variant| (*variant, system.bool_var(format!("is_{}", variant.label()))))
            .collect();

        system.assert(Formula::or(vars.iter().map(|(_, var)| Formula::from(*var))));
        for (index, (_, first)) in vars.iter().enumerate() {
            for (_, second) in &vars[index + 1..] {
                system.assert(Formula::or([!*first, !*second]));
            }
        }
        for (variant, var) in &vars {
            system.assert(Formula::from(*var).iff(Formula::from(*variant == tag)));
        }

        Self { vars }
    }

    pub(crate) fn is(&self, variant: C) -> Formula {
        self.vars
            .iter()
            .find(|(candidate, _)| *candidate == variant)
            .map_or(Formula::Const(false), |(_, var)| Formula::from(*var))
    }

    #[cfg(test)]
    pub(crate) fn vars(&self) -> impl Iterator<Item = (C, BoolVar)> + '_ {
        self.vars.iter().copied()
    }
}
