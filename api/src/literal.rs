//! I define [`Literal`], a predicate applied to a list of terms,
//! possibly negated.
use std::collections::BTreeSet;
use std::fmt;

use crate::predicate::Predicate;
use crate::term::{Term, VarName};
use crate::ModelError;

/// A predicate applied to an ordered list of terms, with a polarity.
///
/// Negative literals are only meaningful in rule bodies (negation as failure).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Literal {
    predicate: Predicate,
    terms: Vec<Term>,
    negated: bool,
}

impl Literal {
    /// Build a positive literal, checking that `terms` matches the arity of `predicate`.
    pub fn positive(predicate: Predicate, terms: Vec<Term>) -> Result<Self, ModelError> {
        Self::with_polarity(predicate, terms, false)
    }

    /// Build a negative literal, checking that `terms` matches the arity of `predicate`.
    pub fn negative(predicate: Predicate, terms: Vec<Term>) -> Result<Self, ModelError> {
        Self::with_polarity(predicate, terms, true)
    }

    /// Build a positive literal whose predicate has the given `name`,
    /// and an arity equal to the number of `terms`.
    pub fn new(name: &str, terms: Vec<Term>) -> Result<Self, ModelError> {
        Self::positive(Predicate::new(name, terms.len())?, terms)
    }

    fn with_polarity(
        predicate: Predicate,
        terms: Vec<Term>,
        negated: bool,
    ) -> Result<Self, ModelError> {
        if predicate.arity() != terms.len() {
            return Err(ModelError::ArityMismatch {
                predicate,
                found: terms.len(),
            });
        }
        Ok(Literal {
            predicate,
            terms,
            negated,
        })
    }

    /// The predicate of this literal.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The terms of this literal.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Whether this literal is negated.
    pub fn is_negative(&self) -> bool {
        self.negated
    }

    /// Whether this literal is positive.
    pub fn is_positive(&self) -> bool {
        !self.negated
    }

    /// Whether all terms of this literal are ground.
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    /// The set of variable names occurring in this literal
    /// (universal and existential alike).
    pub fn variables(&self) -> BTreeSet<&VarName> {
        self.terms.iter().filter_map(Term::variable_name).collect()
    }

    /// The names of the universal variables occurring in this literal.
    pub fn universal_variables(&self) -> impl Iterator<Item = &VarName> + '_ {
        self.terms.iter().filter_map(|t| match t {
            Term::UniversalVariable(name) => Some(name),
            _ => None,
        })
    }

    /// The names of the existential variables occurring in this literal.
    pub fn existential_variables(&self) -> impl Iterator<Item = &VarName> + '_ {
        self.terms.iter().filter_map(|t| match t {
            Term::ExistentialVariable(name) => Some(name),
            _ => None,
        })
    }

    /// Return the positive literal with the same predicate and terms.
    pub fn to_positive(&self) -> Literal {
        Literal {
            negated: false,
            ..self.clone()
        }
    }

    /// Consume this literal, returning its predicate and terms.
    pub fn into_parts(self) -> (Predicate, Vec<Term>) {
        (self.predicate, self.terms)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("~")?;
        }
        write!(f, "{}(", self.predicate.name())?;
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{t}")?;
        }
        f.write_str(")")
    }
}
