//! I define [`Rule`], an implication from a conjunction of body literals
//! (possibly negated) to a conjunction of positive head literals.
use std::collections::BTreeSet;
use std::fmt;

use crate::literal::Literal;
use crate::predicate::Predicate;
use crate::term::{Term, VarName};
use crate::ModelError;

/// A rule `head :- body`.
///
/// # Invariants
/// * the head is non-empty and contains only positive literals;
/// * the body is non-empty;
/// * existential variables only occur in the head,
///   and no universal variable of the body shares a name with one of them;
/// * every universal variable of the head or of a negative body literal
///   occurs in some positive body literal;
/// * no named null occurs anywhere.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rule {
    head: Vec<Literal>,
    body: Vec<Literal>,
}

impl Rule {
    /// Build a new rule, checking its invariants.
    pub fn new(head: Vec<Literal>, body: Vec<Literal>) -> Result<Self, ModelError> {
        if head.is_empty() {
            return Err(ModelError::EmptyHead);
        }
        if body.is_empty() {
            return Err(ModelError::EmptyBody);
        }
        for lit in head.iter().chain(body.iter()) {
            if lit.terms().iter().any(Term::is_named_null) {
                return Err(ModelError::NamedNullInRule(lit.to_string()));
            }
        }
        if let Some(lit) = head.iter().find(|l| l.is_negative()) {
            return Err(ModelError::NegativeHeadLiteral(lit.to_string()));
        }
        if let Some(name) = body.iter().flat_map(Literal::existential_variables).next() {
            return Err(ModelError::ExistentialInBody(name.clone()));
        }
        let bound: BTreeSet<&VarName> = body
            .iter()
            .filter(|l| l.is_positive())
            .flat_map(Literal::universal_variables)
            .collect();
        let body_vars: BTreeSet<&VarName> =
            body.iter().flat_map(Literal::universal_variables).collect();
        if let Some(name) = head
            .iter()
            .flat_map(Literal::existential_variables)
            .find(|name| body_vars.contains(name))
        {
            return Err(ModelError::ExistentialInBody(name.clone()));
        }
        if let Some(name) = head
            .iter()
            .chain(body.iter().filter(|l| l.is_negative()))
            .flat_map(Literal::universal_variables)
            .find(|name| !bound.contains(name))
        {
            return Err(ModelError::UnsafeVariable(name.clone()));
        }
        Ok(Rule { head, body })
    }

    /// The head literals (all positive).
    pub fn head(&self) -> &[Literal] {
        &self.head
    }

    /// The body literals.
    pub fn body(&self) -> &[Literal] {
        &self.body
    }

    /// The positive body literals.
    pub fn positive_body(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.body.iter().filter(|l| l.is_positive())
    }

    /// The negative body literals.
    pub fn negative_body(&self) -> impl Iterator<Item = &Literal> + '_ {
        self.body.iter().filter(|l| l.is_negative())
    }

    /// The predicates occurring in the head.
    pub fn head_predicates(&self) -> BTreeSet<&Predicate> {
        self.head.iter().map(Literal::predicate).collect()
    }

    /// The predicates occurring in the body.
    pub fn body_predicates(&self) -> BTreeSet<&Predicate> {
        self.body.iter().map(Literal::predicate).collect()
    }

    /// The existential variables of this rule.
    pub fn existential_variables(&self) -> BTreeSet<&VarName> {
        self.head
            .iter()
            .flat_map(Literal::existential_variables)
            .collect()
    }

    /// The universal variables of this rule.
    pub fn universal_variables(&self) -> BTreeSet<&VarName> {
        self.body
            .iter()
            .chain(self.head.iter())
            .flat_map(Literal::universal_variables)
            .collect()
    }

    /// Whether this rule has existential variables.
    pub fn is_existential(&self) -> bool {
        !self.existential_variables().is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_conjunction(f, &self.head)?;
        f.write_str(" :- ")?;
        write_conjunction(f, &self.body)?;
        f.write_str(" .")
    }
}

fn write_conjunction(f: &mut fmt::Formatter<'_>, literals: &[Literal]) -> fmt::Result {
    for (i, lit) in literals.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{lit}")?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::NamedNull;
    use test_case::test_case;

    fn u(n: &str) -> Term {
        Term::universal(n).unwrap()
    }
    fn e(n: &str) -> Term {
        Term::existential(n).unwrap()
    }
    fn pos(p: &str, terms: Vec<Term>) -> Literal {
        Literal::new(p, terms).unwrap()
    }
    fn neg(p: &str, terms: Vec<Term>) -> Literal {
        let pred = Predicate::new(p, terms.len()).unwrap();
        Literal::negative(pred, terms).unwrap()
    }

    #[test]
    fn existential_rule() {
        let r = Rule::new(
            vec![pos("q", vec![u("x"), e("y")])],
            vec![pos("p", vec![u("x")])],
        )
        .unwrap();
        assert!(r.is_existential());
        assert_eq!(r.existential_variables().len(), 1);
        assert_eq!(r.universal_variables().len(), 1);
        assert_eq!(r.to_string(), "q(?x, !y) :- p(?x) .");
    }

    #[test]
    fn negation_rule() {
        let r = Rule::new(
            vec![pos("s", vec![u("x")])],
            vec![pos("p", vec![u("x")]), neg("q", vec![u("x")])],
        )
        .unwrap();
        assert_eq!(r.negative_body().count(), 1);
        assert_eq!(r.positive_body().count(), 1);
        assert_eq!(r.body_predicates().len(), 2);
    }

    #[test_case(vec![], vec![pos("p", vec![u("x")])]; "empty head")]
    #[test_case(vec![pos("q", vec![u("x")])], vec![]; "empty body")]
    #[test_case(vec![neg("q", vec![u("x")])], vec![pos("p", vec![u("x")])]; "negative head")]
    #[test_case(vec![pos("q", vec![u("x")])], vec![pos("p", vec![e("x")])]; "existential in body")]
    #[test_case(vec![pos("q", vec![e("x")])], vec![pos("p", vec![u("x")])]; "existential named like a body variable")]
    #[test_case(vec![pos("q", vec![u("y")])], vec![pos("p", vec![u("x")])]; "unsafe head variable")]
    #[test_case(vec![pos("q", vec![u("x")])], vec![pos("p", vec![u("x")]), neg("r", vec![u("y")])]; "unsafe negated variable")]
    #[test_case(vec![pos("q", vec![NamedNull::portable("n").into()])], vec![pos("p", vec![u("x")])]; "named null")]
    fn invalid(head: Vec<Literal>, body: Vec<Literal>) {
        assert!(Rule::new(head, body).is_err());
    }
}
