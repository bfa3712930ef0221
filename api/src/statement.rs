//! I define the three kinds of [`Statement`] a knowledge base is made of:
//! [`Rule`]s, [`Fact`]s and [`DataSourceDeclaration`]s.
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::literal::Literal;
use crate::predicate::Predicate;
use crate::rule::Rule;
use crate::source::DataSource;
use crate::term::Term;
use crate::ModelError;

/// A ground, positive literal.
///
/// Facts may contain portable named nulls (re-imported witnesses),
/// but never variables nor session-local named nulls.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fact(Literal);

impl Fact {
    /// Build a fact, checking that `terms` matches the arity of `predicate`.
    pub fn new(predicate: Predicate, terms: Vec<Term>) -> Result<Self, ModelError> {
        Self::from_literal(Literal::positive(predicate, terms)?)
    }

    /// Check that `literal` can be used as a fact.
    pub fn from_literal(literal: Literal) -> Result<Self, ModelError> {
        if literal.is_negative() {
            return Err(ModelError::NegativeFact(literal.to_string()));
        }
        if !literal.is_ground() {
            return Err(ModelError::NonGroundFact(literal.to_string()));
        }
        if literal
            .terms()
            .iter()
            .filter_map(Term::named_null)
            .any(|n| n.is_local())
        {
            return Err(ModelError::LocalNullInFact(literal.to_string()));
        }
        Ok(Fact(literal))
    }

    /// The predicate of this fact.
    pub fn predicate(&self) -> &Predicate {
        self.0.predicate()
    }

    /// The terms of this fact.
    pub fn terms(&self) -> &[Term] {
        self.0.terms()
    }

    /// This fact as a literal.
    pub fn as_literal(&self) -> &Literal {
        &self.0
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .", self.0)
    }
}

/// The declaration that (part of) the extension of a predicate
/// is provided by an external [`DataSource`].
#[derive(Clone, Debug)]
pub struct DataSourceDeclaration {
    predicate: Predicate,
    source: Arc<dyn DataSource>,
}

impl DataSourceDeclaration {
    /// Declare `source` as providing facts for `predicate`.
    pub fn new(predicate: Predicate, source: impl DataSource + 'static) -> Self {
        Self::from_arc(predicate, Arc::new(source))
    }

    /// Declare a shared `source` as providing facts for `predicate`.
    pub fn from_arc(predicate: Predicate, source: Arc<dyn DataSource>) -> Self {
        DataSourceDeclaration { predicate, source }
    }

    /// The predicate whose extension is provided.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// The source providing the extension.
    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }
}

impl PartialEq for DataSourceDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.source.identity() == other.source.identity()
    }
}

impl Eq for DataSourceDeclaration {}

impl Hash for DataSourceDeclaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.predicate.hash(state);
        self.source.identity().hash(state);
    }
}

impl fmt::Display for DataSourceDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@source {}: <{}> .",
            self.predicate,
            self.source.identity()
        )
    }
}

/// Anything a knowledge base can contain.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Statement {
    /// A rule
    Rule(Rule),
    /// A fact
    Fact(Fact),
    /// A data source declaration
    DataSource(DataSourceDeclaration),
}

impl Statement {
    /// All the predicates occurring in this statement.
    pub fn predicates(&self) -> Vec<&Predicate> {
        match self {
            Statement::Rule(rule) => rule
                .head()
                .iter()
                .chain(rule.body())
                .map(Literal::predicate)
                .collect(),
            Statement::Fact(fact) => vec![fact.predicate()],
            Statement::DataSource(decl) => vec![decl.predicate()],
        }
    }

    /// The predicates whose extension this statement contributes to
    /// (head predicates of a rule, the predicate of a fact or of a declaration).
    pub fn defined_predicates(&self) -> Vec<&Predicate> {
        match self {
            Statement::Rule(rule) => rule.head_predicates().into_iter().collect(),
            Statement::Fact(fact) => vec![fact.predicate()],
            Statement::DataSource(decl) => vec![decl.predicate()],
        }
    }
}

impl From<Rule> for Statement {
    fn from(other: Rule) -> Self {
        Statement::Rule(other)
    }
}

impl From<Fact> for Statement {
    fn from(other: Fact) -> Self {
        Statement::Fact(other)
    }
}

impl From<DataSourceDeclaration> for Statement {
    fn from(other: DataSourceDeclaration) -> Self {
        Statement::DataSource(other)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Rule(rule) => rule.fmt(f),
            Statement::Fact(fact) => fact.fmt(f),
            Statement::DataSource(decl) => decl.fmt(f),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::source::CsvFileDataSource;
    use crate::term::NamedNull;
    use test_case::test_case;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    #[test]
    fn valid_fact() {
        let p = Predicate::new("p", 2).unwrap();
        let f = Fact::new(p, vec![c("a"), NamedNull::portable("n1").into()]).unwrap();
        assert_eq!(f.to_string(), "p(a, _:n1) .");
    }

    #[test_case(vec![Term::universal("x").unwrap()]; "universal variable")]
    #[test_case(vec![Term::existential("x").unwrap()]; "existential variable")]
    #[test_case(vec![c("a"), c("b")]; "arity mismatch")]
    fn invalid_fact(terms: Vec<Term>) {
        let p = Predicate::new("p", 1).unwrap();
        assert!(Fact::new(p, terms).is_err());
    }

    #[test]
    fn negative_fact() {
        let p = Predicate::new("p", 1).unwrap();
        let lit = Literal::negative(p, vec![c("a")]).unwrap();
        assert!(matches!(
            Fact::from_literal(lit),
            Err(ModelError::NegativeFact(_))
        ));
    }

    #[test]
    fn local_null_in_fact() {
        let mut sk = crate::skolem::Skolemization::new();
        let p = Predicate::new("p", 1).unwrap();
        let res = Fact::new(p, vec![sk.fresh_null().into()]);
        assert!(matches!(res, Err(ModelError::LocalNullInFact(_))));
    }

    #[test]
    fn declarations_compare_by_identity() {
        let p = Predicate::new("p", 2).unwrap();
        let d1 = DataSourceDeclaration::new(p.clone(), CsvFileDataSource::new("a.csv"));
        let d2 = DataSourceDeclaration::new(p.clone(), CsvFileDataSource::new("a.csv"));
        let d3 = DataSourceDeclaration::new(p, CsvFileDataSource::new("b.csv"));
        assert_eq!(d1, d2);
        assert_ne!(d1, d3);
    }
}
