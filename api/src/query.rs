//! I define [`QueryResult`], one answer to a query.
use std::fmt;
use std::ops::Deref;

use crate::term::Term;

/// One answer to a query: the ordered list of ground terms
/// bound to the (non-constant) positions of the query literal.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryResult(Vec<Term>);

impl QueryResult {
    /// Wrap a list of ground terms.
    pub fn new(terms: Vec<Term>) -> Self {
        debug_assert!(terms.iter().all(Term::is_ground));
        QueryResult(terms)
    }

    /// The terms of this answer.
    pub fn terms(&self) -> &[Term] {
        &self.0
    }

    /// Consume this answer, returning its terms.
    pub fn into_terms(self) -> Vec<Term> {
        self.0
    }
}

impl Deref for QueryResult {
    type Target = [Term];

    fn deref(&self) -> &[Term] {
        &self.0
    }
}

impl From<Vec<Term>> for QueryResult {
    fn from(other: Vec<Term>) -> Self {
        QueryResult::new(other)
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{t}")?;
        }
        f.write_str("]")
    }
}
