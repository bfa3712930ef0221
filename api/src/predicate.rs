//! I define [`Predicate`], a relation name with a fixed arity.
use std::fmt;
use std::sync::Arc;

use crate::ModelError;

/// A predicate, identified by its name and its arity.
///
/// Two predicates with the same name but different arities are different predicates,
/// but a [knowledge base](https://docs.rs/chaser_inmem) will reject the second one.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Predicate {
    name: Arc<str>,
    arity: usize,
}

impl Predicate {
    /// Build a new predicate.
    pub fn new(name: impl AsRef<str>, arity: usize) -> Result<Self, ModelError> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(ModelError::EmptyName("predicate"));
        }
        Ok(Predicate {
            name: name.into(),
            arity,
        })
    }

    /// The name of this predicate.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of arguments of this predicate.
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.arity)
    }
}
