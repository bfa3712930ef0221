//! I define how the extension of each predicate is provided
//! (explicit facts, external data sources, rules).
use std::collections::BTreeMap;
use std::fmt;

use chaser_api::predicate::Predicate;
use chaser_api::statement::Statement;

/// The kind of statement contributing to the extension of a predicate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OriginKind {
    /// Explicit facts
    Facts,
    /// A data source declaration
    DataSource,
    /// A rule having the predicate in its head
    Rules,
}

impl OriginKind {
    /// The origin kind of a statement.
    pub fn of(statement: &Statement) -> Self {
        match statement {
            Statement::Fact(_) => OriginKind::Facts,
            Statement::DataSource(_) => OriginKind::DataSource,
            Statement::Rule(_) => OriginKind::Rules,
        }
    }
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OriginKind::Facts => "facts",
            OriginKind::DataSource => "data source",
            OriginKind::Rules => "rules",
        })
    }
}

/// A summary of [`PredicateOrigins`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OriginClass {
    /// Nothing provides facts for this predicate
    None,
    /// Only explicit facts
    Explicit,
    /// Exactly one data source
    External,
    /// Only rules
    Derived,
    /// More than one of the above, or several data sources
    Mixed,
}

/// The number of statements of each [kind](OriginKind)
/// contributing to the extension of a predicate.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PredicateOrigins {
    /// The number of explicit facts
    pub facts: usize,
    /// The number of data source declarations
    pub data_sources: usize,
    /// The number of rules having the predicate in their head
    pub rules: usize,
}

impl PredicateOrigins {
    /// Whether no statement contributes to this predicate.
    pub fn is_empty(&self) -> bool {
        self.facts == 0 && self.data_sources == 0 && self.rules == 0
    }

    /// Whether at least one rule derives this predicate.
    pub fn is_derived(&self) -> bool {
        self.rules > 0
    }

    /// The number of distinct origins:
    /// all facts count as one origin, all rules as one origin,
    /// and each data source as one origin.
    pub fn origin_count(&self) -> usize {
        usize::from(self.facts > 0) + self.data_sources + usize::from(self.rules > 0)
    }

    /// Whether this predicate has more than one origin.
    pub fn is_mixed(&self) -> bool {
        self.origin_count() > 1
    }

    /// Whether the extension of this predicate has to be gathered from several EDB origins
    /// (explicit facts and/or data sources).
    pub fn needs_aliasing(&self) -> bool {
        usize::from(self.facts > 0) + self.data_sources > 1
    }

    /// Classify this predicate.
    pub fn class(&self) -> OriginClass {
        if self.is_mixed() {
            OriginClass::Mixed
        } else if self.facts > 0 {
            OriginClass::Explicit
        } else if self.data_sources > 0 {
            OriginClass::External
        } else if self.rules > 0 {
            OriginClass::Derived
        } else {
            OriginClass::None
        }
    }

    fn counter(&mut self, kind: OriginKind) -> &mut usize {
        match kind {
            OriginKind::Facts => &mut self.facts,
            OriginKind::DataSource => &mut self.data_sources,
            OriginKind::Rules => &mut self.rules,
        }
    }
}

/// An index from predicates to their [origins](PredicateOrigins).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OriginIndex(BTreeMap<Predicate, PredicateOrigins>);

impl OriginIndex {
    /// The origins of `predicate` (all zero if unknown).
    pub fn get(&self, predicate: &Predicate) -> PredicateOrigins {
        self.0.get(predicate).copied().unwrap_or_default()
    }

    /// Iterate over all predicates having at least one origin.
    pub fn iter(&self) -> impl Iterator<Item = (&Predicate, &PredicateOrigins)> + '_ {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, statement: &Statement) {
        let kind = OriginKind::of(statement);
        for p in statement.defined_predicates() {
            *self.0.entry(p.clone()).or_default().counter(kind) += 1;
        }
    }

    pub(crate) fn remove(&mut self, statement: &Statement) {
        let kind = OriginKind::of(statement);
        for p in statement.defined_predicates() {
            if let Some(origins) = self.0.get_mut(p) {
                let counter = origins.counter(kind);
                *counter = counter.saturating_sub(1);
                if origins.is_empty() {
                    self.0.remove(p);
                }
            }
        }
    }
}
