//! I define the change log of a [`KnowledgeBase`](crate::KnowledgeBase),
//! and the [`Delta`] summarizing it between two versions.
use std::collections::{BTreeMap, BTreeSet};

use chaser_api::predicate::Predicate;

use crate::origin::OriginKind;

/// Whether a statement was added or removed.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ChangeKind {
    /// The statement was added
    Addition,
    /// The statement was removed
    Removal,
}

/// The last versions at which the origins of one predicate changed.
///
/// Only the latest version of each kind of change is kept,
/// which is enough to tell how the predicate changed since any given version.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PredicateHistory {
    last_addition: Option<u64>,
    last_removal: Option<u64>,
    origins: BTreeMap<OriginKind, u64>,
}

impl PredicateHistory {
    /// The version right after the last addition of a statement defining this predicate.
    pub fn last_addition(&self) -> Option<u64> {
        self.last_addition
    }

    /// The version right after the last removal of a statement defining this predicate.
    pub fn last_removal(&self) -> Option<u64> {
        self.last_removal
    }

    fn since(&self, version: u64) -> Option<PredicateChange> {
        let added = matches!(self.last_addition, Some(v) if v > version);
        let removed = matches!(self.last_removal, Some(v) if v > version);
        if !added && !removed {
            return None;
        }
        let origins = self
            .origins
            .iter()
            .filter(|(_, v)| **v > version)
            .map(|(kind, _)| *kind)
            .collect();
        Some(PredicateChange {
            added,
            removed,
            origins,
        })
    }
}

/// The change log of a knowledge base,
/// coalesced per predicate.
///
/// Its size is bounded by the number of predicates ever defined in the knowledge base,
/// regardless of how many times they changed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeLog {
    predicates: BTreeMap<Predicate, PredicateHistory>,
}

impl ChangeLog {
    pub(crate) fn record<'a, I>(
        &mut self,
        version: u64,
        kind: ChangeKind,
        origin: OriginKind,
        predicates: I,
    ) where
        I: IntoIterator<Item = &'a Predicate>,
    {
        for p in predicates {
            let history = self.predicates.entry(p.clone()).or_default();
            match kind {
                ChangeKind::Addition => history.last_addition = Some(version),
                ChangeKind::Removal => history.last_removal = Some(version),
            }
            history.origins.insert(origin, version);
        }
    }

    /// The number of predicates with a recorded history.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether no change was recorded.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// The history of `predicate`, if it ever changed.
    pub fn get(&self, predicate: &Predicate) -> Option<&PredicateHistory> {
        self.predicates.get(predicate)
    }
}

/// How the origins of one predicate changed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PredicateChange {
    /// Whether some statement defining this predicate was added
    pub added: bool,
    /// Whether some statement defining this predicate was removed
    pub removed: bool,
    /// The kinds of the added or removed statements
    pub origins: BTreeSet<OriginKind>,
}

/// The changes of a knowledge base between two versions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Delta {
    from: u64,
    to: u64,
    predicates: BTreeMap<Predicate, PredicateChange>,
}

impl Delta {
    pub(crate) fn from_log(from: u64, to: u64, log: &ChangeLog) -> Self {
        let predicates = log
            .predicates
            .iter()
            .filter_map(|(p, history)| Some((p.clone(), history.since(from)?)))
            .collect();
        Delta {
            from,
            to,
            predicates,
        }
    }

    /// The version this delta starts from.
    pub fn from_version(&self) -> u64 {
        self.from
    }

    /// The version this delta leads to.
    pub fn to_version(&self) -> u64 {
        self.to
    }

    /// Whether nothing changed between the two versions.
    ///
    /// NB: adding then removing the same statement yields a non-empty delta,
    /// even though the knowledge base is back to its previous content.
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// The predicates defined by an added or removed statement.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> + '_ {
        self.predicates.keys()
    }

    /// Iterate over the changed predicates and how they changed.
    pub fn iter(&self) -> impl Iterator<Item = (&Predicate, &PredicateChange)> + '_ {
        self.predicates.iter()
    }

    /// How `predicate` changed, if it did.
    pub fn get(&self, predicate: &Predicate) -> Option<&PredicateChange> {
        self.predicates.get(predicate)
    }

    /// Whether any statement was removed.
    pub fn has_removal(&self) -> bool {
        self.predicates.values().any(|c| c.removed)
    }
}
