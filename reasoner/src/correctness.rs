//! I define [`Correctness`], the guarantee attached to query answers,
//! and the [`Snapshot`] of a knowledge base from which it is computed.
use std::fmt;

use chaser_api::dependency::DependencyGraph;
use chaser_api::predicate::Predicate;
use chaser_inmem::origin::OriginIndex;
use chaser_inmem::KnowledgeBase;

/// How trustworthy a set of answers is,
/// relative to the current content of the knowledge base.
///
/// Variants are ordered from the weakest to the strongest guarantee,
/// so the guarantee of several answer sets combined is their minimum.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Correctness {
    /// No guarantee: answers may be missing, and some answers may be wrong
    Incorrect,
    /// Every answer is correct, but some answers may be missing
    SoundButIncomplete,
    /// Exactly the correct answers
    SoundAndComplete,
}

impl Correctness {
    /// Whether every answer is guaranteed to be correct.
    pub fn is_sound(&self) -> bool {
        *self != Correctness::Incorrect
    }

    /// Whether answers are guaranteed to be exactly the correct ones.
    pub fn is_complete(&self) -> bool {
        *self == Correctness::SoundAndComplete
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Correctness::Incorrect => "incorrect",
            Correctness::SoundButIncomplete => "sound but incomplete",
            Correctness::SoundAndComplete => "sound and complete",
        })
    }
}

/// What the reasoner knows about the knowledge base it last loaded.
#[derive(Clone, Debug)]
pub struct Snapshot {
    version: u64,
    origins: OriginIndex,
    rules: DependencyGraph,
    materialized: bool,
    complete: bool,
}

impl Snapshot {
    /// Take a snapshot of the current state of `kb`.
    pub fn new(kb: &KnowledgeBase) -> Self {
        Snapshot {
            version: kb.version(),
            origins: kb.origin_index().clone(),
            rules: DependencyGraph::from_rules(kb.rules()),
            materialized: false,
            complete: false,
        }
    }

    /// The version of the knowledge base at the time of the snapshot.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a materialization has been computed since the snapshot was taken.
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Whether the last materialization ran to completion
    /// (i.e. did not time out).
    pub fn is_complete(&self) -> bool {
        self.materialized && self.complete
    }

    /// The dependency graph of the rules at the time of the snapshot.
    pub fn rules(&self) -> &DependencyGraph {
        &self.rules
    }

    pub(crate) fn record_materialization(&mut self, complete: bool) {
        self.materialized = true;
        self.complete = complete;
    }

    pub(crate) fn forget_materialization(&mut self) {
        self.materialized = false;
        self.complete = false;
    }

    /// Compute the correctness of the answers to a query on `predicate`,
    /// given the current state of `kb`.
    ///
    /// * If `kb` did not change since the snapshot,
    ///   answers are sound and complete,
    ///   unless the materialization timed out,
    ///   or it was not computed and `predicate` is derived by some rule.
    /// * If any change on a predicate that `predicate` depends on
    ///   is a removal, or affects a predicate with more than one origin,
    ///   or reaches `predicate` through negation,
    ///   answers are incorrect.
    /// * Otherwise, answers are sound but may be incomplete.
    pub fn correctness(&self, kb: &KnowledgeBase, predicate: &Predicate) -> Correctness {
        let delta = kb.delta_since(self.version);
        if delta.is_empty() {
            let complete = if self.materialized {
                self.complete
            } else {
                !self.rules.is_derived(predicate)
            };
            return if complete {
                Correctness::SoundAndComplete
            } else {
                Correctness::SoundButIncomplete
            };
        }

        let mut graph = self.rules.clone();
        graph.merge(&DependencyGraph::from_rules(kb.rules()));
        let (upstream, through_negation) = graph.upstream_closure(predicate);
        for p in &upstream {
            let Some(change) = delta.get(p) else {
                continue;
            };
            if change.removed {
                log::debug!("{p} was removed from, answers on {predicate} are incorrect");
                return Correctness::Incorrect;
            }
            if self.origins.get(p).is_mixed() || kb.origins(p).is_mixed() {
                log::debug!("{p} has several origins, answers on {predicate} are incorrect");
                return Correctness::Incorrect;
            }
            if through_negation.contains(p) {
                log::debug!("{predicate} depends negatively on {p}, answers are incorrect");
                return Correctness::Incorrect;
            }
        }
        Correctness::SoundButIncomplete
    }
}
