//! I check that a set of rules is stratifiable,
//! i.e. that negation as failure is well defined on it,
//! and compute its strata.
use std::collections::{BTreeMap, BTreeSet};

use chaser_api::dependency::{DependencyGraph, EdgeSign};
use chaser_api::predicate::Predicate;
use chaser_api::rule::Rule;

use crate::error::ConfigurationError;

/// A partition of the predicates of a rule set into strata,
/// such that every predicate only depends
/// positively on predicates of the same or lower strata,
/// and negatively on predicates of strictly lower strata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stratification {
    levels: BTreeMap<Predicate, usize>,
    strata: Vec<Vec<Predicate>>,
}

impl Stratification {
    /// Stratify the given rules.
    ///
    /// # Error
    /// [`ConfigurationError::NotStratifiable`] if some predicate
    /// depends on itself through a cycle containing a negative edge.
    pub fn new<'a, I>(rules: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        Self::from_graph(&DependencyGraph::from_rules(rules))
    }

    /// Stratify the given dependency graph.
    pub fn from_graph(graph: &DependencyGraph) -> Result<Self, ConfigurationError> {
        let mut sccs = graph.strongly_connected_components();
        sccs.reverse(); // topological order
        let mut component_of = BTreeMap::new();
        for (i, scc) in sccs.iter().enumerate() {
            for p in scc {
                component_of.insert(p, i);
            }
        }
        for (from, to, sign) in graph.edges() {
            if sign == EdgeSign::Negative && component_of[from] == component_of[to] {
                let mut cycle = sccs[component_of[to]].clone();
                cycle.sort();
                return Err(ConfigurationError::NotStratifiable {
                    predicate: to.clone(),
                    cycle,
                });
            }
        }

        let mut component_levels = vec![0; sccs.len()];
        for (i, scc) in sccs.iter().enumerate() {
            let level = component_levels[i];
            for p in scc {
                for (q, sign) in graph.successors(p) {
                    let j = component_of[q];
                    if j != i {
                        let step = usize::from(sign == EdgeSign::Negative);
                        component_levels[j] = component_levels[j].max(level + step);
                    }
                }
            }
        }

        let mut levels = BTreeMap::new();
        let mut strata: Vec<Vec<Predicate>> = vec![];
        for (scc, level) in sccs.into_iter().zip(component_levels) {
            if strata.len() <= level {
                strata.resize(level + 1, vec![]);
            }
            for p in scc {
                levels.insert(p.clone(), level);
                strata[level].push(p);
            }
        }
        for stratum in strata.iter_mut() {
            stratum.sort();
        }
        Ok(Stratification { levels, strata })
    }

    /// The strata, lowest first.
    pub fn strata(&self) -> &[Vec<Predicate>] {
        &self.strata
    }

    /// The number of strata.
    pub fn len(&self) -> usize {
        self.strata.len()
    }

    /// Whether there is no stratum at all (no rule).
    pub fn is_empty(&self) -> bool {
        self.strata.is_empty()
    }

    /// The stratum of `predicate`.
    ///
    /// Predicates not occurring in any rule are in stratum 0.
    pub fn level(&self, predicate: &Predicate) -> usize {
        self.levels.get(predicate).copied().unwrap_or(0)
    }

    /// The stratum in which `rule` must be applied:
    /// the lowest stratum of its head predicates.
    pub fn rule_level(&self, rule: &Rule) -> usize {
        rule.head_predicates()
            .into_iter()
            .map(|p| self.level(p))
            .min()
            .unwrap_or(0)
    }

    /// The predicates of all strata.
    pub fn predicates(&self) -> BTreeSet<&Predicate> {
        self.levels.keys().collect()
    }
}
