//! I define [`DependencyGraph`],
//! the graph of dependencies between predicates induced by a set of rules.
//!
//! Every rule induces an edge from each of its body predicates to each of its head predicates,
//! labelled [`Negative`](EdgeSign::Negative) if the body literal is negated.
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::predicate::Predicate;
use crate::rule::Rule;

/// The label of an edge in a [`DependencyGraph`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum EdgeSign {
    /// The head depends on a positive body literal
    Positive,
    /// The head depends on a negated body literal
    Negative,
}

/// A directed graph over predicates, from rule bodies to rule heads.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DependencyGraph {
    nodes: BTreeSet<Predicate>,
    // body predicate -> head predicate -> sign (negative wins)
    edges: BTreeMap<Predicate, BTreeMap<Predicate, EdgeSign>>,
}

impl DependencyGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the dependency graph of the given rules.
    pub fn from_rules<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = &'a Rule>,
    {
        let mut ret = Self::new();
        for rule in rules {
            ret.add_rule(rule);
        }
        ret
    }

    /// Add the edges induced by `rule`.
    pub fn add_rule(&mut self, rule: &Rule) {
        for head in rule.head() {
            for lit in rule.body() {
                let sign = if lit.is_negative() {
                    EdgeSign::Negative
                } else {
                    EdgeSign::Positive
                };
                self.add_edge(lit.predicate().clone(), head.predicate().clone(), sign);
            }
        }
    }

    /// Add a predicate without any edge.
    pub fn add_predicate(&mut self, predicate: Predicate) {
        self.nodes.insert(predicate);
    }

    /// Add an edge `from -> to`.
    ///
    /// If a positive and a negative edge connect the same predicates,
    /// only the negative one is kept.
    pub fn add_edge(&mut self, from: Predicate, to: Predicate, sign: EdgeSign) {
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        let entry = self.edges.entry(from).or_default().entry(to).or_insert(sign);
        if sign == EdgeSign::Negative {
            *entry = EdgeSign::Negative;
        }
    }

    /// Add all nodes and edges of `other` to this graph.
    pub fn merge(&mut self, other: &DependencyGraph) {
        self.nodes.extend(other.nodes.iter().cloned());
        for (from, to, sign) in other.edges() {
            self.add_edge(from.clone(), to.clone(), sign);
        }
    }

    /// Iterate over all predicates of this graph.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> + '_ {
        self.nodes.iter()
    }

    /// Iterate over all edges of this graph.
    pub fn edges(&self) -> impl Iterator<Item = (&Predicate, &Predicate, EdgeSign)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |(to, sign)| (from, to, *sign)))
    }

    /// Iterate over the predicates depending directly on `predicate`.
    pub fn successors<'s>(
        &'s self,
        predicate: &Predicate,
    ) -> impl Iterator<Item = (&'s Predicate, EdgeSign)> + 's {
        self.edges
            .get(predicate)
            .into_iter()
            .flat_map(|tos| tos.iter().map(|(to, sign)| (to, *sign)))
    }

    /// Whether some rule has `predicate` in its head.
    pub fn is_derived(&self, predicate: &Predicate) -> bool {
        self.edges.values().any(|tos| tos.contains_key(predicate))
    }

    /// The predicates reachable from `start` by following body-to-head edges,
    /// `start` included.
    pub fn downstream_closure<'a, I>(&self, start: I) -> BTreeSet<Predicate>
    where
        I: IntoIterator<Item = &'a Predicate>,
    {
        let mut seen: BTreeSet<Predicate> = start.into_iter().cloned().collect();
        let mut queue: VecDeque<Predicate> = seen.iter().cloned().collect();
        while let Some(p) = queue.pop_front() {
            for (q, _) in self.successors(&p) {
                if seen.insert(q.clone()) {
                    queue.push_back(q.clone());
                }
            }
        }
        seen
    }

    /// The predicates that `predicate` transitively depends on,
    /// `predicate` included.
    ///
    /// The second set contains those that it depends on
    /// through a path containing at least one negative edge.
    pub fn upstream_closure(
        &self,
        predicate: &Predicate,
    ) -> (BTreeSet<Predicate>, BTreeSet<Predicate>) {
        let reversed = self.reversed_edges();
        let mut visited = BTreeSet::from([(predicate.clone(), false)]);
        let mut queue = VecDeque::from([(predicate.clone(), false)]);
        while let Some((p, negated)) = queue.pop_front() {
            for (q, sign) in reversed.get(&p).into_iter().flatten() {
                let state = ((*q).clone(), negated || *sign == EdgeSign::Negative);
                if visited.insert(state.clone()) {
                    queue.push_back(state);
                }
            }
        }
        let all = visited.iter().map(|(p, _)| p.clone()).collect();
        let through_negation = visited
            .into_iter()
            .filter_map(|(p, negated)| negated.then_some(p))
            .collect();
        (all, through_negation)
    }

    fn reversed_edges(&self) -> HashMap<&Predicate, Vec<(&Predicate, EdgeSign)>> {
        let mut ret: HashMap<&Predicate, Vec<(&Predicate, EdgeSign)>> = HashMap::new();
        for (from, to, sign) in self.edges() {
            ret.entry(to).or_default().push((from, sign));
        }
        ret
    }

    /// The strongly connected components of this graph,
    /// computed with Tarjan's algorithm.
    ///
    /// Components are returned in reverse topological order:
    /// every component comes after all the components depending on it.
    pub fn strongly_connected_components(&self) -> Vec<Vec<Predicate>> {
        const UNVISITED: usize = usize::MAX;
        let nodes: Vec<&Predicate> = self.nodes.iter().collect();
        let index_of: HashMap<&Predicate, usize> =
            nodes.iter().enumerate().map(|(i, p)| (*p, i)).collect();
        let succ: Vec<Vec<usize>> = nodes
            .iter()
            .map(|p| self.successors(p).map(|(q, _)| index_of[q]).collect())
            .collect();

        let n = nodes.len();
        let mut index = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack = Vec::new();
        let mut next_index = 0;
        let mut sccs = Vec::new();

        for root in 0..n {
            if index[root] != UNVISITED {
                continue;
            }
            index[root] = next_index;
            low[root] = next_index;
            next_index += 1;
            stack.push(root);
            on_stack[root] = true;
            let mut call = vec![(root, 0)];
            while let Some(frame) = call.last_mut() {
                let v = frame.0;
                if frame.1 < succ[v].len() {
                    let w = succ[v][frame.1];
                    frame.1 += 1;
                    if index[w] == UNVISITED {
                        index[w] = next_index;
                        low[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        call.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(index[w]);
                    }
                } else {
                    call.pop();
                    if let Some(&(parent, _)) = call.last() {
                        low[parent] = low[parent].min(low[v]);
                    }
                    if low[v] == index[v] {
                        let mut component = Vec::new();
                        while let Some(w) = stack.pop() {
                            on_stack[w] = false;
                            component.push(nodes[w].clone());
                            if w == v {
                                break;
                            }
                        }
                        sccs.push(component);
                    }
                }
            }
        }
        sccs
    }
}
