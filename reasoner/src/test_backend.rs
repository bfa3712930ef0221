//! I define [`TestBackend`], a naive in-memory chase engine
//! implementing [`Backend`], for testing reasoners without an external engine.
//!
//! It supports rules with existential variables (restricted or skolem chase),
//! stratified negation, and CSV data sources described in the `INMEMORY` format.
//! Timeouts are simulated by a budget of chase rounds per second
//! (see [`TestBackend::with_rounds_per_second`]).
//!
//! It is not meant to be efficient.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chaser_api::backend::{
    AcyclicityNotion, Algorithm, Backend, BackendAnswers, BackendError, BackendResult,
    CyclicityResult, LogLevel, RuleRewriteStrategy,
};
use chaser_api::dependency::DependencyGraph;
use chaser_api::literal::Literal;
use chaser_api::predicate::Predicate;
use chaser_api::rule::Rule;
use chaser_api::skolem::Skolemization;
use chaser_api::term::{Term, VarName};
use indexmap::IndexSet;

use crate::stratification::Stratification;

type Bindings = HashMap<VarName, Term>;

/// An operation of [`TestBackend`] that can be made to fail.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailPoint {
    /// [`Backend::configure`]
    Configure,
    /// [`Backend::load`]
    Load,
    /// [`Backend::materialize`]
    Materialize,
    /// [`Backend::query`]
    Query,
}

/// The number of calls to some methods of a [`TestBackend`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CallCounts {
    /// Calls to [`Backend::load`]
    pub loads: usize,
    /// Calls to [`Backend::materialize`]
    pub materializations: usize,
    /// Calls to [`Backend::reset`]
    pub resets: usize,
    /// Calls to [`Backend::stop`]
    pub stops: usize,
}

#[derive(Clone, Debug, Default)]
struct EdbEntry {
    predname: Option<String>,
    kind: Option<String>,
    params: BTreeMap<usize, String>,
}

/// A naive chase engine.
#[derive(Debug, Default)]
pub struct TestBackend {
    namer: Skolemization,
    edb: BTreeMap<usize, EdbEntry>,
    edb_config: String,
    rules: Vec<Rule>,
    explicit: BTreeMap<Predicate, Vec<Vec<Term>>>,
    store: BTreeMap<Predicate, IndexSet<Vec<Term>>>,
    rounds_per_second: Option<usize>,
    log_level: LogLevel,
    log_file: Option<PathBuf>,
    failure: Option<FailPoint>,
    counts: CallCounts,
    stopped: bool,
}

impl TestBackend {
    /// Build a new test backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of chase rounds per second of timeout.
    ///
    /// Without this limit, timeouts are ignored.
    pub fn with_rounds_per_second(mut self, rounds: usize) -> Self {
        self.rounds_per_second = Some(rounds);
        self
    }

    /// Make the next call to the given operation fail.
    ///
    /// [`FailPoint::Query`] keeps failing until [`clear_failure`](Self::clear_failure) is called.
    pub fn fail_on(&mut self, point: FailPoint) {
        self.failure = Some(point);
    }

    /// Cancel [`fail_on`](Self::fail_on).
    pub fn clear_failure(&mut self) {
        self.failure = None;
    }

    /// The number of calls to some methods.
    pub fn counts(&self) -> CallCounts {
        self.counts
    }

    /// The last EDB configuration received.
    pub fn edb_config(&self) -> &str {
        &self.edb_config
    }

    /// The rules received (after rewriting).
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The number of facts currently stored, all predicates included.
    pub fn fact_count(&self) -> usize {
        self.store.values().map(IndexSet::len).sum()
    }

    fn check(&mut self, point: Option<FailPoint>) -> BackendResult<()> {
        if self.stopped {
            return Err("backend stopped".into());
        }
        if point.is_some() && self.failure == point {
            self.failure = None;
            return Err(format!("injected failure on {point:?}").into());
        }
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str) -> BackendResult<()> {
        if level > self.log_level {
            return Ok(());
        }
        if let Some(path) = &self.log_file {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{level:?}: {message}")?;
        }
        Ok(())
    }

    fn load_edb_entry(&mut self, index: usize, entry: &EdbEntry) -> BackendResult<()> {
        let name = entry
            .predname
            .as_deref()
            .ok_or_else(|| format!("EDB{index} has no predicate name"))?;
        if entry.kind.as_deref() != Some("INMEMORY") {
            return Err(format!("EDB{index} has unsupported type {:?}", entry.kind).into());
        }
        let (Some(dir), Some(stem)) = (entry.params.get(&0), entry.params.get(&1)) else {
            return Err(format!("EDB{index} lacks parameters").into());
        };
        let path = Path::new(dir).join(format!("{stem}.csv"));
        let reader = BufReader::new(File::open(&path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let tuple = line
                .split(',')
                .map(|field| Term::constant(field.trim()))
                .collect::<Result<Vec<_>, _>>()?;
            let predicate = Predicate::new(name, tuple.len())?;
            self.store.entry(predicate).or_default().insert(tuple);
        }
        Ok(())
    }

    fn tuples<'s>(&'s self, predicate: &Predicate) -> impl Iterator<Item = &'s Vec<Term>> + 's {
        self.store.get(predicate).into_iter().flatten()
    }

    /// All extensions of `start` matching the positive `literals`.
    fn extend_matches<'a, I>(&self, literals: I, start: Bindings) -> Vec<Bindings>
    where
        I: IntoIterator<Item = &'a Literal>,
    {
        let mut results = vec![start];
        for lit in literals {
            let mut next = vec![];
            for bindings in &results {
                for tuple in self.tuples(lit.predicate()) {
                    if let Some(extended) = unify(lit.terms(), tuple, bindings) {
                        next.push(extended);
                    }
                }
            }
            results = next;
            if results.is_empty() {
                break;
            }
        }
        results
    }

    /// All matches of the body of `rule`.
    fn body_matches(&self, rule: &Rule) -> Vec<Bindings> {
        let mut ret = self.extend_matches(rule.positive_body(), Bindings::new());
        ret.retain(|bindings| {
            rule.negative_body().all(|lit| {
                !self
                    .tuples(lit.predicate())
                    .any(|tuple| unify(lit.terms(), tuple, bindings).is_some())
            })
        });
        ret
    }

    /// Apply `rule` (the `index`-th rule) on all matches of its body,
    /// and return the number of new facts.
    fn apply(&mut self, index: usize, rule: &Rule, algorithm: Algorithm) -> usize {
        let mut added = 0;
        for mut bindings in self.body_matches(rule) {
            if algorithm == Algorithm::RestrictedChase
                && !self
                    .extend_matches(rule.head(), bindings.clone())
                    .is_empty()
            {
                continue;
            }
            let frontier = rule
                .universal_variables()
                .into_iter()
                .filter_map(|v| bindings.get(v).map(|t| format!("{v}={t}")))
                .collect::<Vec<_>>()
                .join("|");
            for var in rule.existential_variables() {
                let null = match algorithm {
                    Algorithm::RestrictedChase => self.namer.fresh_null(),
                    Algorithm::SkolemChase => self
                        .namer
                        .null_for_label(&format!("{index}/{var}/{frontier}")),
                };
                bindings.insert(var.clone(), null.into());
            }
            for lit in rule.head() {
                let tuple: Vec<Term> = lit
                    .terms()
                    .iter()
                    .map(|t| match t.variable_name() {
                        Some(name) => bindings.get(name).cloned().unwrap_or_else(|| t.clone()),
                        None => t.clone(),
                    })
                    .collect();
                if self
                    .store
                    .entry(lit.predicate().clone())
                    .or_default()
                    .insert(tuple)
                {
                    added += 1;
                }
            }
        }
        added
    }
}

impl Backend for TestBackend {
    fn set_logging(&mut self, level: LogLevel, file: Option<&Path>) -> BackendResult<()> {
        self.check(None)?;
        self.log_level = level;
        self.log_file = file.map(Path::to_path_buf);
        Ok(())
    }

    fn configure(&mut self, edb_config: &str) -> BackendResult<()> {
        self.check(Some(FailPoint::Configure))?;
        let mut edb: BTreeMap<usize, EdbEntry> = BTreeMap::new();
        for line in edb_config.lines().filter(|l| !l.trim().is_empty()) {
            let malformed = || -> BackendError { format!("malformed EDB line {line:?}").into() };
            let (key, value) = line.split_once('=').ok_or_else(malformed)?;
            let (index, field) = key
                .strip_prefix("EDB")
                .and_then(|k| k.split_once('_'))
                .ok_or_else(malformed)?;
            let index: usize = index.parse().map_err(|_| malformed())?;
            let entry = edb.entry(index).or_default();
            match field {
                "predname" => entry.predname = Some(value.to_string()),
                "type" => entry.kind = Some(value.to_string()),
                _ => {
                    let param: usize = field
                        .strip_prefix("param")
                        .and_then(|p| p.parse().ok())
                        .ok_or_else(malformed)?;
                    entry.params.insert(param, value.to_string());
                }
            }
        }
        self.edb = edb;
        self.edb_config = edb_config.to_string();
        Ok(())
    }

    fn set_rules(&mut self, rules: &[Rule], strategy: RuleRewriteStrategy) -> BackendResult<()> {
        self.check(None)?;
        self.rules = match strategy {
            RuleRewriteStrategy::None => rules.to_vec(),
            RuleRewriteStrategy::SplitHeadPieces => {
                let mut split = vec![];
                for rule in rules {
                    split.extend(split_head_pieces(rule)?);
                }
                split
            }
        };
        Ok(())
    }

    fn add_facts(&mut self, predicate: &Predicate, tuples: &[Vec<Term>]) -> BackendResult<()> {
        self.check(None)?;
        if let Some(tuple) = tuples.iter().find(|t| t.len() != predicate.arity()) {
            return Err(format!("{tuple:?} does not fit {predicate}").into());
        }
        self.explicit
            .entry(predicate.clone())
            .or_default()
            .extend_from_slice(tuples);
        Ok(())
    }

    fn load(&mut self) -> BackendResult<()> {
        self.check(Some(FailPoint::Load))?;
        self.counts.loads += 1;
        self.store = self
            .explicit
            .iter()
            .map(|(p, tuples)| (p.clone(), tuples.iter().cloned().collect()))
            .collect();
        for (index, entry) in self.edb.clone() {
            self.load_edb_entry(index, &entry)?;
        }
        self.log(LogLevel::Info, &format!("loaded {} facts", self.fact_count()))
    }

    fn materialize(&mut self, algorithm: Algorithm, timeout: Option<u32>) -> BackendResult<bool> {
        self.check(Some(FailPoint::Materialize))?;
        self.counts.materializations += 1;
        let strata = Stratification::new(&self.rules)?;
        let budget = match (timeout, self.rounds_per_second) {
            (Some(seconds), Some(rounds)) => Some(seconds as usize * rounds),
            _ => None,
        };
        self.log(LogLevel::Info, &format!("materializing with {algorithm:?}"))?;
        let rules = self.rules.clone();
        let mut rounds = 0;
        for level in 0..strata.len().max(1) {
            loop {
                if budget.is_some_and(|budget| rounds >= budget) {
                    self.log(LogLevel::Warning, "timeout")?;
                    return Ok(false);
                }
                rounds += 1;
                let mut added = 0;
                for (index, rule) in rules.iter().enumerate() {
                    if strata.rule_level(rule) == level {
                        added += self.apply(index, rule, algorithm);
                    }
                }
                if added == 0 {
                    break;
                }
            }
        }
        self.log(LogLevel::Info, &format!("materialized {} facts", self.fact_count()))?;
        Ok(true)
    }

    fn query(
        &self,
        query: &Literal,
        include_constants: bool,
        include_named_nulls: bool,
    ) -> BackendResult<BackendAnswers<'_>> {
        if self.stopped {
            return Err("backend stopped".into());
        }
        if self.failure == Some(FailPoint::Query) {
            return Err("injected failure on Query".into());
        }
        let pattern = query.terms().to_vec();
        let tuples = self.tuples(query.predicate());
        Ok(Box::new(tuples.filter_map(move |tuple| {
            unify(&pattern, tuple, &Bindings::new())?;
            if !include_named_nulls && tuple.iter().any(Term::is_named_null) {
                return None;
            }
            let answer = if include_constants {
                tuple.clone()
            } else {
                tuple
                    .iter()
                    .zip(&pattern)
                    .filter(|(_, p)| p.is_variable())
                    .map(|(t, _)| t.clone())
                    .collect()
            };
            Some(Ok::<_, BackendError>(answer))
        })))
    }

    fn extension_size(&self, query: &Literal) -> BackendResult<u64> {
        if self.stopped {
            return Err("backend stopped".into());
        }
        let count = self
            .tuples(query.predicate())
            .filter(|tuple| unify(query.terms(), tuple, &Bindings::new()).is_some())
            .count();
        Ok(count as u64)
    }

    fn check_acyclicity(&mut self, notion: AcyclicityNotion) -> BackendResult<CyclicityResult> {
        self.check(None)?;
        self.log(LogLevel::Debug, &format!("checking {notion:?}"))?;
        let graph = DependencyGraph::from_rules(&self.rules);
        let cyclic = self.rules.iter().filter(|r| r.is_existential()).any(|r| {
            let downstream = graph.downstream_closure(r.head_predicates());
            r.body_predicates().iter().any(|p| downstream.contains(*p))
        });
        // existential rules feeding their own body may or may not terminate
        Ok(if cyclic {
            CyclicityResult::Undetermined
        } else {
            CyclicityResult::Acyclic
        })
    }

    fn reset(&mut self) -> BackendResult<()> {
        self.check(None)?;
        self.counts.resets += 1;
        self.edb.clear();
        self.edb_config.clear();
        self.rules.clear();
        self.explicit.clear();
        self.store.clear();
        Ok(())
    }

    fn stop(&mut self) {
        self.counts.stops += 1;
        self.stopped = true;
    }
}

fn unify(pattern: &[Term], tuple: &[Term], bindings: &Bindings) -> Option<Bindings> {
    let mut ret = bindings.clone();
    for (p, t) in pattern.iter().zip(tuple) {
        match p.variable_name() {
            Some(name) => match ret.get(name) {
                Some(bound) if bound != t => return None,
                Some(_) => {}
                None => {
                    ret.insert(name.clone(), t.clone());
                }
            },
            None if p != t => return None,
            None => {}
        }
    }
    Some(ret)
}

/// Split the head of `rule` into pieces,
/// i.e. minimal sets of literals not sharing any existential variable with other literals.
pub fn split_head_pieces(rule: &Rule) -> Result<Vec<Rule>, BackendError> {
    let mut pieces: Vec<(BTreeSet<&VarName>, Vec<Literal>)> = vec![];
    for lit in rule.head() {
        let vars: BTreeSet<&VarName> = lit.existential_variables().collect();
        let (connected, mut others): (Vec<_>, Vec<_>) = pieces
            .into_iter()
            .partition(|(piece_vars, _)| !piece_vars.is_disjoint(&vars));
        let mut merged = (vars, vec![]);
        for (piece_vars, literals) in connected {
            merged.0.extend(piece_vars);
            merged.1.extend(literals);
        }
        merged.1.push(lit.clone());
        others.push(merged);
        pieces = others;
    }
    pieces
        .into_iter()
        .map(|(_, head)| Rule::new(head, rule.body().to_vec()).map_err(BackendError::from))
        .collect()
}
