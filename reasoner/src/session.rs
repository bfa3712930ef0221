//! I define [`Reasoner`], a reasoning session over a [`KnowledgeBase`].
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chaser_api::backend::{AcyclicityNotion, Backend, BackendResult, CyclicityResult};
use chaser_api::literal::Literal;
use chaser_api::predicate::Predicate;
use chaser_api::query::QueryResult;
use chaser_api::rule::Rule;
use chaser_api::skolem::Skolemization;
use chaser_api::statement::DataSourceDeclaration;
use chaser_api::term::Term;
use chaser_inmem::watch::SessionWatch;
use chaser_inmem::KnowledgeBase;

use crate::_csv::csv_row;
use crate::answers::{QueryAnswerCount, QueryAnswers};
use crate::config::{Algorithm, LogLevel, ReasonerConfig, RuleRewriteStrategy};
use crate::correctness::{Correctness, Snapshot};
use crate::error::{ConfigurationError, ReasonerError, StateError};
use crate::stratification::Stratification;

/// The observable state of a [`Reasoner`] with respect to a knowledge base.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReasonerState {
    /// The knowledge base has not been loaded
    NotLoaded,
    /// The knowledge base has been loaded, but not materialized
    Loaded,
    /// The materialization of the knowledge base has been computed
    Materialized,
    /// The knowledge base changed since it was last loaded
    Changed,
    /// The reasoner has been closed
    Closed,
}

impl fmt::Display for ReasonerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReasonerState::NotLoaded => "not loaded",
            ReasonerState::Loaded => "loaded",
            ReasonerState::Materialized => "materialized",
            ReasonerState::Changed => "changed",
            ReasonerState::Closed => "closed",
        })
    }
}

/// A reasoning session, delegating the computation of materializations
/// to a [`Backend`], and tracking the [`Correctness`] of its answers
/// as the [`KnowledgeBase`] it works on changes.
///
/// The reasoner does not own the knowledge base:
/// it is passed to every operation that needs to look at it,
/// and can be modified freely between operations.
/// A reasoner is bound to the first knowledge base it loads,
/// or the one given to [`bind`](Reasoner::bind)
/// (until [`reset_reasoner`](Reasoner::reset_reasoner) is called).
/// While it is bound, the knowledge base rejects
/// removals until it has been loaded once,
/// and any mutation once the reasoner is closed (until it is dropped).
///
/// Backend resources are released when the reasoner is [closed](Reasoner::close)
/// or dropped.
pub struct Reasoner<B: Backend> {
    backend: B,
    config: ReasonerConfig,
    namer: Skolemization,
    kb_id: Option<u64>,
    watch: Option<Arc<SessionWatch>>,
    snapshot: Option<Snapshot>,
    // whether the backend holds rules or data
    pushed: bool,
    closed: bool,
}

impl<B: Backend> Reasoner<B> {
    /// Build a reasoner with the default configuration.
    pub fn new(backend: B) -> Self {
        Reasoner {
            backend,
            config: ReasonerConfig::default(),
            namer: Skolemization::new(),
            kb_id: None,
            watch: None,
            snapshot: None,
            pushed: false,
            closed: false,
        }
    }

    /// Build a reasoner with the given configuration.
    pub fn with_config(backend: B, config: ReasonerConfig) -> Result<Self, ReasonerError> {
        config.check()?;
        let mut ret = Self::new(backend);
        ret.config = config;
        Ok(ret)
    }

    /// The current configuration.
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// The backend of this reasoner.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend of this reasoner.
    ///
    /// NB: acting on the backend directly bypasses the lifecycle of the reasoner.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The witness namer used to name named nulls in exported answers.
    pub fn skolemization(&self) -> &Skolemization {
        &self.namer
    }

    /// Change the chase variant used by the next materializations.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.set_algorithm(algorithm);
    }

    /// Change the maximum duration of the next materializations, in seconds.
    ///
    /// # Error
    /// If `timeout` is `Some(0)`.
    pub fn set_timeout(&mut self, timeout: Option<u32>) -> Result<(), ReasonerError> {
        Ok(self.config.set_timeout(timeout)?)
    }

    /// Change how rules are rewritten at the next load.
    pub fn set_rule_rewrite_strategy(&mut self, strategy: RuleRewriteStrategy) {
        self.config.set_rule_rewrite_strategy(strategy);
    }

    /// Change the verbosity of the backend log.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.config.set_log_level(level);
    }

    /// Change the file the backend appends its log to.
    pub fn set_log_file(&mut self, path: Option<PathBuf>) {
        self.config.set_log_file(path);
    }

    /// The state of this reasoner with respect to `kb`.
    pub fn state(&self, kb: &KnowledgeBase) -> ReasonerState {
        if self.closed {
            return ReasonerState::Closed;
        }
        let Some(snapshot) = &self.snapshot else {
            return ReasonerState::NotLoaded;
        };
        if self.kb_id != Some(kb.id()) || snapshot.version() != kb.version() {
            ReasonerState::Changed
        } else if snapshot.is_materialized() {
            ReasonerState::Materialized
        } else {
            ReasonerState::Loaded
        }
    }

    /// Bind this reasoner to `kb` without loading it.
    ///
    /// Until the first successful [`load`](Reasoner::load),
    /// statements can be added to `kb` but not removed from it.
    ///
    /// # Error
    /// [State error](StateError) if the reasoner is closed,
    /// or already bound to another knowledge base.
    pub fn bind(&mut self, kb: &KnowledgeBase) -> Result<(), ReasonerError> {
        self.check_open()?;
        self.check_bound(kb)?;
        self.bind_watch(kb);
        Ok(())
    }

    /// Load `kb` into the backend.
    ///
    /// Does nothing if `kb` is already loaded and did not change.
    ///
    /// # Error
    /// * [state error](StateError) if the reasoner is closed,
    ///   or bound to another knowledge base;
    /// * [configuration error](ConfigurationError) if the rules are not stratifiable,
    ///   or a data source does not have the arity of its predicate;
    /// * [I/O error](ReasonerError::Io) if a data source is not available;
    /// * [backend error](ReasonerError::Backend).
    ///
    /// After a backend error, the reasoner is [not loaded](ReasonerState::NotLoaded);
    /// after any other error, its state is unchanged.
    pub fn load(&mut self, kb: &KnowledgeBase) -> Result<(), ReasonerError> {
        self.check_open()?;
        self.check_bound(kb)?;
        match self.state(kb) {
            ReasonerState::Loaded | ReasonerState::Materialized => {
                log::warn!("knowledge base #{} is already loaded", kb.id());
                return Ok(());
            }
            _ => {}
        }

        Stratification::new(kb.rules())?;
        let declarations: Vec<&DataSourceDeclaration> = kb.data_source_declarations().collect();
        for decl in &declarations {
            let source = decl.source();
            if let Some(arity) = source.arity() {
                if arity != decl.predicate().arity() {
                    return Err(ConfigurationError::SourceArityMismatch {
                        predicate: decl.predicate().clone(),
                        source_id: source.identity(),
                        found: arity,
                    }
                    .into());
                }
            }
            source
                .validate()
                .map_err(|err| ReasonerError::io(source.identity(), err))?;
        }
        let (edb_config, bridges) = self.edb_config(kb, &declarations)?;
        let mut rules: Vec<Rule> = kb.rules().cloned().collect();
        rules.extend(bridges);
        let mut facts: BTreeMap<&Predicate, Vec<Vec<Term>>> = BTreeMap::new();
        for fact in kb.facts() {
            facts
                .entry(fact.predicate())
                .or_default()
                .push(fact.terms().to_vec());
        }

        self.snapshot = None;
        if self.pushed {
            self.backend.reset().map_err(ReasonerError::Backend)?;
        }
        self.pushed = true;
        self.push_to_backend(&edb_config, &rules, &facts)
            .map_err(ReasonerError::Backend)?;
        self.bind_watch(kb).mark_loaded();
        self.snapshot = Some(Snapshot::new(kb));
        log::info!(
            "loaded knowledge base #{} (version {}): {} rules, {} facts, {} data sources",
            kb.id(),
            kb.version(),
            rules.len(),
            kb.facts().count(),
            declarations.len(),
        );
        Ok(())
    }

    /// Compute the materialization of `kb`, loading it first if needed.
    ///
    /// Return `false` if the materialization was interrupted by the [timeout](ReasonerConfig::timeout);
    /// answers will then be at best [sound but incomplete](Correctness::SoundButIncomplete)
    /// until a subsequent call to this method returns `true`.
    ///
    /// # Error
    /// See [`load`](Reasoner::load).
    /// After a backend error during the materialization itself,
    /// the reasoner is [loaded](ReasonerState::Loaded) but not materialized.
    pub fn reason(&mut self, kb: &KnowledgeBase) -> Result<bool, ReasonerError> {
        self.check_open()?;
        self.check_bound(kb)?;
        if matches!(
            self.state(kb),
            ReasonerState::NotLoaded | ReasonerState::Changed
        ) {
            self.load(kb)?;
        }
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Err(StateError::NotLoaded.into());
        };
        snapshot.forget_materialization();
        log::info!(
            "materializing knowledge base #{} with {:?} (timeout: {:?})",
            kb.id(),
            self.config.algorithm(),
            self.config.timeout(),
        );
        let complete = self
            .backend
            .materialize(self.config.algorithm(), self.config.timeout())
            .map_err(ReasonerError::Backend)?;
        snapshot.record_materialization(complete);
        if complete {
            log::info!("materialization of knowledge base #{} completed", kb.id());
        } else {
            log::warn!(
                "materialization of knowledge base #{} interrupted by timeout",
                kb.id()
            );
        }
        Ok(complete)
    }

    /// Iterate over the facts matching `query`.
    ///
    /// Answers contain one term per term of `query`.
    /// If `include_nulls` is false, answers containing a named null are skipped.
    ///
    /// # Error
    /// * [state error](StateError) if the reasoner is closed,
    ///   bound to another knowledge base, or if no knowledge base was loaded;
    /// * [configuration error](ConfigurationError) if the query is negative,
    ///   or does not have the arity of its predicate in `kb`;
    /// * [backend error](ReasonerError::Backend).
    pub fn answer_query(
        &self,
        kb: &KnowledgeBase,
        query: &Literal,
        include_nulls: bool,
    ) -> Result<QueryAnswers<'_>, ReasonerError> {
        let correctness = self.check_query(kb, query)?;
        let inner = self
            .backend
            .query(query, true, include_nulls)
            .map_err(ReasonerError::Backend)?;
        log::debug!("answering {query} ({correctness})");
        Ok(QueryAnswers::new(inner, correctness, query.to_string()))
    }

    /// Count the facts matching `query`.
    ///
    /// See [`answer_query`](Reasoner::answer_query).
    pub fn count_query_answers(
        &self,
        kb: &KnowledgeBase,
        query: &Literal,
        include_nulls: bool,
    ) -> Result<QueryAnswerCount, ReasonerError> {
        if include_nulls && has_distinct_variables_only(query) {
            let correctness = self.check_query(kb, query)?;
            let count = self
                .backend
                .extension_size(query)
                .map_err(ReasonerError::Backend)?;
            return Ok(QueryAnswerCount { count, correctness });
        }
        let answers = self.answer_query(kb, query, include_nulls)?;
        let correctness = answers.correctness();
        let mut count = 0;
        for answer in answers {
            answer?;
            count += 1;
        }
        Ok(QueryAnswerCount { count, correctness })
    }

    /// Write the facts matching `query` to the CSV file at `path`,
    /// one answer per line, named nulls being replaced by their
    /// [external name](Skolemization::name).
    ///
    /// If there is no answer, the file is neither created nor modified.
    ///
    /// See [`answer_query`](Reasoner::answer_query).
    pub fn export_query_answers_to_csv(
        &self,
        kb: &KnowledgeBase,
        query: &Literal,
        path: impl AsRef<Path>,
        include_nulls: bool,
    ) -> Result<Correctness, ReasonerError> {
        let path = path.as_ref();
        let mut answers = self.answer_query(kb, query, include_nulls)?;
        let correctness = answers.correctness();
        if answers.is_exhausted() {
            log::debug!("no answer to {query}, {} left untouched", path.display());
            return Ok(correctness);
        }
        let file = File::create(path).map_err(|err| ReasonerError::io(path.display(), err))?;
        let mut writer = BufWriter::new(file);
        let mut buffer = String::new();
        for answer in answers {
            buffer.clear();
            csv_row(answer?.terms(), &self.namer, &mut buffer);
            writer
                .write_all(buffer.as_bytes())
                .map_err(|err| ReasonerError::io(path.display(), err))?;
        }
        writer
            .flush()
            .map_err(|err| ReasonerError::io(path.display(), err))?;
        Ok(correctness)
    }

    /// Call `f` on every fact, explicit or inferred, of every predicate of `kb`,
    /// named nulls included.
    ///
    /// Return the weakest correctness of all visited predicates.
    pub fn for_each_inference<F>(
        &self,
        kb: &KnowledgeBase,
        mut f: F,
    ) -> Result<Correctness, ReasonerError>
    where
        F: FnMut(&Predicate, &QueryResult),
    {
        let mut correctness = Correctness::SoundAndComplete;
        for predicate in kb.predicates() {
            let query = generic_query(&predicate)?;
            let answers = self.answer_query(kb, &query, true)?;
            correctness = correctness.min(answers.correctness());
            for answer in answers {
                f(&predicate, &answer?);
            }
        }
        Ok(correctness)
    }

    /// Check whether the rules of `kb` are acyclic w.r.t. `notion`,
    /// loading `kb` first if needed.
    pub fn check_acyclicity(
        &mut self,
        kb: &KnowledgeBase,
        notion: AcyclicityNotion,
    ) -> Result<CyclicityResult, ReasonerError> {
        self.check_open()?;
        self.check_bound(kb)?;
        if matches!(
            self.state(kb),
            ReasonerState::NotLoaded | ReasonerState::Changed
        ) {
            self.load(kb)?;
        }
        let ret = self
            .backend
            .check_acyclicity(notion)
            .map_err(ReasonerError::Backend)?;
        log::debug!("{notion:?} check: {ret:?}");
        Ok(ret)
    }

    /// Discard the loaded knowledge base and materialization,
    /// and unbind this reasoner from its knowledge base.
    pub fn reset_reasoner(&mut self) -> Result<(), ReasonerError> {
        self.check_open()?;
        self.kb_id = None;
        self.watch = None;
        self.snapshot = None;
        if self.pushed {
            self.pushed = false;
            self.backend.reset().map_err(ReasonerError::Backend)?;
        }
        log::info!("reasoner reset");
        Ok(())
    }

    /// Release the resources of the backend.
    ///
    /// Any subsequent operation (except `close`) fails with a [state error](StateError::Closed),
    /// and so does any mutation of the bound knowledge base, as long as this reasoner is not dropped.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.snapshot = None;
        if let Some(watch) = &self.watch {
            watch.mark_closed();
        }
        self.backend.stop();
        log::info!("reasoner closed");
    }

    /// Whether this reasoner has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<(), StateError> {
        if self.closed {
            Err(StateError::Closed)
        } else {
            Ok(())
        }
    }

    fn bind_watch(&mut self, kb: &KnowledgeBase) -> &SessionWatch {
        self.kb_id = Some(kb.id());
        self.watch.get_or_insert_with(|| kb.watch())
    }

    fn check_bound(&self, kb: &KnowledgeBase) -> Result<(), StateError> {
        match self.kb_id {
            Some(bound) if bound != kb.id() => Err(StateError::ForeignKnowledgeBase {
                bound,
                given: kb.id(),
            }),
            _ => Ok(()),
        }
    }

    fn check_query(
        &self,
        kb: &KnowledgeBase,
        query: &Literal,
    ) -> Result<Correctness, ReasonerError> {
        self.check_open()?;
        self.check_bound(kb)?;
        let Some(snapshot) = &self.snapshot else {
            return Err(StateError::NotLoaded.into());
        };
        if query.is_negative() {
            return Err(ConfigurationError::NegativeQuery(query.to_string()).into());
        }
        let predicate = query.predicate();
        match kb.arity_of(predicate.name()) {
            Some(expected) if expected != predicate.arity() => {
                return Err(ConfigurationError::QueryArityMismatch {
                    query: query.to_string(),
                    expected,
                    found: predicate.arity(),
                }
                .into());
            }
            None => log::warn!("{predicate} does not occur in knowledge base #{}", kb.id()),
            _ => {}
        }
        if snapshot.version() != kb.version() {
            log::warn!(
                "knowledge base #{} changed since it was loaded, answers to {query} may be outdated",
                kb.id()
            );
        }
        Ok(snapshot.correctness(kb, predicate))
    }

    /// Build the EDB configuration of the backend,
    /// and the rules bridging aliased data sources to their predicate.
    fn edb_config(
        &self,
        kb: &KnowledgeBase,
        declarations: &[&DataSourceDeclaration],
    ) -> Result<(String, Vec<Rule>), ReasonerError> {
        let mut config = String::new();
        let mut bridges = vec![];
        for (i, decl) in declarations.iter().enumerate() {
            let predicate = decl.predicate();
            let name = if kb.origins(predicate).needs_aliasing() {
                let alias = Predicate::new(alias_name(predicate, i), predicate.arity())?;
                bridges.push(bridging_rule(predicate, &alias)?);
                log::debug!("{predicate} aliased as {alias} for {}", decl.source().identity());
                alias.name().to_string()
            } else {
                predicate.name().to_string()
            };
            config.push_str(&format!("EDB{i}_predname={name}\n"));
            config.push_str(&decl.source().to_backend_config_fragment(i));
        }
        Ok((config, bridges))
    }

    fn push_to_backend(
        &mut self,
        edb_config: &str,
        rules: &[Rule],
        facts: &BTreeMap<&Predicate, Vec<Vec<Term>>>,
    ) -> BackendResult<()> {
        self.backend
            .set_logging(self.config.log_level(), self.config.log_file())?;
        log::debug!("backend configuration:\n{edb_config}");
        self.backend.configure(edb_config)?;
        self.backend
            .set_rules(rules, self.config.rule_rewrite_strategy())?;
        for (predicate, tuples) in facts {
            self.backend.add_facts(predicate, tuples)?;
        }
        self.backend.load()
    }
}

impl<B: Backend> Drop for Reasoner<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: Backend> fmt::Debug for Reasoner<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reasoner")
            .field("config", &self.config)
            .field("kb_id", &self.kb_id)
            .field("snapshot", &self.snapshot)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn alias_name(predicate: &Predicate, index: usize) -> String {
    format!("{}##alias{index}", predicate.name())
}

fn bridging_rule(predicate: &Predicate, alias: &Predicate) -> Result<Rule, ReasonerError> {
    let vars = (0..predicate.arity())
        .map(|i| Term::universal(format!("x{i}")))
        .collect::<Result<Vec<_>, _>>()?;
    let head = Literal::positive(predicate.clone(), vars.clone())?;
    let body = Literal::positive(alias.clone(), vars)?;
    Ok(Rule::new(vec![head], vec![body])?)
}

fn generic_query(predicate: &Predicate) -> Result<Literal, ReasonerError> {
    let vars = (0..predicate.arity())
        .map(|i| Term::universal(format!("x{i}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Literal::positive(predicate.clone(), vars)?)
}

fn has_distinct_variables_only(query: &Literal) -> bool {
    let terms = query.terms();
    terms.iter().all(Term::is_variable) && query.variables().len() == terms.len()
}

#[cfg(test)]
mod test;
