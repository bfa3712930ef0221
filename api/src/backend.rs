//! I define the [`Backend`] trait,
//! the narrow interface to the external chase engine actually computing materializations.
//!
//! Implementations are expected to be thin wrappers around a native engine;
//! the lifecycle they are driven through is enforced by the reasoner,
//! so they do not need to check it themselves.
use std::error::Error;
use std::path::Path;

use crate::literal::Literal;
use crate::predicate::Predicate;
use crate::rule::Rule;
use crate::term::Term;

/// The error type of the [`Backend`] trait objects.
pub type BackendError = Box<dyn Error + Send + Sync + 'static>;

/// A convenient result type for [`Backend`] methods.
pub type BackendResult<T> = Result<T, BackendError>;

/// The tuples of ground terms answering a query.
pub type BackendAnswers<'a> = Box<dyn Iterator<Item = BackendResult<Vec<Term>>> + 'a>;

/// The variant of the chase used for materialization.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Algorithm {
    /// Only introduce witnesses when the head is not already satisfied
    #[default]
    RestrictedChase,
    /// Introduce a witness for every trigger (oblivious chase with skolem functions)
    SkolemChase,
}

/// How rules are rewritten before being handed to the backend.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RuleRewriteStrategy {
    /// Rules are used as given
    #[default]
    None,
    /// Rules with several head pieces are split into one rule per piece
    SplitHeadPieces,
}

/// The verbosity of the backend's own log.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum LogLevel {
    /// Only errors
    Error,
    /// Errors and warnings
    #[default]
    Warning,
    /// General information
    Info,
    /// Everything
    Debug,
}

/// The acyclicity notions a backend may be able to check,
/// each of them sufficient for the chase to terminate.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AcyclicityNotion {
    /// Joint acyclicity
    JointAcyclicity,
    /// Restricted joint acyclicity
    RestrictedJointAcyclicity,
    /// Model-faithful acyclicity
    ModelFaithfulAcyclicity,
    /// Restricted model-faithful acyclicity
    RestrictedModelFaithfulAcyclicity,
    /// Model-faithful cyclicity (a sufficient condition for non-termination)
    ModelFaithfulCyclicity,
}

/// The result of an acyclicity check.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CyclicityResult {
    /// The rules are acyclic w.r.t. the checked notion
    Acyclic,
    /// The rules are cyclic w.r.t. the checked notion
    Cyclic,
    /// The check could not decide
    Undetermined,
}

/// The interface of an external chase engine.
///
/// A reasoner drives a backend through the following sequence:
/// [`set_logging`](Backend::set_logging),
/// [`configure`](Backend::configure),
/// [`set_rules`](Backend::set_rules),
/// [`add_facts`](Backend::add_facts) (once per predicate),
/// [`load`](Backend::load),
/// then any number of [`materialize`](Backend::materialize),
/// [`query`](Backend::query) and [`extension_size`](Backend::extension_size),
/// and finally [`reset`](Backend::reset) (before loading again) or [`stop`](Backend::stop).
pub trait Backend {
    /// Pass the log configuration through to the engine.
    ///
    /// The log file, if any, is appended to.
    fn set_logging(&mut self, _level: LogLevel, _file: Option<&Path>) -> BackendResult<()> {
        Ok(())
    }

    /// Configure the external data sources (EDB configuration).
    fn configure(&mut self, edb_config: &str) -> BackendResult<()>;

    /// Set the rules to reason with.
    fn set_rules(&mut self, rules: &[Rule], strategy: RuleRewriteStrategy) -> BackendResult<()>;

    /// Add explicit facts for `predicate`, each tuple having its arity.
    fn add_facts(&mut self, predicate: &Predicate, tuples: &[Vec<Term>]) -> BackendResult<()>;

    /// Load the configured data and facts.
    fn load(&mut self) -> BackendResult<()>;

    /// Compute the materialization.
    ///
    /// Return `false` if the computation was interrupted
    /// because `timeout` (in seconds) expired.
    fn materialize(&mut self, algorithm: Algorithm, timeout: Option<u32>) -> BackendResult<bool>;

    /// Iterate over the tuples matching `query`.
    ///
    /// Each tuple contains one term per term of `query`
    /// (including its constants if `include_constants` is true).
    /// If `include_named_nulls` is false,
    /// tuples containing a named null are skipped.
    fn query(
        &self,
        query: &Literal,
        include_constants: bool,
        include_named_nulls: bool,
    ) -> BackendResult<BackendAnswers<'_>>;

    /// The number of facts matching `query`, named nulls included.
    fn extension_size(&self, query: &Literal) -> BackendResult<u64>;

    /// Check whether the current rules are acyclic w.r.t. `notion`.
    fn check_acyclicity(&mut self, _notion: AcyclicityNotion) -> BackendResult<CyclicityResult> {
        Ok(CyclicityResult::Undetermined)
    }

    /// Forget the loaded data, rules and materialization.
    fn reset(&mut self) -> BackendResult<()>;

    /// Release all resources held by the engine.
    fn stop(&mut self);
}
