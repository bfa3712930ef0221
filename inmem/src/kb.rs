//! I define [`KnowledgeBase`].
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chaser_api::predicate::Predicate;
use chaser_api::rule::Rule;
use chaser_api::statement::{DataSourceDeclaration, Fact, Statement};
use indexmap::IndexSet;

use crate::delta::{ChangeKind, ChangeLog, Delta};
use crate::origin::{OriginIndex, OriginKind, PredicateOrigins};
use crate::watch::{SessionPhase, SessionWatch};
use crate::KbError;

static NEXT_KB_ID: AtomicU64 = AtomicU64::new(0);

/// A mutable set of [statements](Statement),
/// keeping track of the changes it undergoes.
///
/// * Statements are deduplicated, and enumerated in insertion order.
/// * All occurrences of a predicate name must have the same arity.
/// * Every structural change (a statement actually added or removed)
///   increments the [version](KnowledgeBase::version),
///   and is recorded in a [change log](ChangeLog), from which a [`Delta`] can be computed
///   [since any previous version](KnowledgeBase::delta_since).
/// * Reasoning sessions bound to the knowledge base [watch](KnowledgeBase::watch) it:
///   no mutation is allowed while one of them is closed,
///   and no removal is allowed while one of them has not loaded it yet.
#[derive(Debug)]
pub struct KnowledgeBase {
    id: u64,
    version: u64,
    statements: IndexSet<Statement>,
    arities: HashMap<Arc<str>, (usize, usize)>,
    origins: OriginIndex,
    changes: ChangeLog,
    sessions: Mutex<Vec<Weak<SessionWatch>>>,
}

impl KnowledgeBase {
    /// Build an empty knowledge base.
    pub fn new() -> Self {
        KnowledgeBase {
            id: NEXT_KB_ID.fetch_add(1, Ordering::Relaxed),
            version: 0,
            statements: IndexSet::new(),
            arities: HashMap::new(),
            origins: OriginIndex::default(),
            changes: ChangeLog::default(),
            sessions: Mutex::new(vec![]),
        }
    }

    /// An identifier of this knowledge base, unique in the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The current version of this knowledge base.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether this knowledge base contains no statement.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Whether this knowledge base contains `statement`.
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Add a statement.
    ///
    /// Return `Ok(false)` if the statement was already present
    /// (in which case nothing changes, not even the version).
    ///
    /// # Error
    /// * If the statement uses a predicate name with a different arity
    ///   than the one it already has in this knowledge base;
    /// * [state error](KbError::is_state_error) if a session bound to this knowledge base is closed.
    pub fn add_statement(&mut self, statement: impl Into<Statement>) -> Result<bool, KbError> {
        self.check_sessions(ChangeKind::Addition)?;
        let statement = statement.into();
        if self.statements.contains(&statement) {
            return Ok(false);
        }
        self.check_arities(&statement)?;
        for p in distinct_predicates(&statement) {
            match self.arities.entry(Arc::from(p.name())) {
                Entry::Occupied(mut e) => e.get_mut().1 += 1,
                Entry::Vacant(e) => {
                    e.insert((p.arity(), 1));
                }
            }
        }
        self.origins.insert(&statement);
        self.record(ChangeKind::Addition, &statement);
        log::trace!("added statement {statement}");
        self.statements.insert(statement);
        Ok(true)
    }

    /// Add several statements, in order.
    ///
    /// Return the number of statements actually added.
    ///
    /// # Error
    /// On the first rejected statement;
    /// the statements preceding it are kept.
    pub fn add_statements<I>(&mut self, statements: I) -> Result<usize, KbError>
    where
        I: IntoIterator,
        I::Item: Into<Statement>,
    {
        let mut count = 0;
        for statement in statements {
            if self.add_statement(statement)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove a statement.
    ///
    /// Return `Ok(false)` if the statement was not present
    /// (in which case nothing changes, not even the version).
    ///
    /// # Error
    /// [State error](KbError::is_state_error) if a session bound to this knowledge base
    /// is closed, or has not loaded it yet.
    pub fn remove_statement(&mut self, statement: &Statement) -> Result<bool, KbError> {
        self.check_sessions(ChangeKind::Removal)?;
        if !self.statements.shift_remove(statement) {
            return Ok(false);
        }
        for p in distinct_predicates(statement) {
            if let Entry::Occupied(mut e) = self.arities.entry(Arc::from(p.name())) {
                e.get_mut().1 -= 1;
                if e.get().1 == 0 {
                    e.remove();
                }
            }
        }
        self.origins.remove(statement);
        self.record(ChangeKind::Removal, statement);
        log::trace!("removed statement {statement}");
        Ok(true)
    }

    /// Remove several statements.
    ///
    /// Return the number of statements actually removed.
    ///
    /// # Error
    /// See [`remove_statement`](KnowledgeBase::remove_statement).
    pub fn remove_statements<'a, I>(&mut self, statements: I) -> Result<usize, KbError>
    where
        I: IntoIterator<Item = &'a Statement>,
    {
        let mut count = 0;
        for statement in statements {
            if self.remove_statement(statement)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Iterate over all statements, in insertion order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.statements.iter()
    }

    /// Iterate over all rules, in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.statements.iter().filter_map(|s| match s {
            Statement::Rule(r) => Some(r),
            _ => None,
        })
    }

    /// Iterate over all facts, in insertion order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.statements.iter().filter_map(|s| match s {
            Statement::Fact(f) => Some(f),
            _ => None,
        })
    }

    /// Iterate over all data source declarations, in insertion order.
    pub fn data_source_declarations(&self) -> impl Iterator<Item = &DataSourceDeclaration> + '_ {
        self.statements.iter().filter_map(|s| match s {
            Statement::DataSource(d) => Some(d),
            _ => None,
        })
    }

    /// Iterate over the facts of `predicate`, in insertion order.
    pub fn facts_by_predicate<'s>(
        &'s self,
        predicate: &'s Predicate,
    ) -> impl Iterator<Item = &'s Fact> + 's {
        self.facts().filter(move |f| f.predicate() == predicate)
    }

    /// All predicates occurring in this knowledge base.
    pub fn predicates(&self) -> BTreeSet<Predicate> {
        self.statements
            .iter()
            .flat_map(Statement::predicates)
            .cloned()
            .collect()
    }

    /// The arity of the predicate named `name`, if it occurs in this knowledge base.
    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.arities.get(name).map(|(arity, _)| *arity)
    }

    /// The origins of `predicate`.
    pub fn origins(&self, predicate: &Predicate) -> PredicateOrigins {
        self.origins.get(predicate)
    }

    /// The origins of all predicates.
    pub fn origin_index(&self) -> &OriginIndex {
        &self.origins
    }

    /// The changes undergone by this knowledge base since `version`.
    ///
    /// `version` would typically have been obtained from [`version`](KnowledgeBase::version)
    /// at some earlier point in time.
    pub fn delta_since(&self, version: u64) -> Delta {
        Delta::from_log(version.min(self.version), self.version, &self.changes)
    }

    /// The change log of this knowledge base.
    pub fn change_log(&self) -> &ChangeLog {
        &self.changes
    }

    /// Bind a new reasoning session to this knowledge base.
    ///
    /// The session reports its progress through the returned handle,
    /// and stops constraining the mutations of this knowledge base once the handle is dropped.
    pub fn watch(&self) -> Arc<SessionWatch> {
        let watch = Arc::new(SessionWatch::new(self.id));
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|w| w.strong_count() > 0);
        sessions.push(Arc::downgrade(&watch));
        log::debug!("knowledge base #{} watched by {} session(s)", self.id, sessions.len());
        watch
    }

    fn check_sessions(&mut self, kind: ChangeKind) -> Result<(), KbError> {
        let sessions = self
            .sessions
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|w| w.strong_count() > 0);
        for watch in sessions.iter().filter_map(Weak::upgrade) {
            match (watch.phase(), kind) {
                (SessionPhase::Closed, _) => return Err(KbError::SessionClosed(self.id)),
                (SessionPhase::Bound, ChangeKind::Removal) => {
                    return Err(KbError::NotLoaded(self.id))
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn check_arities(&self, statement: &Statement) -> Result<(), KbError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for p in statement.predicates() {
            let expected = match self.arities.get(p.name()) {
                Some((arity, _)) => Some(*arity),
                None => seen.get(p.name()).copied(),
            };
            if let Some(expected) = expected {
                if expected != p.arity() {
                    return Err(KbError::ArityMismatch {
                        name: p.name().to_string(),
                        expected,
                        found: p.arity(),
                        statement: statement.to_string(),
                    });
                }
            }
            seen.insert(p.name(), p.arity());
        }
        Ok(())
    }

    fn record(&mut self, kind: ChangeKind, statement: &Statement) {
        self.version += 1;
        self.changes.record(
            self.version,
            kind,
            OriginKind::of(statement),
            statement.defined_predicates(),
        );
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Into<Statement>> Extend<S> for KnowledgeBase {
    /// Add all statements, ignoring those rejected by [`add_statement`](KnowledgeBase::add_statement).
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for statement in iter {
            if let Err(err) = self.add_statement(statement) {
                log::warn!("{err}");
            }
        }
    }
}

fn distinct_predicates(statement: &Statement) -> Vec<&Predicate> {
    let mut ret = statement.predicates();
    ret.sort();
    ret.dedup();
    ret
}
