//! I define [`ReasonerError`] and its components.
use std::io;

use chaser_api::backend::BackendError;
use chaser_api::predicate::Predicate;
use chaser_api::ModelError;

/// An error raised by a [`Reasoner`](crate::Reasoner).
#[derive(Debug, thiserror::Error)]
pub enum ReasonerError {
    /// The operation is not allowed in the current state of the reasoner
    #[error(transparent)]
    State(#[from] StateError),
    /// The knowledge base, the query or the settings are invalid
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// An external resource could not be accessed
    #[error("IO error with {resource}: {source}")]
    Io {
        /// A description of the resource
        resource: String,
        /// The underlying error
        #[source]
        source: io::Error,
    },
    /// The backend failed
    #[error("Backend error: {0}")]
    Backend(#[source] BackendError),
}

/// The classification of a [`ReasonerError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// See [`ReasonerError::State`]
    State,
    /// See [`ReasonerError::Configuration`]
    Configuration,
    /// See [`ReasonerError::Io`]
    Io,
    /// See [`ReasonerError::Backend`]
    Backend,
}

impl ReasonerError {
    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReasonerError::State(_) => ErrorKind::State,
            ReasonerError::Configuration(_) => ErrorKind::Configuration,
            ReasonerError::Io { .. } => ErrorKind::Io,
            ReasonerError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Whether this error requires the caller to fix its input
    /// before trying again.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub(crate) fn io(resource: impl std::fmt::Display, source: io::Error) -> Self {
        ReasonerError::Io {
            resource: resource.to_string(),
            source,
        }
    }
}

impl From<ModelError> for ReasonerError {
    fn from(other: ModelError) -> Self {
        ReasonerError::Configuration(other.into())
    }
}

/// An operation was attempted in a state where it is not allowed.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The reasoner has been closed
    #[error("The reasoner has been closed")]
    Closed,
    /// The knowledge base has not been loaded yet
    #[error("The knowledge base has not been loaded yet")]
    NotLoaded,
    /// The reasoner is already used with another knowledge base
    #[error("The reasoner is used with knowledge base #{bound}, not #{given}")]
    ForeignKnowledgeBase {
        /// The id of the knowledge base the reasoner is used with
        bound: u64,
        /// The id of the knowledge base passed to the operation
        given: u64,
    },
}

/// The knowledge base, a query or a setting is invalid.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The rules are not stratifiable
    #[error("Rules are not stratifiable: {predicate} negatively depends on itself through {}", display_cycle(.cycle))]
    NotStratifiable {
        /// A predicate negatively depending on itself
        predicate: Predicate,
        /// The predicates of the cycle
        cycle: Vec<Predicate>,
    },
    /// A data source does not have the arity of its predicate
    #[error("Data source {source_id} has arity {found}, but is declared for {predicate}")]
    SourceArityMismatch {
        /// The predicate of the declaration
        predicate: Predicate,
        /// The identity of the data source
        source_id: String,
        /// The arity of the source
        found: usize,
    },
    /// A query has a different arity than its predicate in the knowledge base
    #[error("Query {query} has arity {found}, but its predicate has arity {expected} in the knowledge base")]
    QueryArityMismatch {
        /// The query, as text
        query: String,
        /// The arity of the predicate in the knowledge base
        expected: usize,
        /// The arity of the query
        found: usize,
    },
    /// A query is a negative literal
    #[error("Query {0} is a negative literal")]
    NegativeQuery(String),
    /// The reasoning timeout is zero
    #[error("The reasoning timeout must be positive")]
    InvalidTimeout,
    /// A model value is invalid
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn display_cycle(cycle: &[Predicate]) -> String {
    cycle
        .iter()
        .map(Predicate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
