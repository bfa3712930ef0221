//! This crate is part of [Chaser],
//! a toolkit for reasoning with existential rules in Rust.
//!
//! It provides [`KnowledgeBase`], the in-memory store of
//! rules, facts and data source declarations,
//! which keeps track of its changes so that reasoning sessions
//! can tell how far their results are outdated.
//!
//! [Chaser]: https://docs.rs/chaser/latest/chaser/

#![deny(missing_docs)]

pub mod delta;
pub mod kb;
pub mod origin;
pub mod watch;

pub use kb::KnowledgeBase;

use thiserror::Error;

/// An error raised when a mutation is rejected by a [`KnowledgeBase`].
#[derive(Debug, Error)]
pub enum KbError {
    /// The statement uses a predicate name with an arity
    /// different from the one it already has in the knowledge base
    #[error("Predicate {name} has arity {expected} in the knowledge base, but is used with arity {found} in {statement}")]
    ArityMismatch {
        /// The name of the predicate
        name: String,
        /// The arity of the predicate in the knowledge base
        expected: usize,
        /// The arity with which the statement uses it
        found: usize,
        /// The rejected statement, as text
        statement: String,
    },
    /// A reasoning session bound to the knowledge base has been closed,
    /// so the knowledge base can not be modified until that session is dropped
    #[error("A reasoning session over knowledge base #{0} has been closed")]
    SessionClosed(u64),
    /// Statements can not be removed before every session bound to the knowledge base
    /// has loaded it at least once
    #[error("Knowledge base #{0} has not been loaded yet by the reasoning session bound to it")]
    NotLoaded(u64),
}

impl KbError {
    /// Whether this error is due to the state of a reasoning session,
    /// rather than to the rejected statement.
    pub fn is_state_error(&self) -> bool {
        matches!(self, KbError::SessionClosed(_) | KbError::NotLoaded(_))
    }
}
