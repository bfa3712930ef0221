//! This crate is part of [Chaser],
//! a toolkit for reasoning with existential rules in Rust.
//!
//! It provides [`Reasoner`], a reasoning session over a
//! [`KnowledgeBase`](chaser_inmem::KnowledgeBase),
//! delegating the computation of materializations to an external
//! [`Backend`](chaser_api::backend::Backend).
//!
//! The reasoner enforces the lifecycle of the session
//! (see [`ReasonerState`]), checks that rules are [stratifiable](stratification),
//! and labels every set of answers with its [`Correctness`]
//! with respect to the current content of the knowledge base,
//! which may change at any time.
//!
//! [Chaser]: https://docs.rs/chaser/latest/chaser/
#![deny(missing_docs)]

pub mod answers;
pub mod config;
pub mod correctness;
pub mod error;
pub mod session;
pub mod stratification;
#[cfg(any(test, feature = "test_backend"))]
pub mod test_backend;

mod _csv;

pub use answers::{QueryAnswerCount, QueryAnswers};
pub use config::ReasonerConfig;
pub use correctness::Correctness;
pub use error::{ConfigurationError, ErrorKind, ReasonerError, StateError};
pub use session::{Reasoner, ReasonerState};

#[cfg(test)]
fn test_setup() {
    TEST_SETUP.call_once(|| {
        env_logger::init();
    });
}

#[cfg(test)]
static TEST_SETUP: std::sync::Once = std::sync::Once::new();
