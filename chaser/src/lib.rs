//! This crate aims to provide a toolkit
//! for reasoning with [existential rules] in Rust,
//! in front of an external chase engine.
//!
//! It is made of several sub-crates, re-exported here:
//! * [`api`] defines the data model (terms, literals, rules, facts, data sources),
//!   the dependency graph of rules, the [witness namer](api::skolem)
//!   and the [`Backend`](api::backend::Backend) trait implemented by chase engines;
//! * [`inmem`] provides the [`KnowledgeBase`](inmem::KnowledgeBase),
//!   which records every change made to it;
//! * [`reasoner`] provides the [`Reasoner`](reasoner::Reasoner) session,
//!   which labels every answer set with its [`Correctness`](reasoner::Correctness).
//!
//! # Getting Started
//!
//! ```
//! # #[cfg(feature = "test_backend")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use chaser::prelude::*;
//! use chaser::reasoner::test_backend::TestBackend;
//!
//! let x = Term::universal("x")?;
//! let mut kb = KnowledgeBase::new();
//! kb.add_statement(Fact::new(Predicate::new("bird", 1)?, vec![Term::constant("tweety")?])?)?;
//! kb.add_statement(Rule::new(
//!     vec![Literal::new("animal", vec![x.clone()])?],
//!     vec![Literal::new("bird", vec![x.clone()])?],
//! )?)?;
//!
//! let mut reasoner = Reasoner::new(TestBackend::new());
//! reasoner.reason(&kb)?;
//! let answers = reasoner.answer_query(&kb, &Literal::new("animal", vec![x])?, true)?;
//! assert_eq!(answers.correctness(), Correctness::SoundAndComplete);
//! for answer in answers {
//!     println!("{}", answer?);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "test_backend"))]
//! # fn main() {}
//! ```
//!
//! [existential rules]: https://en.wikipedia.org/wiki/Tuple-generating_dependency
#![deny(missing_docs)]

pub use chaser_api as api;
pub use chaser_inmem as inmem;
pub use chaser_reasoner as reasoner;

/// The most commonly used types of the toolkit.
pub mod prelude {
    pub use chaser_api::backend::Backend;
    pub use chaser_api::prelude::*;
    pub use chaser_inmem::KnowledgeBase;
    pub use chaser_reasoner::{
        Correctness, ReasonerConfig, Reasoner, ReasonerError, ReasonerState,
    };
}
