//! This crate is part of [Chaser],
//! a toolkit for reasoning with existential rules in Rust.
//!
//! It defines the data model shared by all other crates:
//! [terms](term), [literals](literal), [rules](rule), [facts and statements](statement),
//! as well as the traits at the boundary with external collaborators:
//! the [chase engine](backend::Backend) and the [data sources](source::DataSource).
//! It also provides the [witness namer](skolem::Skolemization),
//! and the [predicate dependency graph](dependency::DependencyGraph)
//! on which stratification and correctness tracking are built.
//!
//! [Chaser]: https://docs.rs/chaser/latest/chaser/

#![deny(missing_docs)]

pub mod backend;
pub mod dependency;
pub mod error;
pub mod literal;
pub mod ns;
pub mod predicate;
pub mod query;
pub mod rule;
pub mod skolem;
pub mod source;
pub mod statement;
pub mod term;

pub use error::ModelError;

/// Re-export of the most commonly used types of this crate.
pub mod prelude {
    pub use crate::literal::Literal;
    pub use crate::predicate::Predicate;
    pub use crate::query::QueryResult;
    pub use crate::rule::Rule;
    pub use crate::statement::{DataSourceDeclaration, Fact, Statement};
    pub use crate::term::{NamedNull, Term};
    pub use crate::ModelError;
}
