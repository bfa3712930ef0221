//! I define [`ModelError`], raised when building invalid model values.
use thiserror::Error;

use crate::predicate::Predicate;
use crate::term::{InvalidLanguageTag, InvalidVarName, VarName};

/// An error raised when trying to build an invalid term, literal, fact or rule.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A variable name is invalid
    #[error(transparent)]
    InvalidVarName(#[from] InvalidVarName),
    /// A language tag is invalid
    #[error(transparent)]
    InvalidLanguageTag(#[from] InvalidLanguageTag),
    /// A name (of a constant, datatype or predicate) is empty
    #[error("The name of a {0} can not be empty")]
    EmptyName(&'static str),
    /// A literal has a number of terms different from the arity of its predicate
    #[error("Predicate {predicate} expects {} terms, got {found}", predicate.arity())]
    ArityMismatch {
        /// The predicate of the literal
        predicate: Predicate,
        /// The number of terms actually given
        found: usize,
    },
    /// A fact contains a variable
    #[error("Fact {0} contains a variable")]
    NonGroundFact(String),
    /// A fact contains a named null produced by a reasoning session
    #[error("Fact {0} contains a session-local named null")]
    LocalNullInFact(String),
    /// A fact is a negative literal
    #[error("Fact {0} is a negative literal")]
    NegativeFact(String),
    /// A rule has no head literal
    #[error("A rule must have at least one head literal")]
    EmptyHead,
    /// A rule has no body literal
    #[error("A rule must have at least one body literal")]
    EmptyBody,
    /// A rule head contains a negative literal
    #[error("Head literal {0} is negative")]
    NegativeHeadLiteral(String),
    /// A rule contains a named null
    #[error("Rule literal {0} contains a named null")]
    NamedNullInRule(String),
    /// An existential variable also occurs in the rule body
    #[error("Existential variable {0} occurs in the rule body")]
    ExistentialInBody(VarName),
    /// A universal variable of the head or of a negative literal
    /// does not occur in any positive body literal
    #[error("Universal variable {0} does not occur in any positive body literal")]
    UnsafeVariable(VarName),
}
