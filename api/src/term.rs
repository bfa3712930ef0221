//! I define how terms
//! (variables, constants and named nulls)
//! are represented in Chaser.
//!
//! I provide the main type [`Term`],
//! and a number of auxiliary types, such as [`TermKind`], [`VarName`], [`LanguageTag`]...
use std::fmt;

pub mod language_tag;
pub mod named_null;
pub mod var_name;

pub use language_tag::{InvalidLanguageTag, LanguageTag};
pub use named_null::{NamedNull, NullIdentity};
pub use var_name::{InvalidVarName, VarName};

use crate::ModelError;

/// The different kinds of terms that a [`Term`] can represent.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialOrd, PartialEq)]
pub enum TermKind {
    /// A universally quantified variable
    UniversalVariable,
    /// An existentially quantified variable (only allowed in rule heads)
    ExistentialVariable,
    /// A constant identified by its name only
    AbstractConstant,
    /// A constant with a lexical value and a datatype IRI
    DatatypeConstant,
    /// A string with a language tag
    LanguageTaggedString,
    /// An anonymous individual introduced by the chase
    NamedNull,
}

/// A term, as it may appear in a [`Literal`](crate::literal::Literal).
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Term {
    /// A universally quantified variable
    UniversalVariable(VarName),
    /// An existentially quantified variable
    ExistentialVariable(VarName),
    /// A constant identified by its name only
    AbstractConstant(Box<str>),
    /// A constant with a lexical value and a datatype IRI
    DatatypeConstant {
        /// The lexical value of the constant
        lexical_value: Box<str>,
        /// The IRI of the datatype
        datatype: Box<str>,
    },
    /// A string with a language tag
    LanguageTaggedString {
        /// The string value
        value: Box<str>,
        /// The language tag
        language: LanguageTag,
    },
    /// An anonymous individual introduced by the chase
    NamedNull(NamedNull),
}

impl Term {
    /// Build a universal variable.
    pub fn universal(name: impl Into<Box<str>>) -> Result<Self, ModelError> {
        Ok(Term::UniversalVariable(VarName::new(name)?))
    }

    /// Build an existential variable.
    pub fn existential(name: impl Into<Box<str>>) -> Result<Self, ModelError> {
        Ok(Term::ExistentialVariable(VarName::new(name)?))
    }

    /// Build an abstract constant.
    pub fn constant(name: impl Into<Box<str>>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyName("constant"));
        }
        Ok(Term::AbstractConstant(name))
    }

    /// Build a datatype constant.
    pub fn typed(
        lexical_value: impl Into<Box<str>>,
        datatype: impl Into<Box<str>>,
    ) -> Result<Self, ModelError> {
        let datatype = datatype.into();
        if datatype.is_empty() {
            return Err(ModelError::EmptyName("datatype"));
        }
        Ok(Term::DatatypeConstant {
            lexical_value: lexical_value.into(),
            datatype,
        })
    }

    /// Build a language-tagged string.
    pub fn lang_string(
        value: impl Into<Box<str>>,
        language: impl Into<Box<str>>,
    ) -> Result<Self, ModelError> {
        Ok(Term::LanguageTaggedString {
            value: value.into(),
            language: LanguageTag::new(language)?,
        })
    }

    /// Return the kind of this [`Term`].
    pub fn kind(&self) -> TermKind {
        match self {
            Term::UniversalVariable(_) => TermKind::UniversalVariable,
            Term::ExistentialVariable(_) => TermKind::ExistentialVariable,
            Term::AbstractConstant(_) => TermKind::AbstractConstant,
            Term::DatatypeConstant { .. } => TermKind::DatatypeConstant,
            Term::LanguageTaggedString { .. } => TermKind::LanguageTaggedString,
            Term::NamedNull(_) => TermKind::NamedNull,
        }
    }

    /// Return true if this [`Term`] is a (universal or existential) variable.
    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::UniversalVariable(_) | Term::ExistentialVariable(_))
    }

    /// Return true if this [`Term`] is ground,
    /// i.e. a constant or a named null.
    #[inline]
    pub fn is_ground(&self) -> bool {
        !self.is_variable()
    }

    /// Return true if this [`Term`] is a constant (of any kind).
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Term::AbstractConstant(_)
                | Term::DatatypeConstant { .. }
                | Term::LanguageTaggedString { .. }
        )
    }

    /// Return true if this [`Term`] is a named null.
    #[inline]
    pub fn is_named_null(&self) -> bool {
        matches!(self, Term::NamedNull(_))
    }

    /// If this [`Term`] is a variable, return its name.
    pub fn variable_name(&self) -> Option<&VarName> {
        match self {
            Term::UniversalVariable(name) | Term::ExistentialVariable(name) => Some(name),
            _ => None,
        }
    }

    /// If this [`Term`] is a named null, return it.
    pub fn named_null(&self) -> Option<&self::NamedNull> {
        match self {
            Term::NamedNull(null) => Some(null),
            _ => None,
        }
    }
}

impl From<self::NamedNull> for Term {
    fn from(other: self::NamedNull) -> Self {
        Term::NamedNull(other)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::UniversalVariable(name) => write!(f, "?{name}"),
            Term::ExistentialVariable(name) => write!(f, "!{name}"),
            Term::AbstractConstant(name) => f.write_str(name),
            Term::DatatypeConstant {
                lexical_value,
                datatype,
            } => {
                write_quoted(f, lexical_value)?;
                write!(f, "^^<{datatype}>")
            }
            Term::LanguageTaggedString { value, language } => {
                write_quoted(f, value)?;
                write!(f, "@{language}")
            }
            Term::NamedNull(null) => write!(f, "{null}"),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}
