//! I define the [`NamedNull`] type,
//! the anonymous individuals introduced by existential variables during materialization.
//!
//! Named nulls can not be built freely:
//! session-local nulls are only minted by a [`Skolemization`](crate::skolem::Skolemization),
//! while portable nulls carry a caller-supplied, globally unique token
//! (typically a name produced by an earlier materialization, being re-imported).
use std::fmt;
use uuid::Uuid;

/// An anonymous individual produced as the witness of an existential variable.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NamedNull(pub(crate) NullIdentity);

/// The identity of a [`NamedNull`].
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum NullIdentity {
    /// A null minted during one reasoning session,
    /// identified by the namer that produced it and a serial number.
    Local {
        /// Identifier of the [`Skolemization`](crate::skolem::Skolemization) that minted this null
        namer: Uuid,
        /// Serial number of this null within its namer
        serial: u64,
    },
    /// A null whose identity is an explicit, globally unique token.
    Portable(Box<str>),
}

impl NamedNull {
    /// Build a portable named null from a globally unique `token`.
    ///
    /// Portable nulls receive the same external name from every namer,
    /// which makes it possible to re-import previously materialized output.
    pub fn portable(token: impl Into<Box<str>>) -> Self {
        NamedNull(NullIdentity::Portable(token.into()))
    }

    pub(crate) fn local(namer: Uuid, serial: u64) -> Self {
        NamedNull(NullIdentity::Local { namer, serial })
    }

    /// The identity of this null.
    pub fn identity(&self) -> &NullIdentity {
        &self.0
    }

    /// Whether this null was minted by a reasoning session.
    pub fn is_local(&self) -> bool {
        matches!(self.0, NullIdentity::Local { .. })
    }

    /// Whether this null carries a caller-supplied portable token.
    pub fn is_portable(&self) -> bool {
        matches!(self.0, NullIdentity::Portable(_))
    }
}

impl fmt::Display for NamedNull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            NullIdentity::Local { namer, serial } => {
                write!(f, "_:{}-{serial:016x}", namer.simple())
            }
            NullIdentity::Portable(token) => write!(f, "_:{token}"),
        }
    }
}
