//! I define [`Skolemization`], the witness namer
//! assigning stable external names to [named nulls](NamedNull).
//!
//! External names are hyphenated UUIDs, so they all have the same length,
//! and are easy to tell apart from (and parse back among) user-chosen constant names:
//! * a session-local null gets a name-based UUID in the namespace of the namer,
//!   which is itself a random UUID,
//!   so names are fresh for every namer instance;
//! * a portable null gets a name-based UUID of its token in a fixed namespace,
//!   so every namer produces the same name for it.
use std::collections::HashMap;
use std::fmt;

use uuid::Uuid;

use crate::term::{NamedNull, NullIdentity};

/// The fixed namespace in which portable nulls are named.
pub const PORTABLE_NAMESPACE: Uuid = Uuid::from_u128(0x6c1a_9a3e_5b8e_4f0e_9d6b_3c2e_7a41_f05d);

/// The length of every [`SkolemName`] (a hyphenated UUID).
pub const SKOLEM_NAME_LEN: usize = 36;

/// The external name of a [`NamedNull`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SkolemName(Uuid);

impl SkolemName {
    /// Parse a name previously produced by [`Skolemization::name`].
    ///
    /// Return `None` if `txt` does not follow the naming scheme.
    pub fn parse(txt: &str) -> Option<Self> {
        if txt.len() != SKOLEM_NAME_LEN {
            return None;
        }
        Uuid::try_parse(txt).ok().map(SkolemName)
    }

    /// The underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Turn this name back into a portable null,
    /// e.g. to re-import materialized output in another session.
    ///
    /// Any [`Skolemization`] gives that null this very name.
    pub fn to_portable_null(&self) -> NamedNull {
        NamedNull::portable(self.to_string())
    }
}

impl fmt::Display for SkolemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A witness namer.
///
/// It mints session-local [`NamedNull`]s for a backend,
/// and gives external names to named nulls of any origin.
#[derive(Clone, Debug)]
pub struct Skolemization {
    id: Uuid,
    next: u64,
    labels: HashMap<Box<str>, NamedNull>,
}

impl Skolemization {
    /// Build a namer with a fresh random identity.
    pub fn new() -> Self {
        Skolemization {
            id: Uuid::new_v4(),
            next: 0,
            labels: HashMap::new(),
        }
    }

    /// The identity of this namer.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mint a new session-local named null, distinct from all others.
    pub fn fresh_null(&mut self) -> NamedNull {
        let ret = NamedNull::local(self.id, self.next);
        self.next += 1;
        ret
    }

    /// Return the session-local named null associated with a backend-internal `label`,
    /// minting it on first use.
    pub fn null_for_label(&mut self, label: &str) -> NamedNull {
        if let Some(null) = self.labels.get(label) {
            return null.clone();
        }
        let null = self.fresh_null();
        self.labels.insert(label.into(), null.clone());
        null
    }

    /// The external name of `null`.
    ///
    /// The same null always gets the same name from the same namer,
    /// and distinct nulls always get distinct names.
    /// Names of portable nulls do not depend on the namer,
    /// and a portable null whose token is a name (as produced by [`SkolemName::to_portable_null`])
    /// keeps that name.
    pub fn name(&self, null: &NamedNull) -> SkolemName {
        match null.identity() {
            NullIdentity::Local { namer, serial } => {
                let mut bytes = [0; 24];
                bytes[..16].copy_from_slice(namer.as_bytes());
                bytes[16..].copy_from_slice(&serial.to_be_bytes());
                SkolemName(Uuid::new_v5(&self.id, &bytes))
            }
            NullIdentity::Portable(token) => match SkolemName::parse(token) {
                // only the canonical spelling, so that distinct tokens keep distinct names
                Some(name) if name.to_string() == **token => name,
                _ => SkolemName(Uuid::new_v5(&PORTABLE_NAMESPACE, token.as_bytes())),
            },
        }
    }
}

impl Default for Skolemization {
    fn default() -> Self {
        Self::new()
    }
}
