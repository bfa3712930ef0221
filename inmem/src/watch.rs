//! I define [`SessionWatch`],
//! through which reasoning sessions let a [`KnowledgeBase`](crate::KnowledgeBase)
//! know which mutations are currently legal.
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// The phase of a reasoning session, as seen by the knowledge base it is bound to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum SessionPhase {
    /// The session is bound to the knowledge base, but never loaded it
    Bound = 0,
    /// The session loaded the knowledge base at least once
    Loaded = 1,
    /// The session has been closed
    Closed = 2,
}

impl SessionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionPhase::Bound,
            1 => SessionPhase::Loaded,
            _ => SessionPhase::Closed,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::Bound => "bound",
            SessionPhase::Loaded => "loaded",
            SessionPhase::Closed => "closed",
        })
    }
}

/// A handle shared between a reasoning session and the knowledge base it is bound to,
/// obtained with [`KnowledgeBase::watch`](crate::KnowledgeBase::watch).
///
/// The knowledge base only keeps a weak reference to it:
/// dropping the session's handle releases the knowledge base from any constraint.
///
/// The phase only moves forward (`Bound`, then `Loaded`, then `Closed`).
#[derive(Debug)]
pub struct SessionWatch {
    kb_id: u64,
    phase: AtomicU8,
}

impl SessionWatch {
    pub(crate) fn new(kb_id: u64) -> Self {
        SessionWatch {
            kb_id,
            phase: AtomicU8::new(SessionPhase::Bound as u8),
        }
    }

    /// The identifier of the watched knowledge base.
    pub fn kb_id(&self) -> u64 {
        self.kb_id
    }

    /// The current phase of the session.
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Record that the session loaded the knowledge base.
    ///
    /// Has no effect on a closed session.
    pub fn mark_loaded(&self) {
        self.advance(SessionPhase::Loaded);
    }

    /// Record that the session has been closed.
    pub fn mark_closed(&self) {
        self.advance(SessionPhase::Closed);
    }

    fn advance(&self, phase: SessionPhase) {
        self.phase.fetch_max(phase as u8, Ordering::AcqRel);
    }
}
