//! Canonical error and status types for the crate.
//!
//! Every failure a ticket can encounter surfaces through its single
//! completion callback as a [`TicketError`]; nothing unwinds across the
//! ticket boundary. Caller protocol violations (filling a ticket twice,
//! finishing a ticket with no pending callback) are assertions, not
//! reportable statuses.

use thiserror::Error;

/// Terminal status of a ticket operation.
#[derive(Debug, Error)]
pub enum TicketError {
    /// The bound session was absent or no longer open at time of use.
    #[error("session is closed")]
    SessionClosed,

    /// A low-level transfer error reported by the session.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The declared message length violated the wire format.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl TicketError {
    /// Returns true if this status reports a closed or missing session.
    #[must_use]
    pub fn is_session_closed(&self) -> bool { matches!(self, Self::SessionClosed) }

    /// Returns true if this status reports a framing violation.
    #[must_use]
    pub fn is_protocol(&self) -> bool { matches!(self, Self::Protocol(_)) }
}

/// Status value delivered through a ticket's completion callback.
///
/// Source tickets complete with `FillResult<Message>`, sink tickets with
/// `FillResult<()>`.
pub type FillResult<T = ()> = Result<T, TicketError>;
