//! Single-fire completion tickets for framed message transfer.
//!
//! A ticket represents exactly one pending read or write of one protocol
//! message over a bound session. Its lifecycle contract is strict: `fill`
//! is invoked exactly once, the stored completion callback is consumed and
//! invoked exactly once, and the ticket is dead the instant that callback
//! fires. [`SourceTicket`] reads one complete framed message through the
//! header-then-body state machine; [`SinkTicket`] writes one message.

pub mod sink;
pub mod source;

use std::{
    sync::{Arc, Weak},
    time::Instant,
};

pub use sink::SinkTicket;
pub use source::SourceTicket;

use crate::{
    error::{FillResult, TicketError},
    session::{Session, SessionId},
};

/// Completion callback stored by a ticket and invoked exactly once.
pub type FillCallback<T> = Box<dyn FnOnce(FillResult<T>) + Send + 'static>;

/// Shared lifecycle state of a pending ticket.
///
/// Holds the weak session back-reference, the sync-policy flag, and the
/// single-fire callback slot. Both ticket kinds drive their continuation
/// chains through this core; it performs no locking, relying on the session
/// invoking at most one completion per outstanding operation.
pub(crate) struct TicketCore<T> {
    session: Weak<dyn Session>,
    session_id: SessionId,
    deadline: Option<Instant>,
    fill_sync: bool,
    callback: Option<FillCallback<T>>,
}

impl<T> TicketCore<T> {
    pub(crate) fn new(session: &Arc<dyn Session>, deadline: Option<Instant>) -> Self {
        Self {
            session: Arc::downgrade(session),
            session_id: session.id(),
            deadline,
            fill_sync: false,
            callback: None,
        }
    }

    /// Identifier of the bound session, valid even after it goes away.
    pub(crate) fn session_id(&self) -> SessionId { self.session_id }

    /// Sync-policy flag fixed at fill time; never changes mid-operation.
    pub(crate) fn is_sync(&self) -> bool { self.fill_sync }

    /// Deadline honored by the session layer for each transfer.
    pub(crate) fn deadline(&self) -> Option<Instant> { self.deadline }

    /// Store the sync flag and completion callback at fill time.
    pub(crate) fn arm(&mut self, sync: bool, callback: FillCallback<T>) {
        debug_assert!(self.callback.is_none(), "ticket armed twice");
        self.fill_sync = sync;
        self.callback = Some(callback);
    }

    /// Resolve the weak session reference to a strong handle for one step.
    ///
    /// An absent or closed session finishes the ticket with
    /// [`TicketError::SessionClosed`] and yields no handle.
    pub(crate) fn resolve_session(&mut self) -> Option<Arc<dyn Session>> {
        match self.session.upgrade() {
            Some(session) if session.is_open() => Some(session),
            _ => {
                self.finish_fill(Err(TicketError::SessionClosed));
                None
            }
        }
    }

    /// Consume the stored callback and invoke it with `status`.
    ///
    /// The callback is moved out of the slot before it runs, so a
    /// re-entrant effect of the callback (including dropping the ticket)
    /// never observes a half-updated core.
    ///
    /// # Panics
    ///
    /// Panics when no callback is pending: either the ticket was completed
    /// twice or it began with no callback registered. Both are caller
    /// protocol violations, not runtime conditions.
    pub(crate) fn finish_fill(&mut self, status: FillResult<T>) {
        let callback = self
            .callback
            .take()
            .expect("ticket completed with no pending callback");
        callback(status);
    }
}
