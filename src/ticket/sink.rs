//! Write path: one complete message per ticket.

use std::{io, sync::Arc, time::Instant};

use super::TicketCore;
use crate::{counters::TrafficCounters, error::FillResult, message::Message, session::Session};

/// Ticket writing one complete message to a session.
///
/// The ticket owns the outbound [`Message`], keeping its bytes valid and
/// unmodified for the full duration of the write. The outbound counter
/// records the message's total size once per fill, whether or not the
/// write succeeds: it accounts attempted, not delivered, bytes.
pub struct SinkTicket {
    inner: Option<SinkInner>,
}

struct SinkInner {
    core: TicketCore<()>,
    message: Message,
    counters: Arc<TrafficCounters>,
}

impl SinkTicket {
    /// Create a ticket bound to `session` for one pending write of `message`.
    #[must_use]
    pub fn new(
        session: &Arc<dyn Session>,
        message: Message,
        counters: Arc<TrafficCounters>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            inner: Some(SinkInner {
                core: TicketCore::new(session, deadline),
                message,
                counters,
            }),
        }
    }

    /// Begin the write and register the completion callback.
    ///
    /// # Panics
    ///
    /// Panics when invoked a second time on the same ticket.
    pub fn fill<F>(&mut self, sync: bool, on_complete: F)
    where
        F: FnOnce(FillResult) + Send + 'static,
    {
        let mut inner = self
            .inner
            .take()
            .expect("sink ticket supports exactly one fill");
        inner.core.arm(sync, Box::new(on_complete));
        inner.begin();
    }
}

impl SinkInner {
    fn begin(mut self) {
        let Some(session) = self.core.resolve_session() else {
            return;
        };
        let src = self.message.bytes();
        let sync = self.core.is_sync();
        let deadline = self.core.deadline();
        session.write(
            sync,
            src,
            deadline,
            Box::new(move |result| self.sink_continuation(result)),
        );
    }

    fn sink_continuation(mut self, result: io::Result<usize>) {
        self.counters.hit_physical_out(self.message.len() as u64);
        self.core
            .finish_fill(result.map(|_| ()).map_err(Into::into));
    }
}
