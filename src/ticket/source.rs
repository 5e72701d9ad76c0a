//! Read path: one complete framed message per ticket.

use std::{io, sync::Arc, time::Instant};

use bytes::BytesMut;
use tracing::warn;

use super::TicketCore;
use crate::{
    counters::TrafficCounters,
    error::FillResult,
    header::HeaderFormat,
    message::Message,
    session::Session,
};

/// Ticket reading one complete framed message from a session.
///
/// The fill proceeds through `AwaitingHeader → {Complete | AwaitingBody} →
/// {Complete | Failed}`: a first read of exactly the fixed header, length
/// validation, and, when the declared length exceeds the header, a second
/// read for the remaining body bytes appended to the same working buffer.
/// The completed [`Message`] is delivered through the completion callback;
/// no partial message is ever exposed.
pub struct SourceTicket {
    inner: Option<SourceInner>,
}

struct SourceInner {
    core: TicketCore<Message>,
    format: HeaderFormat,
    counters: Arc<TrafficCounters>,
}

impl SourceTicket {
    /// Create a ticket bound to `session` for one pending read.
    #[must_use]
    pub fn new(
        session: &Arc<dyn Session>,
        format: HeaderFormat,
        counters: Arc<TrafficCounters>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            inner: Some(SourceInner {
                core: TicketCore::new(session, deadline),
                format,
                counters,
            }),
        }
    }

    /// Begin the read and register the completion callback.
    ///
    /// Completion is always signaled through `on_complete`, exactly once,
    /// whatever the `sync` flag; the flag only decides whether the session
    /// runs the underlying transfers on the calling context.
    ///
    /// # Panics
    ///
    /// Panics when invoked a second time on the same ticket.
    pub fn fill<F>(&mut self, sync: bool, on_complete: F)
    where
        F: FnOnce(FillResult<Message>) + Send + 'static,
    {
        let mut inner = self
            .inner
            .take()
            .expect("source ticket supports exactly one fill");
        inner.core.arm(sync, Box::new(on_complete));
        inner.begin();
    }
}

impl SourceInner {
    fn begin(mut self) {
        let Some(session) = self.core.resolve_session() else {
            return;
        };
        let header_len = self.format.header_len();
        let buf = BytesMut::with_capacity(header_len);
        let sync = self.core.is_sync();
        let deadline = self.core.deadline();
        session.read(
            sync,
            buf,
            header_len,
            deadline,
            Box::new(move |result, buf| self.header_continuation(result, buf)),
        );
    }

    fn header_continuation(mut self, result: io::Result<usize>, buf: BytesMut) {
        if let Err(error) = result {
            self.core.finish_fill(Err(error.into()));
            return;
        }
        // The session may have closed while the header read was pending.
        let Some(session) = self.core.resolve_session() else {
            return;
        };
        let declared = match self.format.declared_len(&buf) {
            Ok(declared) => declared,
            Err(error) => {
                warn!(session = %self.core.session_id(), %error, "rejecting inbound message");
                self.core.finish_fill(Err(error));
                return;
            }
        };
        if declared == buf.len() {
            // Header-only message: complete with no second read.
            self.complete(buf);
            return;
        }
        // Grow to the declared length in place; the header bytes stay at
        // the front and only the appended tail is read.
        let sync = self.core.is_sync();
        let deadline = self.core.deadline();
        session.read(
            sync,
            buf,
            declared,
            deadline,
            Box::new(move |result, buf| self.body_continuation(result, buf)),
        );
    }

    fn body_continuation(mut self, result: io::Result<usize>, buf: BytesMut) {
        if let Err(error) = result {
            self.core.finish_fill(Err(error.into()));
            return;
        }
        self.complete(buf);
    }

    fn complete(mut self, buf: BytesMut) {
        let mut message = Message::default();
        message.set_data(buf);
        self.counters.hit_physical_in(message.len() as u64);
        self.core.finish_fill(Ok(message));
    }
}
