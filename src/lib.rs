#![doc(html_root_url = "https://docs.rs/wireticket/latest")]
//! Public API for the `wireticket` library.
//!
//! This crate turns a raw, partial byte stream over a persistent session
//! into discrete, fully buffered protocol messages. A [`SourceTicket`]
//! reads one length-prefixed message through a two-phase header-then-body
//! protocol with in-place buffer growth; a [`SinkTicket`] writes one
//! message. Each ticket completes exactly once, through a single callback,
//! even when the underlying session closes mid-operation.

pub mod counters;
pub mod error;
pub mod header;
pub mod message;
pub mod session;
pub mod ticket;

pub use counters::TrafficCounters;
pub use error::{FillResult, TicketError};
pub use header::{Endianness, HeaderFormat};
pub use message::Message;
pub use session::{Session, SessionId, StreamSession};
pub use ticket::{SinkTicket, SourceTicket};
