//! Session capability surface consumed by tickets.
//!
//! A [`Session`] abstracts a live byte-stream connection: liveness, an
//! identifier, and exact-length read/write primitives that report back
//! through single-fire callbacks. Tickets hold only a [`Weak`] reference
//! and resolve it before every use, so a session torn down mid-operation
//! surfaces as a closed-session status rather than a dangling handle.

pub mod stream;

use std::{sync::Arc, time::Instant};

use bytes::{Bytes, BytesMut};

pub use stream::StreamSession;

/// Identifier assigned to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl From<u64> for SessionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl SessionId {
    /// Create a new [`SessionId`] with the provided value.
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

/// Completion callback for a session read.
///
/// Receives the number of bytes transferred by this operation and the
/// working buffer back, with any newly read bytes appended after the
/// previously held prefix.
pub type ReadCallback = Box<dyn FnOnce(std::io::Result<usize>, BytesMut) + Send + 'static>;

/// Completion callback for a session write, receiving the bytes written.
pub type WriteCallback = Box<dyn FnOnce(std::io::Result<usize>) + Send + 'static>;

/// A live byte-stream connection offering async read/write and liveness.
///
/// Implementations must invoke each operation's callback exactly once.
/// When `sync` is true the transfer runs to completion on the calling
/// context before the call returns; when false it may complete on an
/// arbitrary worker context. Both paths deliver the result through the
/// identical callback interface. An operation still pending at `deadline`
/// is abandoned and reported as an ordinary transport error.
pub trait Session: Send + Sync {
    /// Identifier of this session.
    fn id(&self) -> SessionId;

    /// Whether the session is still open for transfers.
    fn is_open(&self) -> bool;

    /// Append bytes to `buf` until it holds exactly `target_len` bytes,
    /// then invoke `on_complete`.
    ///
    /// Bytes already in `buf` stay untouched at the front; only the tail up
    /// to `target_len` is written.
    fn read(
        self: Arc<Self>,
        sync: bool,
        buf: BytesMut,
        target_len: usize,
        deadline: Option<Instant>,
        on_complete: ReadCallback,
    );

    /// Write all of `src`, then invoke `on_complete`.
    fn write(
        self: Arc<Self>,
        sync: bool,
        src: Bytes,
        deadline: Option<Instant>,
        on_complete: WriteCallback,
    );
}
