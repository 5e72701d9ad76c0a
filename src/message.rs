//! Container for one framed protocol message.
//!
//! A [`Message`] owns a contiguous byte buffer in wire layout
//! `[header][body]`. Source tickets construct one only at a fully validated
//! completion point, so a partially received message is never observable.

use bytes::{Bytes, BytesMut};

/// One framed protocol unit as a contiguous byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message {
    data: Bytes,
}

impl Message {
    /// Wrap an already framed byte buffer.
    #[must_use]
    pub fn from_bytes(data: Bytes) -> Self { Self { data } }

    /// Adopt ownership of a fully read working buffer.
    pub fn set_data(&mut self, buffer: BytesMut) { self.data = buffer.freeze(); }

    /// Total message size in bytes, header included.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the message holds no bytes yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Raw wire bytes of the message.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data }

    /// Cheap owning handle to the wire bytes for an outbound write.
    ///
    /// The returned [`Bytes`] shares storage with the message, so the
    /// content stays valid and unmodified for the duration of the write.
    #[must_use]
    pub fn bytes(&self) -> Bytes { self.data.clone() }
}

impl From<BytesMut> for Message {
    fn from(buffer: BytesMut) -> Self { Self { data: buffer.freeze() } }
}
