//! Wire header format and validation.
//!
//! Every message begins with a fixed-size header whose first field is a
//! four-byte total-length value covering header and body together. The
//! header is read in full before any body byte, so the declared length is
//! the single input deciding whether a second read is required.

use bytes::{BufMut, BytesMut};

use crate::error::TicketError;

/// Default fixed header length in bytes.
pub const DEFAULT_HEADER_LEN: usize = 16;
/// Default maximum permitted total message size in bytes.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 48_000_000;

/// Byte order of the leading total-length field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Shape of the fixed message header.
///
/// Carries the header byte length, the byte order of the length field, and
/// the maximum total message size a peer may declare.
#[derive(Clone, Copy, Debug)]
pub struct HeaderFormat {
    header_len: usize,
    endianness: Endianness,
    max_message_len: usize,
}

impl HeaderFormat {
    /// Width of the total-length field at the start of the header.
    pub const LENGTH_FIELD: usize = 4;

    /// Create a new [`HeaderFormat`].
    ///
    /// # Panics
    ///
    /// Panics if `header_len` cannot hold the length field or exceeds
    /// `max_message_len`.
    #[must_use]
    pub fn new(header_len: usize, endianness: Endianness, max_message_len: usize) -> Self {
        assert!(header_len >= Self::LENGTH_FIELD, "header too short for length field");
        assert!(header_len <= max_message_len, "header longer than maximum message");
        Self {
            header_len,
            endianness,
            max_message_len,
        }
    }

    /// Fixed header length in bytes.
    #[must_use]
    pub const fn header_len(&self) -> usize { self.header_len }

    /// Maximum permitted total message size in bytes.
    #[must_use]
    pub const fn max_message_len(&self) -> usize { self.max_message_len }

    /// Parse and validate the declared total message length.
    ///
    /// `header` must hold at least the full fixed header. A declared length
    /// below the header size or above the configured maximum is a protocol
    /// fault, never a short read to retry.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Protocol`] when the declared length falls
    /// outside `[header_len, max_message_len]`.
    pub fn declared_len(&self, header: &[u8]) -> Result<usize, TicketError> {
        debug_assert!(header.len() >= self.header_len, "header read was short");
        let raw = [header[0], header[1], header[2], header[3]];
        let declared = match self.endianness {
            Endianness::Big => u32::from_be_bytes(raw),
            Endianness::Little => u32::from_le_bytes(raw),
        } as usize;
        if declared < self.header_len || declared > self.max_message_len {
            return Err(TicketError::Protocol(format!(
                "declared message length {declared} is invalid; min {} max {}",
                self.header_len, self.max_message_len,
            )));
        }
        Ok(declared)
    }

    /// Encode a total-length field at the tail of `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `total_len` does not fit the four-byte length field.
    pub fn write_len(&self, total_len: usize, dst: &mut BytesMut) {
        let value = u32::try_from(total_len).expect("total length exceeds the length field");
        match self.endianness {
            Endianness::Big => dst.put_u32(value),
            Endianness::Little => dst.put_u32_le(value),
        }
    }
}

impl Default for HeaderFormat {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_LEN, Endianness::Little, DEFAULT_MAX_MESSAGE_LEN)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn header_bytes(format: &HeaderFormat, total_len: usize) -> BytesMut {
        let mut buf = BytesMut::with_capacity(format.header_len());
        format.write_len(total_len, &mut buf);
        buf.resize(format.header_len(), 0);
        buf
    }

    #[rstest]
    #[case::header_only(16)]
    #[case::small_body(36)]
    #[case::maximum(DEFAULT_MAX_MESSAGE_LEN)]
    fn accepts_lengths_within_range(#[case] total_len: usize) {
        let format = HeaderFormat::default();
        let header = header_bytes(&format, total_len);
        assert_eq!(format.declared_len(&header).expect("valid length"), total_len);
    }

    #[rstest]
    #[case::zero(0)]
    #[case::below_header(15)]
    #[case::above_max(DEFAULT_MAX_MESSAGE_LEN + 1)]
    fn rejects_lengths_outside_range(#[case] total_len: usize) {
        let format = HeaderFormat::default();
        let header = header_bytes(&format, total_len);
        let err = format.declared_len(&header).expect_err("invalid length");
        assert!(err.is_protocol(), "expected protocol fault, got {err}");
    }

    #[rstest]
    #[should_panic(expected = "exceeds the length field")]
    fn write_len_rejects_lengths_beyond_the_field() {
        let format = HeaderFormat::default();
        let mut buf = BytesMut::new();
        format.write_len(u64::from(u32::MAX) as usize + 1, &mut buf);
    }

    #[rstest]
    fn big_endian_length_field_round_trips() {
        let format = HeaderFormat::new(8, Endianness::Big, 1024);
        let header = header_bytes(&format, 640);
        assert_eq!(format.declared_len(&header).expect("valid length"), 640);
    }

    proptest! {
        #[test]
        fn declared_len_matches_encoded_len(total in DEFAULT_HEADER_LEN..=DEFAULT_MAX_MESSAGE_LEN) {
            let format = HeaderFormat::default();
            let header = header_bytes(&format, total);
            prop_assert_eq!(format.declared_len(&header).unwrap(), total);
        }
    }
}
