//! RLP encoding for the legacy-transaction wire format.
//!
//! Only the subset a nine-field legacy transaction needs is implemented:
//! byte-string fields, and a single outer list. The outer list is produced
//! without materializing a nested structure: fields are encoded forward into
//! a pre-sized buffer whose first [`LIST_HEADER_RESERVE`] bytes are kept
//! free, and the list header is then written backward immediately before the
//! payload.

use codec_utils::{u32_to_be, TrimMode, REASONABLE_MAX_LEN};

use crate::error::RlpError;

/// Slack reserved at the head of the buffer for the outer list header.
///
/// An RLP header is at most 1 prefix byte plus 8 big-endian length bytes.
pub const LIST_HEADER_RESERVE: usize = 9;

const STR_BASE: u8 = 0x80;
const LIST_BASE: u8 = 0xc0;

/// An index-based RLP encoder over one owning buffer.
///
/// The buffer is allocated once from a size estimate; encoding never grows
/// it. A forward cursor (`end`) tracks appended fields, a backward cursor
/// (`start`) tracks the outer list header. [`mark`](Self::mark) and
/// [`rewind`](Self::rewind) let a second signing pass overwrite the trailing
/// `v`, `r`, `s` fields in place.
pub struct RlpEncoder {
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl RlpEncoder {
    /// Allocates an encoder able to hold `payload_estimate` bytes of encoded
    /// fields plus the outer list header.
    pub fn with_capacity(payload_estimate: usize) -> Result<Self, RlpError> {
        if payload_estimate > REASONABLE_MAX_LEN {
            return Err(RlpError::LengthExceedsMax(payload_estimate));
        }
        Ok(Self {
            buf: vec![0u8; LIST_HEADER_RESERVE + payload_estimate],
            start: LIST_HEADER_RESERVE,
            end: LIST_HEADER_RESERVE,
        })
    }

    /// Encodes one byte-string field in content mode:
    ///
    /// - a single byte ≤ 0x7F is the encoding itself
    /// - up to 55 bytes: `0x80 + len` then the field
    /// - longer: `0xB7 + len-of-len`, the big-endian length, then the field
    pub fn append(&mut self, field: &[u8]) -> Result<(), RlpError> {
        if field.len() > REASONABLE_MAX_LEN {
            return Err(RlpError::LengthExceedsMax(field.len()));
        }

        if field.len() == 1 && field[0] <= 0x7f {
            self.put(field)
        } else if field.len() <= 55 {
            self.put(&[STR_BASE + field.len() as u8])?;
            self.put(field)
        } else {
            let len_be = u32_to_be(field.len() as u32, TrimMode::LeftTrim);
            self.put(&[STR_BASE + 55 + len_be.len() as u8])?;
            self.put(&len_be)?;
            self.put(field)
        }
    }

    /// Returns the current forward cursor, for a later [`rewind`](Self::rewind).
    pub fn mark(&self) -> usize {
        self.end
    }

    /// Moves the forward cursor back to a previous [`mark`](Self::mark) and
    /// forgets any outer list header, so the fields from the mark on can be
    /// re-encoded and the list re-wrapped.
    pub fn rewind(&mut self, mark: usize) {
        debug_assert!(mark >= LIST_HEADER_RESERVE && mark <= self.end);
        self.end = mark;
        self.start = LIST_HEADER_RESERVE;
    }

    /// Prefix-header mode: writes the outer list header backward into the
    /// reserved slack, immediately before the encoded payload.
    pub fn wrap_list(&mut self) -> Result<(), RlpError> {
        let payload_len = self.end - LIST_HEADER_RESERVE;
        if payload_len > REASONABLE_MAX_LEN {
            return Err(RlpError::LengthExceedsMax(payload_len));
        }

        let mut pos = LIST_HEADER_RESERVE;
        if payload_len <= 55 {
            pos -= 1;
            self.buf[pos] = LIST_BASE + payload_len as u8;
        } else {
            let len_be = u32_to_be(payload_len as u32, TrimMode::LeftTrim);
            pos -= len_be.len();
            self.buf[pos..LIST_HEADER_RESERVE].copy_from_slice(&len_be);
            pos -= 1;
            self.buf[pos] = LIST_BASE + 55 + len_be.len() as u8;
        }
        self.start = pos;
        Ok(())
    }

    /// The encoded stream: outer header (once wrapped) followed by the
    /// payload.
    pub fn as_encoded(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Consumes the encoder, returning the encoded stream.
    pub fn into_encoded(mut self) -> Vec<u8> {
        self.buf.truncate(self.end);
        self.buf.drain(..self.start);
        self.buf
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), RlpError> {
        let available = self.buf.len() - self.end;
        if bytes.len() > available {
            return Err(RlpError::BufferTooSmall {
                needed: bytes.len(),
                available,
            });
        }
        self.buf[self.end..self.end + bytes.len()].copy_from_slice(bytes);
        self.end += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_one(field: &[u8]) -> Vec<u8> {
        let mut enc = RlpEncoder::with_capacity(field.len() + 9).unwrap();
        enc.append(field).unwrap();
        enc.into_encoded()
    }

    #[test]
    fn single_low_byte_is_itself() {
        assert_eq!(encode_one(&[0x00]), vec![0x00]);
        assert_eq!(encode_one(&[0x7f]), vec![0x7f]);
    }

    #[test]
    fn single_high_byte_gets_a_header() {
        assert_eq!(encode_one(&[0x80]), vec![0x81, 0x80]);
        assert_eq!(encode_one(&[0xff]), vec![0x81, 0xff]);
    }

    #[test]
    fn empty_string_is_0x80() {
        assert_eq!(encode_one(&[]), vec![0x80]);
    }

    #[test]
    fn short_string_header_is_base_plus_len() {
        for len in [2usize, 20, 55] {
            let field = vec![0xaa; len];
            let encoded = encode_one(&field);
            assert_eq!(encoded.len(), 1 + len);
            assert_eq!(encoded[0], 0x80 + len as u8);
            assert_eq!(&encoded[1..], &field[..]);
        }
    }

    #[test]
    fn long_string_carries_length_bytes() {
        let field = vec![0xbb; 56];
        let encoded = encode_one(&field);
        assert_eq!(encoded[0], 0xb7 + 1);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], &field[..]);

        let field = vec![0xcc; 300];
        let encoded = encode_one(&field);
        assert_eq!(encoded[0], 0xb7 + 2);
        assert_eq!(&encoded[1..3], &[0x01, 0x2c]);
        assert_eq!(&encoded[3..], &field[..]);
    }

    #[test]
    fn oversized_field_is_rejected() {
        let mut enc = RlpEncoder::with_capacity(100).unwrap();
        let huge = vec![0u8; REASONABLE_MAX_LEN + 1];
        assert!(matches!(
            enc.append(&huge),
            Err(RlpError::LengthExceedsMax(_))
        ));
    }

    #[test]
    fn oversized_estimate_is_rejected() {
        assert!(RlpEncoder::with_capacity(REASONABLE_MAX_LEN + 1).is_err());
    }

    #[test]
    fn buffer_exhaustion_is_an_error() {
        let mut enc = RlpEncoder::with_capacity(4).unwrap();
        let result = enc.append(&[0xaa; 32]);
        assert!(matches!(result, Err(RlpError::BufferTooSmall { .. })));
    }

    #[test]
    fn empty_list_is_0xc0() {
        let mut enc = RlpEncoder::with_capacity(0).unwrap();
        enc.wrap_list().unwrap();
        assert_eq!(enc.as_encoded(), &[0xc0]);
    }

    #[test]
    fn list_of_empty_string_is_0xc1_0x80() {
        let mut enc = RlpEncoder::with_capacity(9).unwrap();
        enc.append(&[]).unwrap();
        enc.wrap_list().unwrap();
        assert_eq!(enc.as_encoded(), &[0xc1, 0x80]);
    }

    #[test]
    fn long_list_header_is_written_backward() {
        let mut enc = RlpEncoder::with_capacity(200).unwrap();
        enc.append(&vec![0xdd; 100]).unwrap();
        enc.append(&vec![0xee; 60]).unwrap();
        enc.wrap_list().unwrap();

        let encoded = enc.as_encoded();
        // 100-byte field: 2-byte header; 60-byte field: 2-byte header.
        let payload_len = 102 + 62;
        assert_eq!(encoded[0], 0xf7 + 1);
        assert_eq!(encoded[1], payload_len as u8);
        assert_eq!(encoded.len(), 2 + payload_len);
    }

    #[test]
    fn rewind_replays_trailing_fields() {
        let mut enc = RlpEncoder::with_capacity(64).unwrap();
        enc.append(&[0x01]).unwrap();
        let mark = enc.mark();
        enc.append(&[0x02]).unwrap();
        enc.wrap_list().unwrap();
        let first = enc.as_encoded().to_vec();
        assert_eq!(first, vec![0xc2, 0x01, 0x02]);

        enc.rewind(mark);
        enc.append(&[0x7a, 0x7b]).unwrap();
        enc.wrap_list().unwrap();
        assert_eq!(enc.as_encoded(), &[0xc4, 0x01, 0x82, 0x7a, 0x7b]);
    }

    #[test]
    fn into_encoded_matches_as_encoded() {
        let mut enc = RlpEncoder::with_capacity(16).unwrap();
        enc.append(&[0x0a]).unwrap();
        enc.append(&[0x0b]).unwrap();
        enc.wrap_list().unwrap();
        let view = enc.as_encoded().to_vec();
        assert_eq!(enc.into_encoded(), view);
    }
}
