//! Fixed-width record encoding for prime files.
//!
//! Each prime is stored as an unsigned LEB128 varint (seven payload bits per
//! byte, least significant group first, high bit set on every byte except the
//! last) and zero-padded to occupy exactly [`RECORD_SIZE`] bytes. Readers treat
//! a prime file as a flat array of such slots and decode them independently.
//!
//! Eight varint bytes carry 56 payload bits, so the largest encodable value is
//! [`MAX_RECORD_VALUE`].

use crate::{Error, Result};

/// Size in bytes of a single on-disk record.
pub const RECORD_SIZE: usize = 8;

/// Largest value whose varint encoding fits in one record.
pub const MAX_RECORD_VALUE: u64 = (1 << (7 * RECORD_SIZE)) - 1;

const PAYLOAD_MASK: u8 = 0x7f;
const CONTINUATION: u8 = 0x80;

/// Encodes `value` into a zero-padded record.
///
/// # Errors
///
/// Returns [`Error::RecordOverflow`] if `value` exceeds [`MAX_RECORD_VALUE`].
///
/// # Example
///
/// ```
/// use ferrofactor::codec::{decode, encode};
///
/// let record = encode(300).unwrap();
/// assert_eq!(record, [0xac, 0x02, 0, 0, 0, 0, 0, 0]);
/// assert_eq!(decode(&record).unwrap(), 300);
/// ```
pub fn encode(value: u64) -> Result<[u8; RECORD_SIZE]> {
    if value > MAX_RECORD_VALUE {
        return Err(Error::RecordOverflow { value });
    }

    let mut record = [0_u8; RECORD_SIZE];
    let mut rest = value;
    for slot in &mut record {
        let byte = (rest as u8) & PAYLOAD_MASK;
        rest >>= 7;
        if rest == 0 {
            *slot = byte;
            break;
        }
        *slot = byte | CONTINUATION;
    }
    Ok(record)
}

/// Decodes one record.
///
/// Bytes after the terminating varint byte are padding and ignored.
///
/// # Errors
///
/// - [`Error::TruncatedRecord`] if `record` is not exactly [`RECORD_SIZE`]
///   bytes long.
/// - [`Error::MalformedRecord`] if no terminating byte appears in the slot.
pub fn decode(record: &[u8]) -> Result<u64> {
    if record.len() != RECORD_SIZE {
        return Err(Error::TruncatedRecord { len: record.len() });
    }

    let mut value = 0_u64;
    for (i, byte) in record.iter().enumerate() {
        value |= u64::from(byte & PAYLOAD_MASK) << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(Error::MalformedRecord {
        reason: "varint is not terminated within the record",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_use_one_byte() {
        assert_eq!(encode(0).unwrap(), [0; RECORD_SIZE]);
        assert_eq!(encode(2).unwrap(), [2, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode(127).unwrap(), [127, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(encode(128).unwrap(), [0x80, 0x01, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn largest_value_fills_the_record() {
        let record = encode(MAX_RECORD_VALUE).unwrap();
        assert_eq!(record[..7], [0xff; 7]);
        assert_eq!(record[7], 0x7f);
        assert_eq!(decode(&record).unwrap(), MAX_RECORD_VALUE);
    }

    #[test]
    fn overflow_is_rejected() {
        let err = encode(MAX_RECORD_VALUE + 1).unwrap_err();
        assert!(matches!(err, Error::RecordOverflow { value } if value == 1 << 56));
        assert!(encode(u64::MAX).is_err());
    }

    #[test]
    fn decode_checks_length() {
        assert!(matches!(
            decode(&[2, 0, 0]),
            Err(Error::TruncatedRecord { len: 3 })
        ));
        assert!(matches!(
            decode(&[0; 9]),
            Err(Error::TruncatedRecord { len: 9 })
        ));
    }

    #[test]
    fn decode_rejects_unterminated_varint() {
        assert!(matches!(
            decode(&[0x80; RECORD_SIZE]),
            Err(Error::MalformedRecord { .. })
        ));
    }

    #[test]
    fn decode_ignores_padding() {
        assert_eq!(decode(&[0x05, 0xaa, 0xbb, 0, 0, 0, 0, 0]).unwrap(), 5);
    }

    #[test]
    fn matches_known_encodings() {
        // 65537 = 0b100_0000000_0000001
        assert_eq!(encode(65_537).unwrap(), [0x81, 0x80, 0x04, 0, 0, 0, 0, 0]);
        assert_eq!(decode(&[0x81, 0x80, 0x04, 0, 0, 0, 0, 0]).unwrap(), 65_537);
    }
}
