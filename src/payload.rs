//! Payload framing - the probe's single wire contract
//!
//! A published payload is the decimal sequence number, one separator
//! character, then filler bytes up to the configured event size:
//!
//! ```text
//! <decimal sequence number><' '><'a' ... to event_size bytes>
//! ```
//!
//! The device echoes payloads back unmodified, so the same framing is used
//! to read the sequence number out of received events.

use thiserror::Error;

/// Separator between the sequence header and the filler.
pub const SEPARATOR: u8 = b' ';

/// Filler byte used to pad the payload to the configured size.
pub const FILLER: u8 = b'a';

/// Framing violations in a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("unexpected event size: expected {expected}, got {actual}")]
    Size { expected: usize, actual: usize },

    #[error("no separator in event payload")]
    MissingSeparator,

    #[error("empty sequence header")]
    EmptyHeader,

    #[error("sequence header is not a decimal number")]
    BadNumber,

    #[error("sequence header for {seq} does not fit into {size} bytes")]
    HeaderTooLarge { seq: u64, size: usize },
}

/// Encode a sequence number into a fixed-size payload.
pub fn encode(seq: u64, size: usize) -> Result<Vec<u8>, FrameError> {
    let header = seq.to_string();
    // Header plus separator must fit, filler may be empty
    if header.len() + 1 > size {
        return Err(FrameError::HeaderTooLarge { seq, size });
    }
    let mut buf = Vec::with_capacity(size);
    buf.extend_from_slice(header.as_bytes());
    buf.push(SEPARATOR);
    buf.resize(size, FILLER);
    Ok(buf)
}

/// Decode the sequence number from a received payload.
///
/// The payload must be exactly `expected_size` bytes and must start with a
/// non-empty decimal header terminated by the separator. A separator at
/// position 0 is invalid: the encoded number cannot be empty.
pub fn decode(data: &[u8], expected_size: usize) -> Result<u64, FrameError> {
    if data.len() != expected_size {
        return Err(FrameError::Size {
            expected: expected_size,
            actual: data.len(),
        });
    }

    let pos = data
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or(FrameError::MissingSeparator)?;
    if pos == 0 {
        return Err(FrameError::EmptyHeader);
    }

    let header = &data[..pos];
    if !header.iter().all(|b| b.is_ascii_digit()) {
        return Err(FrameError::BadNumber);
    }

    // Digits only, so UTF-8 conversion cannot fail; parse can still overflow
    std::str::from_utf8(header)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(FrameError::BadNumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_first_event_full_size() {
        // seq=1 at 1024 bytes: "1 " followed by 1022 filler bytes
        let data = encode(1, 1024).unwrap();
        assert_eq!(data.len(), 1024);
        assert_eq!(&data[..2], b"1 ");
        assert!(data[2..].iter().all(|&b| b == FILLER));
    }

    #[test]
    fn test_encode_multi_digit() {
        let data = encode(200, 16).unwrap();
        assert_eq!(&data[..4], b"200 ");
        assert_eq!(data.len(), 16);
    }

    #[test]
    fn test_encode_header_must_fit() {
        // "100" + separator needs 4 bytes
        assert_eq!(
            encode(100, 3),
            Err(FrameError::HeaderTooLarge { seq: 100, size: 3 })
        );
        assert!(encode(100, 4).is_ok());
    }

    #[test]
    fn test_decode_roundtrip() {
        for seq in [1u64, 9, 10, 199, 200] {
            let data = encode(seq, 64).unwrap();
            assert_eq!(decode(&data, 64), Ok(seq));
        }
    }

    #[test]
    fn test_decode_wrong_size() {
        let data = encode(7, 1024).unwrap();
        assert_eq!(
            decode(&data[..1023], 1024),
            Err(FrameError::Size {
                expected: 1024,
                actual: 1023
            })
        );
    }

    #[test]
    fn test_decode_missing_separator() {
        let data = vec![FILLER; 32];
        assert_eq!(decode(&data, 32), Err(FrameError::MissingSeparator));
    }

    #[test]
    fn test_decode_separator_first() {
        let mut data = vec![FILLER; 32];
        data[0] = SEPARATOR;
        assert_eq!(decode(&data, 32), Err(FrameError::EmptyHeader));
    }

    #[test]
    fn test_decode_non_numeric_header() {
        let mut data = encode(5, 32).unwrap();
        data[0] = b'x';
        assert_eq!(decode(&data, 32), Err(FrameError::BadNumber));
    }

    #[test]
    fn test_decode_overflowing_header() {
        // 20 nines overflow u64
        let mut data = vec![b'9'; 32];
        data[20] = SEPARATOR;
        assert_eq!(decode(&data, 32), Err(FrameError::BadNumber));
    }
}
