//! Packed binary-coded-decimal conversion.
//!
//! Omron controllers report clock and cycle-time fields as packed BCD: each byte
//! holds two decimal digits, tens in the high nibble and units in the low nibble.
//! Multi-byte values are stored least-significant digit pair first.
//!
//! Nibbles above 9 are not rejected. They decode as `10 * high + low`, so `0xFF`
//! decodes to 165. Controller firmware never emits such bytes and the decoder
//! accepts them rather than failing on field data.
//!
//! # Example
//!
//! ```
//! use omron_fins_channel::bcd;
//!
//! assert_eq!(bcd::decode(&[0x34, 0x12]).unwrap(), 1234);
//! assert_eq!(bcd::encode(1234, 2), vec![0x34, 0x12]);
//! ```

use thiserror::Error;

/// Maximum number of bytes accepted by [`decode`].
pub const MAX_DECODE_LENGTH: usize = 4;

/// Errors raised by the BCD codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BcdError {
    /// The input length was zero or longer than [`MAX_DECODE_LENGTH`].
    #[error("BCD byte length must be between 1 and {MAX_DECODE_LENGTH}, got {length}")]
    Range {
        /// Length of the rejected input.
        length: usize,
    },
}

/// Decodes a little-endian packed BCD sequence of 1 to 4 bytes.
///
/// # Errors
///
/// Returns [`BcdError::Range`] for empty inputs or inputs longer than 4 bytes.
///
/// # Example
///
/// ```
/// use omron_fins_channel::bcd;
///
/// assert_eq!(bcd::decode(&[0x99]).unwrap(), 99);
/// assert_eq!(bcd::decode(&[0x78, 0x56, 0x34, 0x12]).unwrap(), 12_345_678);
/// assert!(bcd::decode(&[]).is_err());
/// ```
pub fn decode(bytes: &[u8]) -> Result<u32, BcdError> {
    if bytes.is_empty() || bytes.len() > MAX_DECODE_LENGTH {
        return Err(BcdError::Range {
            length: bytes.len(),
        });
    }

    Ok(bytes.iter().rev().fold(0u32, |value, &byte| {
        value * 100 + 10 * u32::from(byte >> 4) + u32::from(byte & 0x0F)
    }))
}

/// Encodes `value` as `byte_length` bytes of little-endian packed BCD.
///
/// Digits that do not fit in `byte_length` bytes are dropped.
///
/// # Example
///
/// ```
/// use omron_fins_channel::bcd;
///
/// assert_eq!(bcd::encode(59, 1), vec![0x59]);
/// assert_eq!(bcd::encode(123_456, 2), vec![0x56, 0x34]);
/// ```
pub fn encode(value: u64, byte_length: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; byte_length];
    let mut remaining = value;

    for byte in bytes.iter_mut() {
        let low = remaining % 10;
        let high = (remaining % 100) / 10;
        *byte = ((high as u8) << 4) | low as u8;

        if remaining == 0 {
            break;
        }
        remaining /= 100;
    }

    bytes
}

/// Decodes a single BCD byte.
#[inline]
pub fn decode_byte(byte: u8) -> u8 {
    10 * (byte >> 4) + (byte & 0x0F)
}

/// Encodes a value below 100 as a single BCD byte.
#[inline]
pub fn encode_byte(value: u8) -> u8 {
    (((value % 100) / 10) << 4) | (value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_single_byte() {
        assert_eq!(decode(&[0x00]).unwrap(), 0);
        assert_eq!(decode(&[0x42]).unwrap(), 42);
        assert_eq!(decode(&[0x99]).unwrap(), 99);
    }

    #[test]
    fn test_decode_little_endian_pairs() {
        assert_eq!(decode(&[0x01, 0x00]).unwrap(), 1);
        assert_eq!(decode(&[0x00, 0x01]).unwrap(), 100);
        assert_eq!(decode(&[0x21, 0x43, 0x65, 0x87]).unwrap(), 87_654_321);
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        assert_eq!(decode(&[]), Err(BcdError::Range { length: 0 }));
        assert_eq!(
            decode(&[0x01, 0x02, 0x03, 0x04, 0x05]),
            Err(BcdError::Range { length: 5 })
        );
    }

    #[test]
    fn test_decode_keeps_hex_nibbles() {
        assert_eq!(decode(&[0x0A]).unwrap(), 10);
        assert_eq!(decode(&[0xFF]).unwrap(), 165);
        assert_eq!(decode(&[0xFF, 0xFF]).unwrap(), 16_665);
    }

    #[test]
    fn test_encode_truncates_silently() {
        assert_eq!(encode(12_345, 1), vec![0x45]);
        assert_eq!(encode(99_999_999_99, 4), vec![0x99, 0x99, 0x99, 0x99]);
    }

    #[test]
    fn test_encode_zero_and_padding() {
        assert_eq!(encode(0, 3), vec![0x00, 0x00, 0x00]);
        assert_eq!(encode(7, 2), vec![0x07, 0x00]);
        assert!(encode(7, 0).is_empty());
    }

    #[test]
    fn test_single_byte_helpers() {
        assert_eq!(encode_byte(31), 0x31);
        assert_eq!(decode_byte(0x31), 31);
        assert_eq!(encode_byte(0), 0x00);
    }

    #[test]
    fn test_error_display() {
        let err = BcdError::Range { length: 0 };
        assert_eq!(
            err.to_string(),
            "BCD byte length must be between 1 and 4, got 0"
        );
    }

    proptest! {
        #[test]
        fn roundtrip_for_representable_values(length in 1usize..=4, seed in any::<u32>()) {
            let limit = 100u64.pow(length as u32);
            let value = u64::from(seed) % limit;
            let decoded = decode(&encode(value, length)).unwrap();
            prop_assert_eq!(u64::from(decoded), value);
        }
    }
}
