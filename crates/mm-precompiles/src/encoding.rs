//! Fixed-width integer packing and call-result encoding shared by the handlers.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolValue;

/// Size of one ABI word.
pub const WORD_SIZE: usize = 32;

/// Places `value` as 8 little-endian bytes at the start of a zeroed 32-byte word.
///
/// This is the wire form of the gas limit and gas used results, and of the
/// uncle index argument.
pub fn le_u64_word(value: u64) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[..8].copy_from_slice(&value.to_le_bytes());
    word
}

/// Reads a little-endian `u64` from the first 8 bytes of `bytes`.
pub fn read_le_u64(bytes: &[u8]) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}

/// Reads a little-endian `i64` from the first 8 bytes of `bytes`.
pub fn read_le_i64(bytes: &[u8]) -> Option<i64> {
    let raw: [u8; 8] = bytes.get(..8)?.try_into().ok()?;
    Some(i64::from_le_bytes(raw))
}

/// Minimal big-endian representation of `value`; zero encodes as no bytes.
pub fn trimmed_be_bytes(value: U256) -> Vec<u8> {
    let bytes = value.to_be_bytes::<32>();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

/// ABI-encodes `data` as a single `bytes` return value.
///
/// `string` shares the same wire layout, so string-typed results go through
/// here too and keep their raw bytes.
pub fn encode_bytes(data: &[u8]) -> Bytes {
    Bytes::copy_from_slice(data).abi_encode().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    #[test]
    fn le_word_keeps_value_in_low_bytes() {
        let word = le_u64_word(0x0102_0304_0506_0708);
        assert_eq!(&word[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
        assert!(word[8..].iter().all(|b| *b == 0));
        assert_eq!(read_le_u64(&word), Some(0x0102_0304_0506_0708));
    }

    #[test]
    fn short_reads_are_rejected() {
        assert_eq!(read_le_u64(&[1, 2, 3]), None);
        assert_eq!(read_le_i64(&[]), None);
    }

    #[test]
    fn signed_read_sees_high_bit() {
        assert_eq!(read_le_i64(&u64::MAX.to_le_bytes()), Some(-1));
    }

    #[test]
    fn trims_leading_zeros() {
        assert!(trimmed_be_bytes(U256::ZERO).is_empty());
        assert_eq!(trimmed_be_bytes(U256::from(0x0100u64)), vec![0x01, 0x00]);
    }

    #[test]
    fn bytes_result_has_offset_length_and_padding() {
        let encoded = encode_bytes(&[0xaa, 0xbb]);
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000002"
            "aabb000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(encoded.as_ref(), expected.as_slice());
    }
}
