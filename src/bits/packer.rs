//! Byte <-> bit conversion.

use super::BitString;

/// Converts bytes to their big-endian bit representation.
///
/// Each byte contributes exactly eight bits, most significant first,
/// concatenated in input order. Total and infallible.
pub fn pack(bytes: &[u8]) -> BitString {
    let mut bits = BitString::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits
}

/// Result of grouping bits back into bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unpacked {
    /// Whole bytes recovered, in order.
    pub bytes: Vec<u8>,
    /// Trailing bits that did not fill a byte and were dropped.
    pub dropped_bits: usize,
}

/// Groups bits into bytes, most significant bit first.
///
/// A trailing incomplete group is dropped and reported through
/// [`Unpacked::dropped_bits`]; this is not an error.
pub fn unpack(bits: &BitString) -> Unpacked {
    let chunks = bits.as_slice().chunks_exact(8);
    let dropped_bits = chunks.remainder().len();

    let bytes = chunks
        .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8))
        .collect();

    if dropped_bits > 0 {
        tracing::warn!(
            bits = bits.len(),
            dropped = dropped_bits,
            "Bit length is not a multiple of 8, dropping trailing bits"
        );
    }

    Unpacked {
        bytes,
        dropped_bits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_hi() {
        assert_eq!(pack(b"Hi").to_string(), "0100100001101001");
    }

    #[test]
    fn test_pack_empty() {
        assert!(pack(&[]).is_empty());
    }

    #[test]
    fn test_pack_extremes() {
        assert_eq!(pack(&[0x00, 0xFF]).to_string(), "0000000011111111");
    }

    #[test]
    fn test_unpack_whole_bytes() {
        let bits: BitString = "0100100001101001".parse().unwrap();
        let unpacked = unpack(&bits);
        assert_eq!(unpacked.bytes, b"Hi");
        assert_eq!(unpacked.dropped_bits, 0);
    }

    #[test]
    fn test_unpack_drops_trailing_bits() {
        let bits: BitString = "0100100001101".parse().unwrap();
        let unpacked = unpack(&bits);
        assert_eq!(unpacked.bytes, b"H");
        assert_eq!(unpacked.dropped_bits, 5);
    }

    #[test]
    fn test_unpack_short_input_yields_nothing() {
        let bits: BitString = "1111111".parse().unwrap();
        let unpacked = unpack(&bits);
        assert!(unpacked.bytes.is_empty());
        assert_eq!(unpacked.dropped_bits, 7);
    }
}
