//! Fixed-length big-endian integers.

/// Fit the big-endian unsigned integer `value` into exactly `bits / 8`
/// (rounded up) bytes.
///
/// Longer input keeps its rightmost bytes, which drops the leading sign byte
/// of a DER or arbitrary-precision encoding. Shorter input is left-padded
/// with zeros.
#[must_use]
pub fn to_fixed_bytes(value: &[u8], bits: usize) -> Vec<u8> {
    let len = bits.div_ceil(8);
    if value.len() >= len {
        return value[value.len() - len..].to_vec();
    }

    let mut fixed = vec![0; len - value.len()];
    fixed.extend_from_slice(value);
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_length_unchanged() {
        assert_eq!(to_fixed_bytes(&[0xab, 0xcd], 16), vec![0xab, 0xcd]);
    }

    #[test]
    fn shorter_is_left_padded() {
        assert_eq!(to_fixed_bytes(&[0xab], 32), vec![0x00, 0x00, 0x00, 0xab]);
        assert_eq!(to_fixed_bytes(&[], 16), vec![0x00, 0x00]);
    }

    #[test]
    fn longer_keeps_rightmost() {
        assert_eq!(to_fixed_bytes(&[0xab, 0xcd, 0xef, 0x12], 16), vec![0xef, 0x12]);

        // sign byte in front of a 32 byte coordinate
        let mut signed = vec![0x00];
        signed.extend_from_slice(&[0x80; 32]);
        assert_eq!(to_fixed_bytes(&signed, 256), vec![0x80; 32]);
    }

    #[test]
    fn odd_bit_length_rounds_up() {
        assert_eq!(to_fixed_bytes(&[0x01], 521).len(), 66);
    }
}
