//! Difficulty predicate: spec §9, Open Question 3.
//!
//! `original_source/itsuku.py` treats `d` inconsistently — sometimes a
//! trailing-zero-bit count, sometimes implied as a byte threshold. spec.md
//! standardizes on trailing-zero bits but requires the proof envelope
//! (§6) to carry whichever form the caller used and have the verifier
//! apply the matching predicate. [`Difficulty`] is that typed union.

use crate::primitives::trailing_zero_bits;

/// The two difficulty representations the proof envelope may carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Difficulty {
    /// Required trailing zero bits of `Ω` (spec.md's standardized form).
    Bits(u32),
    /// A big-endian byte threshold: `Ω`, read as a big-endian unsigned
    /// integer, must be `<=` this threshold.
    ByteThreshold(Vec<u8>),
}

impl Difficulty {
    /// Does `omega` satisfy this difficulty?
    pub fn is_met(&self, omega: &[u8]) -> bool {
        match self {
            Difficulty::Bits(d) => trailing_zero_bits(omega, *d),
            Difficulty::ByteThreshold(threshold) => le_as_big_endian(omega, threshold),
        }
    }
}

/// Compare two equal-or-different-length big-endian byte strings as
/// unsigned integers: `a <= b`.
fn le_as_big_endian(a: &[u8], b: &[u8]) -> bool {
    // Strip leading zero bytes so differing lengths don't bias the
    // lexicographic comparison.
    let a_trimmed = strip_leading_zeros(a);
    let b_trimmed = strip_leading_zeros(b);
    if a_trimmed.len() != b_trimmed.len() {
        return a_trimmed.len() < b_trimmed.len();
    }
    a_trimmed <= b_trimmed
}

fn strip_leading_zeros(x: &[u8]) -> &[u8] {
    let first_nonzero = x.iter().position(|&b| b != 0).unwrap_or(x.len());
    &x[first_nonzero..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_zero_always_met() {
        assert!(Difficulty::Bits(0).is_met(&[0xFF, 0xFF]));
    }

    #[test]
    fn bits_matches_trailing_zero_bits() {
        assert!(Difficulty::Bits(3).is_met(&[0b1000]));
        assert!(!Difficulty::Bits(4).is_met(&[0b1000]));
    }

    #[test]
    fn byte_threshold_accepts_smaller_value() {
        let threshold = vec![0x00, 0x0F];
        assert!(Difficulty::ByteThreshold(threshold.clone()).is_met(&[0x00, 0x05]));
        assert!(!Difficulty::ByteThreshold(threshold).is_met(&[0x01, 0x00]));
    }

    #[test]
    fn byte_threshold_equal_is_met() {
        let threshold = vec![0x00, 0x0F];
        assert!(Difficulty::ByteThreshold(threshold.clone()).is_met(&[0x00, 0x0F]));
    }

    #[test]
    fn byte_threshold_ignores_length_padding() {
        // A 1-byte 0x05 and a 2-byte 0x00 0x05 represent the same integer.
        assert!(le_as_big_endian(&[0x05], &[0x00, 0x05]));
        assert!(le_as_big_endian(&[0x00, 0x05], &[0x05]));
    }
}
