//! Fixed-length hashing and the small byte/integer helpers everything else
//! is built from.

use sha2::{Digest, Sha512};

/// Maximum output width this module can produce: SHA-512 is 64 bytes.
pub const MAX_HASH_LEN: usize = 64;

/// `H_m(data)`: the first `m` bytes of SHA-512(data).
///
/// A new hasher is instantiated per call; there is no streaming state to
/// accidentally leak between unrelated inputs.
///
/// # Panics
///
/// Panics if `m > 64` — no parameter set in this crate asks for more bytes
/// than the underlying primitive produces.
pub fn hash(m: usize, data: &[u8]) -> Vec<u8> {
    assert!(m <= MAX_HASH_LEN, "hash output width {m} exceeds SHA-512's 64 bytes");
    let digest = Sha512::digest(data);
    digest[..m].to_vec()
}

/// `H_m` over the concatenation of several byte slices, avoiding an
/// intermediate `Vec` allocation for the concatenation itself.
pub fn hash_concat(m: usize, parts: &[&[u8]]) -> Vec<u8> {
    assert!(m <= MAX_HASH_LEN, "hash output width {m} exceeds SHA-512's 64 bytes");
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    digest[..m].to_vec()
}

/// 4-byte big-endian encoding of a non-negative integer `< 2^32`.
pub fn i32be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Bytewise XOR. Requires `a.len() == b.len()`.
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(a.len(), b.len(), "xor operands must be equal length");
    a.iter().zip(b).map(|(x, y)| x ^ y).collect()
}

/// True iff the low `d` bits of the big-endian integer represented by `x`
/// are all zero.
///
/// `d == 0` is trivially satisfied by any input (the empty bit-suffix is
/// vacuously all zero), matching spec scenario 4.
pub fn trailing_zero_bits(x: &[u8], d: u32) -> bool {
    if d == 0 {
        return true;
    }
    let mut remaining = d;
    // Walk bytes from the least-significant (last) byte backward.
    for &byte in x.iter().rev() {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(8);
        let mask: u8 = if take == 8 { 0xFF } else { (1u8 << take) - 1 };
        if byte & mask != 0 {
            return false;
        }
        remaining -= take;
    }
    true
}

/// Interpret a byte string as a big-endian unsigned integer, reduced modulo
/// `modulus`. Used to turn a walk value `Y[j]` into an index into `X`.
pub fn int_be_mod(x: &[u8], modulus: usize) -> usize {
    assert!(modulus > 0, "modulus must be positive");
    // `x` can be up to 64 bytes (512 bits); reduce incrementally in u128
    // chunks rather than materializing a bignum type.
    let modulus128 = modulus as u128;
    let mut acc: u128 = 0;
    for &byte in x {
        acc = (acc * 256 + byte as u128) % modulus128;
    }
    acc as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_widths() {
        let data = i32be(123_456);
        for m in 1..=MAX_HASH_LEN {
            assert_eq!(hash(m, &data).len(), m);
        }
    }

    #[test]
    fn hash_is_truncated_sha512() {
        let data = b"hello world";
        let full = Sha512::digest(data);
        for m in 1..=MAX_HASH_LEN {
            assert_eq!(hash(m, data), full[..m]);
        }
    }

    #[test]
    fn hash_concat_matches_manual_concat() {
        let a = b"abc".to_vec();
        let b = b"defg".to_vec();
        let mut combined = a.clone();
        combined.extend_from_slice(&b);
        assert_eq!(hash_concat(32, &[&a, &b]), hash(32, &combined));
    }

    #[test]
    fn i32be_round_trips() {
        assert_eq!(i32be(0), [0, 0, 0, 0]);
        assert_eq!(i32be(1), [0, 0, 0, 1]);
        assert_eq!(i32be(256), [0, 0, 1, 0]);
        assert_eq!(i32be(u32::MAX), [0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn xor_self_is_zero() {
        let a = vec![0xAA, 0x55, 0x01];
        assert_eq!(xor(&a, &a), vec![0u8; 3]);
    }

    #[test]
    #[should_panic]
    fn xor_requires_equal_length() {
        xor(&[1, 2, 3], &[1, 2]);
    }

    #[test]
    fn trailing_zero_bits_zero_difficulty_always_passes() {
        assert!(trailing_zero_bits(&[0xFF, 0xFF], 0));
    }

    #[test]
    fn trailing_zero_bits_exact_boundary() {
        // 0b1000 has 3 trailing zero bits, not 4.
        assert!(trailing_zero_bits(&[0b1000], 3));
        assert!(!trailing_zero_bits(&[0b1000], 4));
    }

    #[test]
    fn trailing_zero_bits_spans_bytes() {
        // 0x00 0x00 has at least 16 trailing zero bits.
        assert!(trailing_zero_bits(&[0x00, 0x00], 16));
        assert!(trailing_zero_bits(&[0x01, 0x00], 8));
        assert!(!trailing_zero_bits(&[0x01, 0x00], 9));
    }

    #[test]
    fn int_be_mod_matches_naive_bignum() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        let naive: u128 = 0x01020304;
        assert_eq!(int_be_mod(&bytes, 100), (naive % 100) as usize);
    }
}
