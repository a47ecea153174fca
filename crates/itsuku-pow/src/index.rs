//! `φ(seed, i)` and the closed-form `φ_k` antecedent table.
//!
//! `original_source/itsuku.py` carries two formulations of `phi` and its test
//! suite checks them against each other. With a 4-byte seed, `J < 2^32` so
//! `J^2 < 2^64` strictly, which makes `floor(J^2 / 2^64)` identically zero —
//! the high-level formula collapses to `phi = i - 1` for *every* seed. The
//! low-level formula doesn't have that degeneracy (it floors at the `2^32`
//! scale, a range `J^2` actually spans). So the two formulations agree only
//! when `J < 2^16` (seeds whose top 16 bits happen to be zero) and silently
//! diverge otherwise. `phis()` in `memory_build`'s production path needs
//! `phi_1` to be a real pseudo-random value distinct from `phi_0 = i - 1`,
//! so this crate's production [`phi`] is the low-level formulation; the
//! high-level one is kept only as [`phi_high_level`], a debug cross-check
//! valid in the narrow regime where the two actually coincide (see the
//! `phi_high_level_diverges_for_large_seeds` test below, and DESIGN.md).

/// Maximum supported antecedent arity.
pub const MAX_N: usize = 11;

/// `φ(seed, i)`: a pseudo-random index into `[0, i)` derived from a 4-byte
/// seed, using the low-level (Argon2-style) formulation from the Itsuku
/// paper. `i` must be `>= 1`.
///
/// This is the production code path: it only needs 64-bit intermediates
/// (`J² <= 2^64 - 1` fits comfortably, and the subsequent product is taken
/// in `u128` to avoid overflow before the final shift).
pub fn phi(seed: [u8; 4], i: u64) -> u64 {
    assert!(i >= 1, "phi is undefined for i == 0");
    let j = u32::from_be_bytes(seed) as u64;
    let r = i - 1;
    let x = (j * j) >> 32; // floor(J^2 / 2^32), fits in u64 since J < 2^32
    let y = ((r as u128 * x as u128) >> 32) as u64; // floor((i-1)*x / 2^32)
    r - y
}

/// High-level formulation of `φ`, kept only to cross-check [`phi`] (P2).
/// Requires a 128-bit intermediate for `J²/2⁶⁴`.
#[cfg(any(test, debug_assertions))]
pub fn phi_high_level(seed: [u8; 4], i: u64) -> u64 {
    assert!(i >= 1, "phi is undefined for i == 0");
    let j = u32::from_be_bytes(seed) as u128;
    let r = (i - 1) as u128;
    let ratio = (j * j) >> 64; // floor(J^2 / 2^64); J < 2^32 so this is 0 or, at the boundary, 0
    (r * (1u128.saturating_sub(ratio))) as u64
}

/// `φ_k(seed, i)` for `k ∈ [0, n)`: the fixed closed-form table of §4.2.
/// `φ_0 = i-1` always; `φ_1 = φ(seed, i)`; the rest are deterministic mixes
/// of `i` and `φ_1`.
///
/// # Panics
///
/// Panics if `n` is outside `[1, 11]` or `i == 0`.
pub fn phis(seed: [u8; 4], i: u64, n: usize) -> Vec<u64> {
    assert!((1..=MAX_N).contains(&n), "n must be in [1, 11], got {n}");
    assert!(i >= 1, "phis is undefined for i == 0");

    let mut res = Vec::with_capacity(n);
    res.push(i - 1); // phi_0

    if n >= 2 {
        let phi_1 = phi(seed, i);
        res.push(phi_1);
        if n >= 3 {
            res.push(phi_1 / 2);
        }
        if n >= 4 {
            res.push((i - 1) / 2);
        }
        if n >= 5 {
            res.push((phi_1 + i) / 2);
        }
        if n >= 6 {
            res.push(3 * phi_1 / 4);
        }
        if n >= 7 {
            res.push(3 * i / 4);
        }
        if n >= 8 {
            res.push(phi_1 / 4);
        }
        if n >= 9 {
            res.push(i / 4);
        }
        if n >= 10 {
            res.push(7 * phi_1 / 8);
        }
        if n >= 11 {
            res.push(7 * i / 8);
        }
    }

    debug_assert_eq!(res.len(), n);
    res
}
