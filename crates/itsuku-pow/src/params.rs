//! Proof-session parameters and their structural validation.
//!
//! There is no sane default difficulty or memory size for a proof-of-work
//! session, so `Params` has no `Default` impl — callers build one with
//! [`Params::new`], which validates eagerly rather than letting a bad
//! parameter set blow up partway through memory construction.

use crate::difficulty::Difficulty;
use crate::error::ProverError;
use crate::index::MAX_N;

/// Required byte length of the nonce `N`.
pub const NONCE_LEN: usize = 32;

/// Immutable parameters for one proof session (spec §3).
///
/// Not `Copy` since [`Difficulty::ByteThreshold`] owns a `Vec<u8>`; clone
/// explicitly where a second owned copy is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    /// Byte length of Merkle-node hash outputs (and, per `x == M`, of `X`
    /// elements).
    pub m: usize,
    /// Byte length of `X` elements. This crate enforces `x == m` (spec §9.4).
    pub x: usize,
    /// Byte length of `Y` elements and of `Ω`.
    pub s: usize,
    /// Length of `X`. Must be a power of two.
    pub t: u64,
    /// Number of independent segments. `l = t / p`.
    pub p: u64,
    /// Antecedent arity, `1 <= n <= 11`.
    pub n: usize,
    /// Walk length.
    pub l_walk: u64,
    /// The difficulty this session's proof must meet (spec §9, Open
    /// Question 3). Carried as the same typed union `prove`/`search`/
    /// `verify` take, rather than a bare bit count, so a byte-threshold
    /// session's `Params` can't silently disagree with what's actually
    /// checked.
    pub d: Difficulty,
}

impl Params {
    /// Validate and construct a parameter set.
    ///
    /// Checks, in order: `t` is a power of two, `t % p == 0`, the resulting
    /// segment length `l = t / p` satisfies `l >= n + 1` (so every segment
    /// has at least one fill cell), `1 <= n <= 11`, and `x == m` (the walker
    /// XORs `X[i]` against `I`, which requires equal lengths).
    pub fn new(
        m: usize,
        x: usize,
        s: usize,
        t: u64,
        p: u64,
        n: usize,
        l_walk: u64,
        d: Difficulty,
    ) -> Result<Self, ProverError> {
        if t == 0 || !t.is_power_of_two() {
            return Err(ProverError::InvalidParameters(format!(
                "T must be a power of two, got {t}"
            )));
        }
        if p == 0 || t % p != 0 {
            return Err(ProverError::InvalidParameters(format!(
                "T ({t}) must be an exact multiple of P ({p})"
            )));
        }
        if n == 0 || n > MAX_N {
            return Err(ProverError::InvalidParameters(format!(
                "n must be in [1, {MAX_N}], got {n}"
            )));
        }
        let l = t / p;
        if l < n as u64 + 1 {
            return Err(ProverError::InvalidParameters(format!(
                "segment length l={l} must be >= n+1 ({})",
                n + 1
            )));
        }
        if x != m {
            return Err(ProverError::InvalidParameters(format!(
                "x ({x}) must equal M ({m}); the walker XORs X[i] against I"
            )));
        }
        if m == 0 || m > crate::primitives::MAX_HASH_LEN {
            return Err(ProverError::InvalidParameters(format!(
                "M must be in [1, {}], got {m}",
                crate::primitives::MAX_HASH_LEN
            )));
        }
        if s == 0 || s > crate::primitives::MAX_HASH_LEN {
            return Err(ProverError::InvalidParameters(format!(
                "S must be in [1, {}], got {s}",
                crate::primitives::MAX_HASH_LEN
            )));
        }
        if l_walk == 0 {
            return Err(ProverError::InvalidParameters(
                "L (walk length) must be positive".to_string(),
            ));
        }

        Ok(Self { m, x, s, t, p, n, l_walk, d })
    }

    /// `l = T / P`, the length of one segment.
    #[inline]
    pub fn segment_len(&self) -> u64 {
        self.t / self.p
    }

    /// The canonical walk length `⌈3.3·log₂ T⌉` spec.md recommends, for
    /// callers that don't want to pick `L` themselves.
    pub fn recommended_walk_length(t: u64) -> u64 {
        let log2_t = (t as f64).log2();
        (3.3 * log2_t).ceil() as u64
    }
}
