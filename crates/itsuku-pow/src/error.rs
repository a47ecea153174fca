//! Error types for the proof-of-work engine.

use thiserror::Error;

/// Errors raised while constructing a proof.
///
/// Parameter errors are fatal to the call: the engine refuses to start
/// building `X`/`MT` rather than fail partway through. [`ProverError::Cancelled`]
/// is not modeled here — cancellation surfaces as `Ok(None)` from the search
/// loop, matching spec §7's "non-error to the caller" policy.
#[derive(Debug, Error)]
pub enum ProverError {
    /// A structural parameter is invalid (non-power-of-two `T`, `l < n`,
    /// `n` out of `[1, 11]`, `x != M`, ...).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The random source failed to produce a nonce.
    #[error("entropy source failed: {0}")]
    EntropyFailure(String),
}

/// Reasons a verifier rejects a proof.
///
/// Every variant is a rejection, never a process abort: the verifier is a
/// pure function that returns `Err` and lets the caller decide what to do
/// with an invalid proof.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Parameters themselves are structurally invalid.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// `round_L`/`Z` don't have the shape the verifier needs to proceed
    /// (wrong antecedent count, wrong byte length, out-of-range key, ...).
    #[error("invalid witness shape: {0}")]
    InvalidWitnessShape(String),

    /// Root reconstruction descended past a leaf with no coverage from
    /// `round_L` or `Z`.
    #[error("insufficient Merkle opening: node {0} has no provided value and no derivable children")]
    InsufficientOpening(usize),

    /// The leading 4 bytes of a `round_L` entry's first antecedent disagree
    /// with the reconstructed predecessor cell.
    #[error("seed inconsistency at index {0}")]
    SeedInconsistency(usize),

    /// The replayed walk visited indices that disagree with `round_L`'s keys.
    #[error("walk replay diverged from round_L at step {0}")]
    WalkMismatch(usize),

    /// The recomputed `Ω` does not meet the required difficulty.
    #[error("difficulty not met")]
    DifficultyNotMet,
}
