//! Itsuku-style memory-hard proof-of-work: memory build, Merkle commitment,
//! nonce search, and witness proof/verify.
//!
//! ```text
//! primitives  (C1) -- H_m, xor, trailing_zero_bits, int_be_mod
//! index       (C2) -- phi / phi_k antecedent table
//! memory      (C3) -- the array X
//! merkle      (C4) -- the tree MT over X
//! walker      (C5) -- the hash-chain walk deriving Omega from a nonce
//! search      (C6) -- the parallel nonce search loop
//! witness     (C7) -- round_L / Z assembly for a search hit
//! verifier    (C8) -- replay a witness without rebuilding X or MT in full
//! ```
//!
//! [`prover::prove`] drives C2-C7 end to end; [`verifier::verify`] is the
//! sole consumer of C8. Everything below that boundary is an implementation
//! detail a caller shouldn't need to reach into directly, but is `pub` so
//! tests and advanced callers (e.g. a difficulty-tuning harness) can drive
//! individual stages.

pub mod difficulty;
pub mod envelope;
pub mod error;
pub mod index;
pub mod memory;
pub mod merkle;
pub mod params;
pub mod primitives;
pub mod prover;
pub mod search;
pub mod verifier;
pub mod walker;
pub mod witness;

pub use difficulty::Difficulty;
pub use error::{ProverError, VerifyError};
pub use memory::Memory;
pub use merkle::MerkleTree;
pub use params::Params;
pub use prover::{prove, Proof};
pub use search::{default_worker_count, CancelToken};
pub use verifier::verify;
pub use walker::WalkResult;
pub use witness::{MerkleOpening, RoundL, Witness};
