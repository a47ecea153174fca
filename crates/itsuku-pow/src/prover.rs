//! Top-level prover (`prove`): drives the engine through its full lifecycle,
//! `Init -> MemoryBuilt -> TreeBuilt -> Searching -> (Hit | Cancelled)`
//! (spec §3, Lifecycle), mirroring how `qc-compute::CpuEngine::pow_mine`
//! sequences memory/tree setup before handing off to its worker pool.

use crate::difficulty::Difficulty;
use crate::error::ProverError;
use crate::memory::Memory;
use crate::merkle::MerkleTree;
use crate::params::Params;
use crate::search::{search, CancelToken};
use crate::witness::{build_witness, MerkleOpening, RoundL};

/// A complete proof: the winning nonce plus the witness (`round_L`, `Z`)
/// needed to replay it. `X` and `MT` are not part of it — they're discarded
/// once the witness is extracted (spec §3, Lifecycle).
#[derive(Debug, Clone)]
pub struct Proof {
    /// The nonce that produced a `Ω` meeting the requested difficulty.
    pub nonce: [u8; crate::params::NONCE_LEN],
    /// Antecedent groups for every distinct index the winning walk visited.
    pub round_l: RoundL,
    /// The minimal Merkle opening covering `round_L`'s indices.
    pub z: MerkleOpening,
}

/// Build a proof for `params` against challenge `initial_challenge`.
///
/// Builds `X` (C3) and `MT` (C4) once, then searches (C6) for a nonce whose
/// walk (C5) meets `difficulty`, using `worker_count` parallel workers.
/// Returns `Ok(None)` if `cancel` is observed before a hit is found — this
/// is not an error, per spec §7's cancellation policy.
///
/// # Errors
///
/// Returns [`ProverError::InvalidParameters`] if `initial_challenge`'s
/// length doesn't match `params.m` (the walker XORs it against every cell
/// read, which requires equal lengths).
pub fn prove(
    params: &Params,
    initial_challenge: &[u8],
    difficulty: Difficulty,
    worker_count: usize,
    cancel: &CancelToken,
) -> Result<Option<Proof>, ProverError> {
    if initial_challenge.len() != params.m {
        return Err(ProverError::InvalidParameters(format!(
            "initial challenge must be {} bytes, got {}",
            params.m,
            initial_challenge.len()
        )));
    }

    tracing::info!(t = params.t, p = params.p, n = params.n, "proof session starting");

    let memory = Memory::build(params, initial_challenge);
    let tree = MerkleTree::build(&memory, params.m, initial_challenge);

    let Some(hit) =
        search(params, &memory, tree.root(), initial_challenge, difficulty, worker_count.max(1), cancel)
    else {
        tracing::debug!("proof session cancelled before a hit was found");
        return Ok(None);
    };

    let witness = build_witness(params, &memory, &tree, &hit.walk.visited);

    tracing::info!(attempts = hit.attempts, "proof session complete");

    Ok(Some(Proof { nonce: hit.nonce, round_l: witness.round_l, z: witness.z }))
}
