//! Verifier (C8): reconstruct enough of `X` and `MT` from a witness to
//! replay the walk and check the difficulty, without ever materializing the
//! full memory array.
//!
//! This is "the unfinished verifier-side glue" spec.md promotes to a
//! first-class component (`original_source/itsuku.py`'s `PoW` stops at
//! `# TODO : rest of the protocol`); there's no teacher code to adapt here
//! beyond the shape of `qc-compute::ComputeError`-style typed rejection.

use std::collections::{BTreeMap, BTreeSet};

use crate::difficulty::Difficulty;
use crate::error::VerifyError;
use crate::index::phis;
use crate::params::Params;
use crate::primitives::hash;
use crate::witness::{MerkleOpening, RoundL};

/// Verify a proof against `params` and challenge `initial_challenge`.
///
/// Performs every structural and cryptographic check from spec §4.8 and
/// rejects with the first failing [`VerifyError`] encountered; it never
/// panics on attacker-controlled input.
pub fn verify(
    params: &Params,
    initial_challenge: &[u8],
    nonce: &[u8],
    round_l: &RoundL,
    z: &MerkleOpening,
    difficulty: &Difficulty,
) -> Result<(), VerifyError> {
    structural_checks(params, initial_challenge, round_l)?;

    let l = params.segment_len();
    let n = params.n;
    let t = params.t as usize;

    // Step 2: rebuild every cell round_L gives us directly, plus every
    // init-phase cell (fully determined by I, P, n -- always reconstructed
    // independently of what the prover claims).
    let mut cells: BTreeMap<usize, Vec<u8>> = BTreeMap::new();
    for p in 0..params.p {
        for q in 0..n as u64 {
            let idx = (p * l + q) as usize;
            let value = hash(
                params.x,
                &[
                    crate::primitives::i32be(q as u32).as_slice(),
                    crate::primitives::i32be(p as u32).as_slice(),
                    initial_challenge,
                ]
                .concat(),
            );
            cells.insert(idx, value);
        }
    }

    for (&idx, antecedents) in round_l {
        let q = idx as u64 % l;
        if q >= n as u64 {
            let rebuilt = hash(params.x, &antecedents.concat());
            cells.insert(idx, rebuilt);
        } else {
            // For q < n, round_L's claimed antecedents are the segment's
            // own init cells (spec §4.7); they carry no new information
            // beyond what was already rebuilt above, but a prover is free
            // to claim anything there, so check it matches the
            // independently-recomputed truth rather than silently ignoring
            // it — otherwise a corrupted init-phase entry would pass
            // unnoticed.
            let p = idx as u64 / l;
            for (k, claimed) in antecedents.iter().enumerate() {
                let expected = cells.get(&((p * l) as usize + k)).expect("init cells rebuilt above");
                if claimed != expected {
                    return Err(VerifyError::SeedInconsistency(idx));
                }
            }
        }
    }

    // Place every antecedent value round_L provided into its global slot so
    // later antecedent lookups (seed consistency, leaf hashing) see them,
    // without overwriting an init-phase cell already recomputed above.
    for (&idx, antecedents) in round_l {
        let q = idx as u64 % l;
        let p = idx as u64 / l;
        let indices: Vec<usize> = if q < n as u64 {
            ((p * l) as usize..(p * l) as usize + n).collect()
        } else {
            let seed: [u8; 4] = antecedents
                .first()
                .and_then(|v| v.get(..4))
                .ok_or_else(|| VerifyError::InvalidWitnessShape(format!("index {idx}: empty antecedent list")))?
                .try_into()
                .unwrap();
            phis(seed, q, n).into_iter().map(|k| (p * l + k) as usize).collect()
        };
        for (slot, value) in indices.iter().zip(antecedents.iter()) {
            cells.entry(*slot).or_insert_with(|| value.clone());
        }
    }

    // Step 3: seed self-consistency. For q >= n, the first antecedent
    // listed must equal X[idx-1] (phi_0 = q-1 is load-bearing, spec §9.5),
    // and its leading 4 bytes are the seed used to derive the rest.
    for (&idx, antecedents) in round_l {
        let q = idx as u64 % l;
        if q < n as u64 {
            continue;
        }
        let predecessor = cells
            .get(&(idx - 1))
            .ok_or(VerifyError::SeedInconsistency(idx))?;
        let claimed_first = antecedents.first().ok_or_else(|| {
            VerifyError::InvalidWitnessShape(format!("index {idx}: empty antecedent list"))
        })?;
        if claimed_first != predecessor {
            return Err(VerifyError::SeedInconsistency(idx));
        }
    }

    // Step 4: leaf hashes for every reconstructable cell, merged with Z.
    let mut node_map: BTreeMap<usize, Vec<u8>> = BTreeMap::new();
    let leaf_offset = t - 1;
    for (&idx, value) in &cells {
        node_map.insert(leaf_offset + idx, hash(params.m, value));
    }
    for (&node_idx, value) in z {
        node_map.entry(node_idx).or_insert_with(|| value.clone());
    }

    // Step 5: root reconstruction.
    let root = reconstruct_node(&node_map, 0, t, params.m, initial_challenge)?;

    // Step 6 + 7: replay the walk, checking each visited index against
    // round_L's keys *before* reading its cell — an index the witness never
    // committed to has no cell to read, and reading one would panic deep in
    // `xor` on a length mismatch rather than cleanly rejecting the proof.
    let expected_keys: BTreeSet<usize> = round_l.keys().copied().collect();
    let omega = replay_walk(initial_challenge, t, nonce, &root, params, &cells, &expected_keys)?;

    if !difficulty.is_met(&omega) {
        return Err(VerifyError::DifficultyNotMet);
    }

    Ok(())
}

/// Replay spec §4.5's walk using only cells `round_L` makes available,
/// rejecting with [`VerifyError::WalkMismatch`] the moment a step would need
/// a cell outside `expected_keys`.
fn replay_walk(
    initial_challenge: &[u8],
    t: usize,
    nonce: &[u8],
    root: &[u8],
    params: &Params,
    cells: &BTreeMap<usize, Vec<u8>>,
    expected_keys: &BTreeSet<usize>,
) -> Result<Vec<u8>, VerifyError> {
    use crate::primitives::{int_be_mod, xor};

    let l_walk = params.l_walk as usize;
    let mut y: Vec<Vec<u8>> = Vec::with_capacity(l_walk + 1);
    y.push(hash(params.s, &[nonce, root, initial_challenge].concat()));

    for step in 0..l_walk {
        let prev = &y[step];
        let idx = int_be_mod(prev, t);
        if !expected_keys.contains(&idx) {
            return Err(VerifyError::WalkMismatch(step));
        }
        let cell = cells.get(&idx).ok_or(VerifyError::WalkMismatch(step))?;
        let mixed = xor(cell, initial_challenge);
        y.push(hash(params.s, &[prev.as_slice(), mixed.as_slice()].concat()));
    }

    let l = l_walk as u64;
    let skip_y0 = l % 2 == 1;
    let lower_bound = if skip_y0 { 1 } else { 0 };
    let parts: Vec<&[u8]> = y[lower_bound..].iter().rev().map(|v| v.as_slice()).collect();
    Ok(hash(params.s, &parts.concat()))
}

fn structural_checks(
    params: &Params,
    initial_challenge: &[u8],
    round_l: &RoundL,
) -> Result<(), VerifyError> {
    if !params.t.is_power_of_two() {
        return Err(VerifyError::InvalidParameters("T must be a power of two".to_string()));
    }
    if params.p == 0 || params.t % params.p != 0 {
        return Err(VerifyError::InvalidParameters("l = T/P must be an integer".to_string()));
    }
    let l = params.segment_len();
    if l < params.n as u64 + 1 {
        return Err(VerifyError::InvalidParameters("l = T/P must be >= n+1".to_string()));
    }
    if initial_challenge.len() != params.m {
        return Err(VerifyError::InvalidParameters(format!(
            "I must be {} bytes, got {}",
            params.m,
            initial_challenge.len()
        )));
    }

    for (&idx, antecedents) in round_l {
        if idx >= params.t as usize {
            return Err(VerifyError::InvalidWitnessShape(format!(
                "round_L key {idx} out of range [0, {})",
                params.t
            )));
        }
        if antecedents.len() != params.n {
            return Err(VerifyError::InvalidWitnessShape(format!(
                "round_L[{idx}] has {} antecedents, expected {}",
                antecedents.len(),
                params.n
            )));
        }
        for a in antecedents {
            if a.len() != params.x {
                return Err(VerifyError::InvalidWitnessShape(format!(
                    "round_L[{idx}] antecedent has length {}, expected {}",
                    a.len(),
                    params.x
                )));
            }
        }
    }

    Ok(())
}

/// Recursively recompute the Merkle root: a node already present in
/// `node_map` is returned as-is, otherwise its children are reconstructed
/// and hashed together with `initial_challenge`. Fails with
/// [`VerifyError::InsufficientOpening`] if recursion would descend past a
/// leaf without any coverage.
fn reconstruct_node(
    node_map: &BTreeMap<usize, Vec<u8>>,
    node: usize,
    t: usize,
    m: usize,
    initial_challenge: &[u8],
) -> Result<Vec<u8>, VerifyError> {
    if let Some(value) = node_map.get(&node) {
        return Ok(value.clone());
    }
    if node >= t - 1 {
        // This is a leaf position with no coverage at all.
        return Err(VerifyError::InsufficientOpening(node));
    }
    let left = reconstruct_node(node_map, 2 * node + 1, t, m, initial_challenge)?;
    let right = reconstruct_node(node_map, 2 * node + 2, t, m, initial_challenge)?;
    Ok(hash(m, &[left.as_slice(), right.as_slice(), initial_challenge].concat()))
}
