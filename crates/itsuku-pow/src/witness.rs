//! Witness builder (C7): `round_L` (antecedent groups) and `Z` (the minimal
//! Merkle opening) for the indices a search hit actually visited.

use std::collections::{BTreeMap, BTreeSet};

use crate::index::phis;
use crate::memory::Memory;
use crate::merkle::MerkleTree;
use crate::params::Params;

/// `round_L`: for each distinct visited index, the `n` antecedent cells
/// needed to rebuild it.
pub type RoundL = BTreeMap<usize, Vec<Vec<u8>>>;

/// `Z`: the minimal Merkle multi-opening, keyed by tree node index.
pub type MerkleOpening = BTreeMap<usize, Vec<u8>>;

/// The proof artifact: nonce, `round_L`, `Z`. `X` and `MT` are not part of
/// it — they're discarded once this is extracted (spec §3, Lifecycle).
#[derive(Debug, Clone)]
pub struct Witness {
    pub round_l: RoundL,
    pub z: MerkleOpening,
}

/// Global array indices of the `n` antecedents for cell `idx`, per spec
/// §4.7: the segment's init cells for `q < n`, otherwise the `φ_k` table
/// seeded from `X[idx-1]`'s leading 4 bytes. Shared between the witness
/// builder and the verifier (C8) so both sides agree on what "antecedent"
/// means.
pub fn antecedent_indices(segment_len: u64, n: usize, idx: usize, seed: [u8; 4]) -> Vec<usize> {
    let p = idx as u64 / segment_len;
    let q = idx as u64 % segment_len;
    if q < n as u64 {
        ((p * segment_len) as usize..(p * segment_len) as usize + n).collect()
    } else {
        phis(seed, q, n).into_iter().map(|k| (p * segment_len + k) as usize).collect()
    }
}

/// Build `round_L` and `Z` for the indices visited by a walk.
pub fn build_witness(params: &Params, memory: &Memory, tree: &MerkleTree, visited: &[usize]) -> Witness {
    let l = memory.segment_len();
    let n = params.n;

    let mut round_l: RoundL = BTreeMap::new();
    let mut provided_leaves: BTreeSet<usize> = BTreeSet::new();

    for &idx in visited {
        provided_leaves.insert(idx);
        if round_l.contains_key(&idx) {
            continue;
        }

        let q = idx as u64 % l;
        let seed: [u8; 4] = if q < n as u64 {
            [0u8; 4] // unused by antecedent_indices when q < n
        } else {
            memory.get(idx - 1)[..4].try_into().expect("M >= 4 is required for seed extraction")
        };
        let indices = antecedent_indices(l, n, idx, seed);

        let antecedents: Vec<Vec<u8>> = indices.iter().map(|&j| memory.get(j).to_vec()).collect();

        for &j in &indices {
            provided_leaves.insert(j);
        }
        round_l.insert(idx, antecedents);
    }

    let z = minimal_opening(tree, &provided_leaves);

    tracing::debug!(round_l_len = round_l.len(), z_len = z.len(), "witness built");

    Witness { round_l, z }
}

/// Recompute the set of `X` indices a witness's `round_L` makes available,
/// without needing the original `Memory`/seeds (used by the verifier, and
/// by tests checking witness minimality).
pub fn provided_leaf_indices(round_l: &RoundL, segment_len: u64, n: usize) -> BTreeSet<usize> {
    let mut provided: BTreeSet<usize> = BTreeSet::new();
    for (&idx, antecedents) in round_l {
        provided.insert(idx);
        let q = idx as u64 % segment_len;
        if q < n as u64 {
            let p = idx as u64 / segment_len;
            for k in 0..n {
                provided.insert((p * segment_len) as usize + k);
            }
        } else if let Some(first) = antecedents.first() {
            let seed: [u8; 4] = first[..4].try_into().unwrap_or([0u8; 4]);
            for j in antecedent_indices(segment_len, n, idx, seed) {
                provided.insert(j);
            }
        }
    }
    provided
}

/// Compute the minimal set of Merkle-tree nodes `Z` such that, together
/// with the leaves in `provided_leaves`, the root is recomputable.
///
/// Walks from each provided leaf upward; a node goes into `Z` iff its
/// sibling is not itself derivable from the provided leaf set (i.e. not an
/// ancestor-or-self of another provided leaf) and isn't already present.
fn minimal_opening(tree: &MerkleTree, provided_leaves: &BTreeSet<usize>) -> MerkleOpening {
    let leaf_node_indices: BTreeSet<usize> =
        provided_leaves.iter().map(|&j| tree.leaf_node_index(j)).collect();

    // `coverage` holds every node index that is derivable purely from the
    // provided leaves: the leaves themselves, plus every ancestor reached
    // once both of its children are covered.
    let mut coverage: BTreeSet<usize> = leaf_node_indices.clone();
    let mut z: MerkleOpening = BTreeMap::new();

    // Process nodes from the deepest provided leaf upward; since parent
    // index < child index in this array layout, iterating node indices in
    // decreasing order visits every node's children before the node itself.
    let mut frontier: BTreeSet<usize> = leaf_node_indices;
    while !frontier.is_empty() {
        let mut next_frontier = BTreeSet::new();
        for &k in &frontier {
            if k == 0 {
                continue; // reached the root, nothing more to open
            }
            let parent = (k - 1) / 2;
            let sibling = if k % 2 == 1 { k + 1 } else { k - 1 };

            if !coverage.contains(&sibling) {
                z.entry(sibling).or_insert_with(|| tree.node(sibling).to_vec());
            }

            // Either the sibling was already covered, or we just opened it
            // via Z — either way the parent is now reconstructable.
            coverage.insert(parent);
            next_frontier.insert(parent);
        }
        frontier = next_frontier;
    }

    z
}
