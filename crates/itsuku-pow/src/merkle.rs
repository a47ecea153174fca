//! Merkle builder (C4): the challenge-bound tree `MT` over `X`.
//!
//! Leaves hash independently (parallel, like `qc-compute`'s
//! `MerkleRootTask`); internal levels are parallel level-by-level, bottom
//! up, since each node within a level only reads its two children from the
//! level below.

use rayon::prelude::*;

use crate::memory::Memory;
use crate::primitives::hash_concat;

/// The Merkle tree `MT`: `2T-1` nodes, array-indexed (node `k`'s children
/// live at `2k+1` and `2k+2`), leaves in the last `T` slots.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    nodes: Vec<Vec<u8>>,
    leaf_count: usize,
}

impl MerkleTree {
    /// Build `MT` over `memory`, binding every internal node to
    /// `initial_challenge` (`I`).
    pub fn build(memory: &Memory, m: usize, initial_challenge: &[u8]) -> Self {
        let t = memory.len();
        debug_assert!(t.is_power_of_two(), "T must be a power of two");

        let mut nodes: Vec<Vec<u8>> = vec![Vec::new(); 2 * t - 1];

        // Leaves: MT[T-1+j] = H_M(X[j]), independent, computed in parallel.
        let leaves: Vec<Vec<u8>> = (0..t)
            .into_par_iter()
            .map(|j| crate::primitives::hash(m, memory.get(j)))
            .collect();
        for (j, leaf) in leaves.into_iter().enumerate() {
            nodes[t - 1 + j] = leaf;
        }

        // Internal nodes, level by level from the bottom. Level containing
        // node indices [lo, hi) is fully determined by the level below it.
        let mut hi = t - 1; // exclusive end of the level we're about to build
        while hi > 0 {
            let level_len = hi.div_ceil(2); // number of parent nodes in this pass
            let lo = hi - level_len;
            let computed: Vec<Vec<u8>> = (lo..hi)
                .into_par_iter()
                .map(|k| hash_concat(m, &[&nodes[2 * k + 1], &nodes[2 * k + 2], initial_challenge]))
                .collect();
            for (offset, value) in computed.into_iter().enumerate() {
                nodes[lo + offset] = value;
            }
            hi = lo;
        }

        tracing::debug!(t, "merkle tree built");

        Self { nodes, leaf_count: t }
    }

    /// Root `Ψ = MT[0]`.
    pub fn root(&self) -> &[u8] {
        &self.nodes[0]
    }

    /// Node value at a given tree index.
    pub fn node(&self, k: usize) -> &[u8] {
        &self.nodes[k]
    }

    /// Total node count (`2T-1`).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaves (`T`).
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Convert a leaf's global array index `j` into its Merkle-tree node
    /// index.
    pub fn leaf_node_index(&self, j: usize) -> usize {
        self.leaf_count - 1 + j
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::params::Params;

    fn build(t: u64, p: u64, n: usize, challenge: &[u8]) -> (Memory, MerkleTree) {
        let params = Params::new(64, 64, 64, t, p, n, 9, Difficulty::Bits(8)).unwrap();
        let mem = Memory::build(&params, challenge);
        let mt = MerkleTree::build(&mem, params.m, challenge);
        (mem, mt)
    }

    #[test]
    fn node_count_is_2t_minus_1() {
        let (_, mt) = build(32, 2, 2, &[0u8; 64]);
        assert_eq!(mt.len(), 2 * 32 - 1);
    }

    #[test]
    fn leaves_are_hashes_of_memory_cells() {
        let challenge = [5u8; 64];
        let (mem, mt) = build(16, 1, 2, &challenge);
        for j in 0..mem.len() {
            let expected = crate::primitives::hash(64, mem.get(j));
            assert_eq!(mt.node(mt.leaf_node_index(j)), expected.as_slice());
        }
    }

    #[test]
    fn internal_node_formula_holds() {
        let challenge = [6u8; 64];
        let (_, mt) = build(16, 1, 2, &challenge);
        for k in 0..(mt.leaf_count() - 1) {
            let expected =
                hash_concat(64, &[mt.node(2 * k + 1), mt.node(2 * k + 2), &challenge]);
            assert_eq!(mt.node(k), expected.as_slice());
        }
    }

    #[test]
    fn constant_leaves_give_constant_levels() {
        // P6: a hand-built tree with every leaf identical must have every
        // level internally constant, since each level's formula only
        // depends on the (constant) level below it plus the challenge.
        let t = 8usize;
        let leaf = vec![0u8; 64];
        let mut nodes = vec![Vec::new(); 2 * t - 1];
        for j in 0..t {
            nodes[t - 1 + j] = crate::primitives::hash(64, &leaf);
        }
        let challenge = [9u8; 64];
        let mut hi = t - 1;
        while hi > 0 {
            let level_len = hi.div_ceil(2);
            let lo = hi - level_len;
            for k in lo..hi {
                nodes[k] = hash_concat(64, &[&nodes[2 * k + 1], &nodes[2 * k + 2], &challenge]);
            }
            hi = lo;
        }
        // Every level of a perfect binary tree occupies array indices
        // [2^depth - 1, 2^(depth+1) - 1); each such level must be
        // internally constant.
        let depths = (t.ilog2() + 1) as u32;
        for depth in 0..depths {
            let lo = (1usize << depth) - 1;
            let hi = (1usize << (depth + 1)) - 1;
            let first = &nodes[lo];
            for k in lo..hi {
                assert_eq!(&nodes[k], first, "level at depth {depth} is not constant");
            }
        }
    }
}
