//! Memory builder (C3): the challenge-dependent array `X`.
//!
//! Segments are independent (spec §5.1) and are built with Rayon, the same
//! way `qc-compute`'s `CpuEngine` parallelizes `batch_sha256` — one job per
//! segment, no shared mutable state across jobs. Within a segment, cells are
//! necessarily sequential: cell `q` depends on the seed carried by cell
//! `q-1`.

use rayon::prelude::*;

use crate::index::phis;
use crate::params::Params;
use crate::primitives::{hash, hash_concat, i32be};

/// The memory array `X`: `T` byte strings of length `x`, in `P` contiguous
/// segments of length `l = T/P`.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<Vec<u8>>,
    segment_len: u64,
}

impl Memory {
    /// Build `X` for challenge `initial_challenge` (`I`) under `params`.
    ///
    /// Segments build in parallel; within each segment, cells are produced
    /// strictly in increasing `q` order because `X[p*l+q]` depends on the
    /// seed carried by `X[p*l+q-1]`.
    pub fn build(params: &Params, initial_challenge: &[u8]) -> Self {
        let l = params.segment_len();
        let p_count = params.p;
        let n = params.n;
        let x = params.x;

        tracing::debug!(t = params.t, p = p_count, n, "building memory array");

        let segments: Vec<Vec<Vec<u8>>> = (0..p_count)
            .into_par_iter()
            .map(|p| build_segment(p, l, n, x, initial_challenge))
            .collect();

        tracing::debug!("memory array built");

        let cells = segments.into_iter().flatten().collect();
        Self { cells, segment_len: l }
    }

    /// Number of cells (`T`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True iff there are no cells (never the case for a validated `Params`).
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Segment length `l`.
    pub fn segment_len(&self) -> u64 {
        self.segment_len
    }

    /// Borrow cell `j`.
    pub fn get(&self, j: usize) -> &[u8] {
        &self.cells[j]
    }

    /// Iterate all cells in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.iter().map(|c| c.as_slice())
    }
}

/// Build one segment `p` of length `l`: the first `n` cells from the
/// init-phase formula, the remaining `l - n` from the fill-phase recursion.
fn build_segment(p: u64, l: u64, n: usize, x: usize, initial_challenge: &[u8]) -> Vec<Vec<u8>> {
    let l = l as usize;
    let mut segment: Vec<Vec<u8>> = Vec::with_capacity(l);

    for q in 0..n.min(l) {
        let q_be = i32be(q as u32);
        let p_be = i32be(p as u32);
        segment.push(hash_concat(x, &[&q_be, &p_be, initial_challenge]));
    }

    for q in n..l {
        let seed: [u8; 4] = segment[q - 1][..4]
            .try_into()
            .expect("x >= 4 is enforced by Params::new via M/x equality and minimum hash width");
        let antecedents = phis(seed, q as u64, n);
        let parts: Vec<&[u8]> = antecedents
            .iter()
            .map(|&idx| segment[idx as usize].as_slice())
            .collect();
        segment.push(hash(x, &concat(&parts)));
    }

    segment
}

fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::primitives::hash_concat as h_concat;

    fn params(t: u64, p: u64, n: usize) -> Params {
        Params::new(64, 64, 64, t, p, n, 9, Difficulty::Bits(8)).unwrap()
    }

    #[test]
    fn deterministic_init_cells_match_spec_scenario_1() {
        let challenge = [0u8; 64];
        let p = params(32, 1, 2);
        let mem = Memory::build(&p, &challenge);

        let expected_0 = h_concat(64, &[&i32be(0), &i32be(0), &challenge]);
        let expected_1 = h_concat(64, &[&i32be(1), &i32be(0), &challenge]);
        assert_eq!(mem.get(0), expected_0.as_slice());
        assert_eq!(mem.get(1), expected_1.as_slice());
    }

    #[test]
    fn memory_has_t_cells_of_length_x() {
        let challenge = [7u8; 64];
        let p = params(32, 2, 3);
        let mem = Memory::build(&p, &challenge);
        assert_eq!(mem.len(), 32);
        for cell in mem.iter() {
            assert_eq!(cell.len(), 64);
        }
    }

    #[test]
    fn deterministic_across_builds() {
        let challenge = [9u8; 64];
        let p = params(64, 4, 4);
        let a = Memory::build(&p, &challenge);
        let b = Memory::build(&p, &challenge);
        for j in 0..a.len() {
            assert_eq!(a.get(j), b.get(j));
        }
    }

    #[test]
    fn single_segment_builds() {
        let challenge = [1u8; 64];
        let p = params(16, 1, 2);
        let mem = Memory::build(&p, &challenge);
        assert_eq!(mem.len(), 16);
    }

    #[test]
    fn boundary_n_equals_11() {
        let challenge = [2u8; 64];
        // l >= n+1 = 12, T power of two >= 12*P.
        let p = params(32, 1, 11);
        let mem = Memory::build(&p, &challenge);
        assert_eq!(mem.len(), 32);
    }

    #[test]
    fn boundary_n_equals_1() {
        let challenge = [3u8; 64];
        let p = params(32, 1, 1);
        let mem = Memory::build(&p, &challenge);
        assert_eq!(mem.len(), 32);
    }
}
