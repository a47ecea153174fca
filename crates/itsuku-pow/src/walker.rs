//! Walker (C5): the hash-chain random walk through `X` that derives `Ω`
//! from a nonce.
//!
//! Pure function of `(I, X, N, Ψ, L, S)` — no state survives between calls,
//! so [`walk`] is safe to call concurrently across nonces the way the
//! search loop (C6) does.

use crate::primitives::{hash, int_be_mod, xor};

/// Result of one walk: the `Y` chain, the summary `Ω`, and the visited
/// index at each step (`i[0..L)`).
#[derive(Debug, Clone)]
pub struct WalkResult {
    pub y: Vec<Vec<u8>>,
    pub omega: Vec<u8>,
    pub visited: Vec<usize>,
}

/// Run the walk for nonce `nonce` against memory array length `t` read
/// through `read_cell`, producing `(Y, Ω, i)` per spec §4.5.
///
/// `read_cell` is a closure rather than a concrete `&Memory` borrow so the
/// verifier (C8), which only has a sparse reconstruction of `X`, can reuse
/// this exact logic.
pub fn walk<F>(
    initial_challenge: &[u8],
    t: usize,
    nonce: &[u8],
    root: &[u8],
    l_walk: u64,
    s: usize,
    mut read_cell: F,
) -> WalkResult
where
    F: FnMut(usize) -> Vec<u8>,
{
    let l_walk = l_walk as usize;
    let mut y: Vec<Vec<u8>> = Vec::with_capacity(l_walk + 1);
    let mut visited: Vec<usize> = Vec::with_capacity(l_walk);

    y.push(hash(s, &concat3(nonce, root, initial_challenge)));

    for j in 1..=l_walk {
        let prev = &y[j - 1];
        let idx = int_be_mod(prev, t);
        visited.push(idx);
        let cell = read_cell(idx);
        let mixed = xor(&cell, initial_challenge);
        y.push(hash(s, &concat2(prev, &mixed)));
    }

    let omega = compute_omega(&y, s);

    WalkResult { y, omega, visited }
}

/// `Ω` per the parity rule in spec §3: if `L` is odd, `Y[0]` is dropped from
/// the concatenation; if even, it's included. This asymmetry is a
/// deliberate artifact of the reference implementation (`itsuku.py`'s
/// `Y[::-1]` vs `Y[:0:-1]` slicing) and must be preserved for
/// interoperability — see spec §9, Open Question 1.
fn compute_omega(y: &[Vec<u8>], s: usize) -> Vec<u8> {
    let l = y.len() - 1; // walk length L
    let skip_y0 = l % 2 == 1;
    let lower_bound = if skip_y0 { 1 } else { 0 };
    let parts: Vec<&[u8]> = y[lower_bound..].iter().rev().map(|v| v.as_slice()).collect();
    hash(s, &parts.concat())
}

fn concat2(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

fn concat3(a: &[u8], b: &[u8], c: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len() + c.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out.extend_from_slice(c);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::memory::Memory;
    use crate::merkle::MerkleTree;
    use crate::params::Params;

    fn setup(t: u64, l_walk: u64) -> (Params, Memory, MerkleTree, Vec<u8>) {
        let params = Params::new(64, 64, 64, t, 1, 2, l_walk, Difficulty::Bits(8)).unwrap();
        let challenge = [4u8; 64];
        let mem = Memory::build(&params, &challenge);
        let mt = MerkleTree::build(&mem, params.m, &challenge);
        (params, mem, mt, challenge.to_vec())
    }

    #[test]
    fn walk_length_matches_spec_scenario_3() {
        let (params, mem, mt, challenge) = setup(32, 17);
        let nonce = [1u8; 32];
        let result = walk(&challenge, mem.len(), &nonce, mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        assert_eq!(result.y.len(), 18);
        assert_eq!(result.visited.len(), 17);
        for &idx in &result.visited {
            assert!(idx < 32);
        }
    }

    #[test]
    fn walk_is_deterministic() {
        let (params, mem, mt, challenge) = setup(32, 9);
        let nonce = [2u8; 32];
        let a = walk(&challenge, mem.len(), &nonce, mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        let b = walk(&challenge, mem.len(), &nonce, mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        assert_eq!(a.y, b.y);
        assert_eq!(a.omega, b.omega);
        assert_eq!(a.visited, b.visited);
    }

    #[test]
    fn omega_parity_skips_y0_when_l_is_odd() {
        let (params, mem, mt, challenge) = setup(32, 9); // L=9, odd
        let nonce = [3u8; 32];
        let result = walk(&challenge, mem.len(), &nonce, mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        let manual_parts: Vec<&[u8]> = result.y[1..].iter().rev().map(|v| v.as_slice()).collect();
        let expected = hash(64, &manual_parts.concat());
        assert_eq!(result.omega, expected);
    }

    #[test]
    fn omega_parity_includes_y0_when_l_is_even() {
        let (params, mem, mt, challenge) = setup(32, 8); // L=8, even
        let nonce = [3u8; 32];
        let result = walk(&challenge, mem.len(), &nonce, mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        let manual_parts: Vec<&[u8]> = result.y.iter().rev().map(|v| v.as_slice()).collect();
        let expected = hash(64, &manual_parts.concat());
        assert_eq!(result.omega, expected);
    }

    #[test]
    fn different_nonces_give_different_omegas() {
        let (params, mem, mt, challenge) = setup(32, 9);
        let a = walk(&challenge, mem.len(), &[1u8; 32], mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        let b = walk(&challenge, mem.len(), &[2u8; 32], mt.root(), params.l_walk, params.s, |j| {
            mem.get(j).to_vec()
        });
        assert_ne!(a.omega, b.omega);
    }
}
