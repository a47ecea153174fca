//! Search loop (C6): draw nonces until the walk's `Ω` meets the difficulty.
//!
//! Mirrors `qc-compute::backends::cpu::CpuEngine::pow_mine`'s shape — a
//! pool of worker threads racing over independent nonce attempts, the first
//! hit wins, everyone else gets a coarse-grained cancel signal. Unlike a
//! Bitcoin-style incrementing nonce, Itsuku draws a fresh random 32-byte `N`
//! every attempt (spec §9, Open Question 2: the reference's loop recomputes
//! `Y`/`Ω` without redrawing `N` at all, which never terminates on a miss —
//! this crate redraws `N` every iteration, as spec.md mandates).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::RngCore;
use rayon::prelude::*;

use crate::difficulty::Difficulty;
use crate::memory::Memory;
use crate::params::{Params, NONCE_LEN};
use crate::primitives::trailing_zero_bits;
use crate::walker::{walk, WalkResult};

/// A successful search: the winning nonce, its walk result, and the number
/// of attempts it took (exposed for test/benchmark instrumentation, not
/// printed anywhere — spec §9 supplement 1).
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub nonce: [u8; NONCE_LEN],
    pub walk: WalkResult,
    pub attempts: u64,
}

/// External cancellation handle for [`search`]. Cloning shares the same
/// underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How often (in attempts per worker) to log progress and check for an
/// externally-requested cancellation. Mirrors the `% 10000` check in
/// `qc-compute`'s `pow_mine` and the `% 25` progress log in
/// `original_source/itsuku.py`'s `PoW` loop.
const PROGRESS_INTERVAL: u64 = 256;

/// Search for a nonce whose walk satisfies `difficulty`, using
/// `worker_count` parallel workers each drawing independent random nonces.
///
/// Returns `None` if `cancel` is observed before any worker finds a hit.
/// Cancellation is coarse-grained: a worker finishes its current hash
/// attempt before checking the flag, never interrupts mid-hash.
pub fn search(
    params: &Params,
    memory: &Memory,
    root: &[u8],
    initial_challenge: &[u8],
    difficulty: Difficulty,
    worker_count: usize,
    cancel: &CancelToken,
) -> Option<SearchHit> {
    let found = Arc::new(std::sync::Mutex::new(None::<SearchHit>));
    let total_attempts = std::sync::atomic::AtomicU64::new(0);

    tracing::info!(worker_count, "starting nonce search");

    (0..worker_count.max(1)).into_par_iter().for_each(|_worker| {
        let mut rng = rand::thread_rng();
        loop {
            if cancel.is_cancelled() || found.lock().unwrap().is_some() {
                return;
            }

            let mut nonce = [0u8; NONCE_LEN];
            rng.fill_bytes(&mut nonce);

            let result = walk(
                initial_challenge,
                memory.len(),
                &nonce,
                root,
                params.l_walk,
                params.s,
                |j| memory.get(j).to_vec(),
            );

            let attempt_no = total_attempts.fetch_add(1, Ordering::Relaxed) + 1;
            if attempt_no % PROGRESS_INTERVAL == 0 {
                tracing::debug!(attempt_no, "search still running");
            }

            if difficulty.is_met(&result.omega) {
                let mut slot = found.lock().unwrap();
                if slot.is_none() {
                    tracing::info!(attempt_no, "found a satisfying nonce");
                    *slot = Some(SearchHit { nonce, walk: result, attempts: attempt_no });
                }
                return;
            }
        }
    });

    let hit = Arc::try_unwrap(found).ok()?.into_inner().ok()?;
    if hit.is_none() {
        tracing::debug!("search cancelled with no hit");
    }
    hit
}

/// Difficulty-bits convenience wrapper over [`trailing_zero_bits`], used
/// when the caller just wants the bit-count predicate without going through
/// [`Difficulty`].
pub fn meets_bit_difficulty(omega: &[u8], d: u32) -> bool {
    trailing_zero_bits(omega, d)
}

/// A sensible default `worker_count` for [`search`]: one worker per
/// available core.
pub fn default_worker_count() -> usize {
    num_cpus::get()
}
