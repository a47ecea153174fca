//! The serde boundary between this engine and a caller's JSON envelope
//! (spec §6): hex-encoded byte strings, decimal-string map keys for
//! `round_L`/`Z`. This module is a thin data-shape translation layer, not a
//! packaging workflow — no file I/O, no CLI, no config loading lives here.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::difficulty::Difficulty;
use crate::error::ProverError;
use crate::params::{Params, NONCE_LEN};
use crate::prover::Proof;

/// Errors converting an envelope into its domain type.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// A fixed-length field (the nonce) didn't decode to the expected length.
    #[error("field {field} must be {expected} bytes, got {got}")]
    WrongLength { field: &'static str, expected: usize, got: usize },
    /// The envelope's parameters failed `Params`'s own validation.
    #[error(transparent)]
    InvalidParameters(#[from] ProverError),
}

/// A byte string that (de)serializes as lowercase hex, no `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

/// `Params`'s envelope form: identical field shape, except `d` nests the
/// tagged [`DifficultyEnvelope`] rather than a bare bit count, so a
/// `ByteThreshold` session round-trips through `params.d` the same way a
/// `Bits` one does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsEnvelope {
    pub m: usize,
    pub x: usize,
    pub s: usize,
    pub t: u64,
    pub p: u64,
    pub n: usize,
    pub l_walk: u64,
    pub d: DifficultyEnvelope,
}

impl From<&Params> for ParamsEnvelope {
    fn from(params: &Params) -> Self {
        Self {
            m: params.m,
            x: params.x,
            s: params.s,
            t: params.t,
            p: params.p,
            n: params.n,
            l_walk: params.l_walk,
            d: DifficultyEnvelope::from(&params.d),
        }
    }
}

impl TryFrom<ParamsEnvelope> for Params {
    type Error = EnvelopeError;

    fn try_from(env: ParamsEnvelope) -> Result<Self, Self::Error> {
        Params::new(env.m, env.x, env.s, env.t, env.p, env.n, env.l_walk, Difficulty::from(env.d))
            .map_err(EnvelopeError::from)
    }
}

/// `Difficulty`'s envelope form: a tagged union so the wire format carries
/// which predicate the verifier should apply (spec §9, Open Question 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DifficultyEnvelope {
    Bits { bits: u32 },
    ByteThreshold { threshold: HexBytes },
}

impl From<&Difficulty> for DifficultyEnvelope {
    fn from(difficulty: &Difficulty) -> Self {
        match difficulty {
            Difficulty::Bits(bits) => DifficultyEnvelope::Bits { bits: *bits },
            Difficulty::ByteThreshold(threshold) => {
                DifficultyEnvelope::ByteThreshold { threshold: HexBytes(threshold.clone()) }
            }
        }
    }
}

impl From<DifficultyEnvelope> for Difficulty {
    fn from(env: DifficultyEnvelope) -> Self {
        match env {
            DifficultyEnvelope::Bits { bits } => Difficulty::Bits(bits),
            DifficultyEnvelope::ByteThreshold { threshold } => Difficulty::ByteThreshold(threshold.0),
        }
    }
}

/// `Proof`'s envelope form: the nonce and every `Z` entry as a hex string,
/// `round_L`'s antecedent groups as arrays of hex strings, both maps keyed
/// by the decimal string of their array index (serde_json renders integer
/// map keys this way without help).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofEnvelope {
    pub nonce: HexBytes,
    pub round_l: BTreeMap<usize, Vec<HexBytes>>,
    pub z: BTreeMap<usize, HexBytes>,
}

impl From<&Proof> for ProofEnvelope {
    fn from(proof: &Proof) -> Self {
        let round_l = proof
            .round_l
            .iter()
            .map(|(&idx, antecedents)| {
                (idx, antecedents.iter().cloned().map(HexBytes).collect())
            })
            .collect();
        let z = proof.z.iter().map(|(&idx, value)| (idx, HexBytes(value.clone()))).collect();
        Self { nonce: HexBytes(proof.nonce.to_vec()), round_l, z }
    }
}

impl TryFrom<ProofEnvelope> for Proof {
    type Error = EnvelopeError;

    fn try_from(env: ProofEnvelope) -> Result<Self, Self::Error> {
        let nonce: [u8; NONCE_LEN] =
            env.nonce.0.try_into().map_err(|v: Vec<u8>| EnvelopeError::WrongLength {
                field: "nonce",
                expected: NONCE_LEN,
                got: v.len(),
            })?;
        let round_l = env
            .round_l
            .into_iter()
            .map(|(idx, antecedents)| (idx, antecedents.into_iter().map(|h| h.0).collect()))
            .collect();
        let z = env.z.into_iter().map(|(idx, value)| (idx, value.0)).collect();
        Ok(Proof { nonce, round_l, z })
    }
}
