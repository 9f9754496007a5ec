//! # mock_prover
//!
//! BLAKE2b-based mock of a succinct proof system.
//!
//! The tally engine treats proving as an opaque service: the client hands
//! over a statement (a digest of the transaction's public inputs) and gets a
//! proof back; the ledger checks the proof against a statement it rebuilds
//! from public data. This crate provides exactly that interface and nothing
//! more.
//!
//! ## Proof Structure
//!
//! | Bytes | Field | Description |
//! | ----- | ----- | ----------- |
//! | 0..32 | `nonce` | Fresh blinding randomness per proof |
//! | 32..64 | `tag` | Keyed hash binding circuit, nonce and statement |
//!
//! $$\text{tag} = \text{BLAKE2b-256}_{\text{key} = \text{circuit}}(
//!   \text{"MockProver-Proof"},\; \text{nonce} \| \text{statement})$$
//!
//! Anyone holding the [`CircuitId`] can produce a tag, so a mock proof is not
//! sound. It does preserve the two properties the engine relies on: proofs
//! are randomized, and a proof verifies against exactly one statement.

#![cfg_attr(not(feature = "std"), no_std)]

use rand_core::{CryptoRng, RngCore};

/// BLAKE2b personalization for proof tags.
const PROOF_PERSONALIZATION: &[u8; 16] = b"MockProver-Proof";

/// BLAKE2b personalization for circuit identifiers.
const CIRCUIT_PERSONALIZATION: &[u8; 16] = b"MockProver-Circt";

fn to_array(hash: &blake2b_simd::Hash) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(hash.as_bytes());
    bytes
}

/// Identifies the circuit a proof was produced for.
///
/// Proofs made for one circuit never verify under another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitId([u8; 32]);

impl CircuitId {
    /// Derive a circuit identifier from a label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let hash = blake2b_simd::Params::new()
            .hash_length(32)
            .personal(CIRCUIT_PERSONALIZATION)
            .hash(label.as_bytes());
        Self(to_array(&hash))
    }
}

impl From<[u8; 32]> for CircuitId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// A mock proof: blinding nonce plus tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proof {
    nonce: [u8; 32],
    tag: [u8; 32],
}

impl From<[u8; 64]> for Proof {
    fn from(bytes: [u8; 64]) -> Self {
        let (head, tail) = bytes.split_at(32);
        let mut nonce = [0u8; 32];
        let mut tag = [0u8; 32];
        nonce.copy_from_slice(head);
        tag.copy_from_slice(tail);
        Self { nonce, tag }
    }
}

impl From<Proof> for [u8; 64] {
    fn from(proof: Proof) -> Self {
        let mut bytes = [0u8; 64];
        let (head, tail) = bytes.split_at_mut(32);
        head.copy_from_slice(&proof.nonce);
        tail.copy_from_slice(&proof.tag);
        bytes
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Proof {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes: [u8; 64] = (*self).into();
        serde_big_array::BigArray::serialize(&bytes, serializer)
    }
}

#[cfg(feature = "serde")]
#[expect(clippy::missing_trait_methods, reason = "serde default is sufficient")]
impl<'de> serde::Deserialize<'de> for Proof {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: [u8; 64] = serde_big_array::BigArray::deserialize(deserializer)?;
        Ok(Self::from(bytes))
    }
}

/// Returned when a proof does not verify against a statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("proof does not verify against the statement")]
pub struct VerificationError;

fn tag(circuit: &CircuitId, nonce: &[u8; 32], statement: &[u8]) -> [u8; 32] {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .key(&circuit.0)
        .personal(PROOF_PERSONALIZATION)
        .to_state()
        .update(nonce)
        .update(statement)
        .finalize();
    to_array(&hash)
}

/// Produces proofs for a single circuit.
#[derive(Clone, Copy, Debug)]
pub struct Prover {
    circuit: CircuitId,
}

impl Prover {
    /// Create a prover for `circuit`.
    #[must_use]
    pub const fn new(circuit: CircuitId) -> Self {
        Self { circuit }
    }

    /// Prove `statement`.
    ///
    /// Every call draws a fresh nonce, so proving the same statement twice
    /// yields two different proofs.
    pub fn prove<R: RngCore + CryptoRng>(&self, statement: &[u8], rng: &mut R) -> Proof {
        let mut nonce = [0u8; 32];
        rng.fill_bytes(&mut nonce);
        Proof {
            nonce,
            tag: tag(&self.circuit, &nonce, statement),
        }
    }

    /// The verifier matching this prover's circuit.
    #[must_use]
    pub const fn verifier(&self) -> Verifier {
        Verifier {
            circuit: self.circuit,
        }
    }
}

/// Checks proofs for a single circuit.
#[derive(Clone, Copy, Debug)]
pub struct Verifier {
    circuit: CircuitId,
}

impl Verifier {
    /// Create a verifier for `circuit`.
    #[must_use]
    pub const fn new(circuit: CircuitId) -> Self {
        Self { circuit }
    }

    /// Verify `proof` against `statement`.
    pub fn verify(&self, statement: &[u8], proof: &Proof) -> Result<(), VerificationError> {
        if tag(&self.circuit, &proof.nonce, statement) == proof.tag {
            Ok(())
        } else {
            Err(VerificationError)
        }
    }
}
