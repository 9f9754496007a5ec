//! Notes, note commitments and nullifiers.
//!
//! A note is one committed fragment of an owner's private counter. Notes are
//! immutable: an increment never edits an existing note, it adds a new one.
//!
//! ## Note Structure
//!
//! | Field | Type | Description |
//! | ----- | ---- | ----------- |
//! | `owner` | [`Identity`] | Whose counter the note belongs to |
//! | `value` | [`Value`] | Value fragment |
//! | `rcm` | [`CommitmentTrapdoor`] | Fresh randomness blinding the commitment |
//!
//! ## Note Commitment
//!
//! $$\mathsf{cm} = \text{ToBase}(\text{BLAKE2b-512}(\text{"Tally-NoteCommit"},\;
//!   \mathsf{owner} \| v \| \mathsf{rcm}))$$
//!
//! The commitment is the only trace of a note that leaves the client. Fresh
//! `rcm` makes two notes with the same owner and value unlinkable.
//!
//! ## Nullifier Derivation
//!
//! $$\mathsf{nf} = \text{ToBase}(\text{BLAKE2b-512}(\text{"Tally-Nullifier"},\;
//!   \mathsf{nk} \| \mathsf{cm}))$$
//!
//! Deterministic per (owner, note), so consuming the same note twice
//! publishes the same nullifier twice, which the ledger rejects.

use ff::{Field as _, FromUniformBytes as _, PrimeField as _};
use pasta_curves::Fp;
use rand::{CryptoRng, RngCore};

use crate::{
    constants::{NOTE_COMMITMENT_PERSONALIZATION, NULLIFIER_PERSONALIZATION},
    keys::{Identity, NullifierKey},
    value::Value,
};

/// Note commitment trapdoor `rcm`: randomness that blinds the commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentTrapdoor(Fp);

impl CommitmentTrapdoor {
    /// Sample a fresh trapdoor.
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self(Fp::random(rng))
    }
}

impl From<Fp> for CommitmentTrapdoor {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

/// A note: one value fragment of an owner's private counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Note {
    /// The identity whose counter this note belongs to.
    pub owner: Identity,

    /// The value fragment.
    pub value: Value,

    /// Commitment randomness.
    pub rcm: CommitmentTrapdoor,
}

impl Note {
    /// Create a note for `owner` with fresh randomness.
    pub fn new(owner: Identity, value: Value, rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self {
            owner,
            value,
            rcm: CommitmentTrapdoor::random(rng),
        }
    }

    /// Computes the note commitment `cm`.
    #[must_use]
    pub fn commitment(&self) -> Commitment {
        let hash = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(NOTE_COMMITMENT_PERSONALIZATION)
            .to_state()
            .update(self.owner.as_bytes())
            .update(&self.value.to_le_bytes())
            .update(&self.rcm.0.to_repr())
            .finalize();
        Commitment(Fp::from_uniform_bytes(hash.as_array()))
    }

    /// Derives this note's nullifier under the owner's nullifier key.
    ///
    /// Only meaningful when `nk` belongs to [`owner`](Self::owner); a
    /// nullifier derived with anyone else's key never matches the owner's.
    #[must_use]
    pub fn nullifier(&self, nk: &NullifierKey) -> Nullifier {
        let hash = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(NULLIFIER_PERSONALIZATION)
            .to_state()
            .update(&nk.inner().to_repr())
            .update(&Fp::from(self.commitment()).to_repr())
            .finalize();
        Nullifier(Fp::from_uniform_bytes(hash.as_array()))
    }
}

/// A note commitment `cm`.
///
/// Published in the global commitment log when the transaction creating the
/// note is applied. Reveals neither owner nor value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "[u8; 32]", try_from = "[u8; 32]"))]
pub struct Commitment(Fp);

impl From<Fp> for Commitment {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

impl From<Commitment> for Fp {
    fn from(cm: Commitment) -> Self {
        cm.0
    }
}

impl From<Commitment> for [u8; 32] {
    fn from(cm: Commitment) -> Self {
        cm.0.to_repr()
    }
}

impl TryFrom<[u8; 32]> for Commitment {
    type Error = &'static str;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        Option::from(Fp::from_repr(bytes))
            .map(Self)
            .ok_or("invalid field element")
    }
}

/// A nullifier `nf`.
///
/// Published when a note is consumed. Reveals that *some* note was consumed,
/// not which one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "[u8; 32]", try_from = "[u8; 32]"))]
pub struct Nullifier(Fp);

impl From<Fp> for Nullifier {
    fn from(fp: Fp) -> Self {
        Self(fp)
    }
}

impl From<Nullifier> for Fp {
    fn from(nf: Nullifier) -> Self {
        nf.0
    }
}

impl From<Nullifier> for [u8; 32] {
    fn from(nf: Nullifier) -> Self {
        nf.0.to_repr()
    }
}

impl TryFrom<[u8; 32]> for Nullifier {
    type Error = &'static str;

    fn try_from(bytes: [u8; 32]) -> Result<Self, Self::Error> {
        Option::from(Fp::from_repr(bytes))
            .map(Self)
            .ok_or("invalid field element")
    }
}
