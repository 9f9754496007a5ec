//! Note keys: NullifierKey.

use ff::FromUniformBytes as _;
use pasta_curves::Fp;

use crate::constants::PrfExpand;

/// The nullifier deriving key `nk`.
///
/// Held only by the note owner. Combined with a note commitment it yields
/// that note's nullifier: $\mathsf{nf} = H(\mathsf{nk}, \mathsf{cm})$.
///
/// `nk` alone does not confer signing authority; it only allows consuming
/// (and observing the consumption of) the owner's notes.
#[derive(Clone, Copy, Debug)]
pub struct NullifierKey(Fp);

impl NullifierKey {
    /// Derive `nk` from raw spending key bytes.
    pub(super) fn from_sk(sk: &[u8; 32]) -> Self {
        Self(Fp::from_uniform_bytes(&PrfExpand::NK.with(sk)))
    }

    pub(crate) const fn inner(&self) -> &Fp {
        &self.0
    }
}
