//! Private (signing) keys.

use ff::{Field as _, FromUniformBytes as _, PrimeField as _};
use pasta_curves::Fq;
use rand::{CryptoRng, RngCore};
use reddsa::orchard::SpendAuth;

use super::{note::NullifierKey, public::Identity, signature::Signature};
use crate::constants::PrfExpand;

/// A spending key: raw 32-byte entropy.
///
/// The root key from which the caller's [`Identity`], [`AuthorizingKey`] and
/// [`NullifierKey`] are derived. Whoever holds it can act as the caller.
#[derive(Clone, Copy, Debug)]
pub struct SpendingKey([u8; 32]);

impl From<[u8; 32]> for SpendingKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl SpendingKey {
    /// Derive `ask = ToScalar(PRF^expand_sk([0x00]))`.
    #[must_use]
    pub fn authorizing_key(&self) -> AuthorizingKey {
        let ask = Fq::from_uniform_bytes(&PrfExpand::ASK.with(&self.0));

        assert!(!bool::from(ask.is_zero()), "ask key should not be zero");
        #[expect(clippy::expect_used, reason = "canonical nonzero scalar")]
        let key = reddsa::SigningKey::<SpendAuth>::try_from(ask.to_repr())
            .expect("ask can derive a valid signing key");
        AuthorizingKey(key)
    }

    /// Derive `nk = ToBase(PRF^expand_sk([0x01]))`.
    #[must_use]
    pub fn nullifier_key(&self) -> NullifierKey {
        NullifierKey::from_sk(&self.0)
    }

    /// The public identity of this key's holder.
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.authorizing_key().identity()
    }
}

/// The authorizing key `ask`: signs transactions as their origin.
#[derive(Clone, Copy, Debug)]
pub struct AuthorizingKey(reddsa::SigningKey<SpendAuth>);

impl AuthorizingKey {
    /// The identity `[ask]G`, encoded.
    #[must_use]
    pub fn identity(&self) -> Identity {
        // reddsa::VerificationKey::from(&signing_key) performs [sk]G
        let vk = reddsa::VerificationKey::from(&self.0);
        Identity::from(<[u8; 32]>::from(vk))
    }

    /// Sign `msg`.
    pub fn sign(&self, rng: &mut (impl RngCore + CryptoRng), msg: &[u8]) -> Signature {
        Signature(self.0.sign(rng, msg))
    }
}
