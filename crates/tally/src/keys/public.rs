//! Public keys and identities.

use core::fmt;

use reddsa::orchard::SpendAuth;

use super::signature::Signature;

/// A caller's public identity: the encoded RedPallas verification key
/// `[ask]G`.
///
/// Identities own notes, fill the access control cell, and travel as the
/// origin of deferred calls. An identity can verify its holder's
/// signatures; it cannot sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Identity([u8; 32]);

impl From<[u8; 32]> for Identity {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Identity> for [u8; 32] {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl Identity {
    /// The encoded verification key.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify `sig` over `msg` against this identity.
    ///
    /// Fails if the bytes do not encode a valid verification key or the
    /// signature does not verify.
    pub fn verify(&self, msg: &[u8], sig: &Signature) -> Result<(), reddsa::Error> {
        let vk = reddsa::VerificationKey::<SpendAuth>::try_from(self.0)?;
        vk.verify(msg, &sig.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
