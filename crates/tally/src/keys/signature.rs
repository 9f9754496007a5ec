//! Signature type bridging private (sign) and public (verify) keys.

use reddsa::orchard::SpendAuth;

/// A transaction authorization signature (RedPallas over `SpendAuth`).
#[derive(Clone, Copy, Debug)]
#[expect(clippy::field_scoped_visibility_modifiers, reason = "for internal use")]
pub struct Signature(pub(super) reddsa::Signature<SpendAuth>);

impl From<[u8; 64]> for Signature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(reddsa::Signature::<SpendAuth>::from(bytes))
    }
}

impl From<Signature> for [u8; 64] {
    fn from(sig: Signature) -> Self {
        <[u8; 64]>::from(sig.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Signature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bytes: [u8; 64] = (*self).into();
        serde_big_array::BigArray::serialize(&bytes, serializer)
    }
}

#[cfg(feature = "serde")]
#[expect(clippy::missing_trait_methods, reason = "serde default is sufficient")]
impl<'de> serde::Deserialize<'de> for Signature {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: [u8; 64] = serde_big_array::BigArray::deserialize(deserializer)?;
        Ok(Self::from(bytes))
    }
}
