//! ## Key Hierarchy
//!
//! Every caller holds one 32-byte [`SpendingKey`]. Everything else is derived
//! from it with domain-separated BLAKE2b (`PRF^expand`):
//!
//! ```text
//! SpendingKey sk
//!   +-- PRF^expand([0x00]) --> AuthorizingKey ask --> Identity  (encoded [ask]G)
//!   +-- PRF^expand([0x01]) --> NullifierKey   nk
//! ```
//!
//! ### Private keys ([`private`])
//!
//! - `sk`: root key, never leaves the client
//! - `ask`: signs transactions on behalf of the caller (RedPallas `SpendAuth`)
//!
//! ### Public keys ([`public`])
//!
//! - [`Identity`]: the caller's public identity, the encoded verification key
//!   of `ask`. Owners of notes, the privileged identity and the origin of
//!   deferred calls are all identities.
//!
//! ### Note keys
//!
//! - `nk`: derives nullifiers for the owner's notes. Only the owner can
//!   consume their own notes, which is why a privileged caller can add notes
//!   for someone else but never merge them.

pub mod private;
pub mod public;

mod note;
mod signature;

pub use note::NullifierKey;
pub use private::{AuthorizingKey, SpendingKey};
pub use public::Identity;
pub use signature::Signature;
