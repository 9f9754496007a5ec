//! The call bridge between the private and public phases.
//!
//! The private phase cannot touch shared state directly. Instead it records
//! what it wants done as [`DeferredCall`]s in a [`CallQueue`]. The queue
//! travels inside the transaction and the public phase drains it in order.
//!
//! The queue's [digest](CallQueue::digest) is part of the proof statement,
//! so a call cannot be dropped, duplicated or moved without invalidating the
//! transaction.

use core::fmt;

use crate::{
    constants::{
        AGGREGATE_INCREMENT_SIGNATURE, CALL_QUEUE_PERSONALIZATION, SELECTOR_PERSONALIZATION,
    },
    keys::Identity,
};

/// A 4-byte identifier of a public operation.
///
/// $$\text{selector} = \text{BLAKE2b-32}(\text{"Tally-Selector"},\;
///   \text{signature})$$
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector([u8; 4]);

impl Selector {
    /// Derive the selector of the operation with signature string `signature`,
    /// e.g. `"aggregate_increment(u64)"`.
    #[must_use]
    pub fn from_signature(signature: &str) -> Self {
        let hash = blake2b_simd::Params::new()
            .hash_length(4)
            .personal(SELECTOR_PERSONALIZATION)
            .hash(signature.as_bytes());
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(hash.as_bytes());
        Self(bytes)
    }

    /// Selector of `aggregate_increment(amount)`.
    #[must_use]
    pub fn aggregate_increment() -> Self {
        Self::from_signature(AGGREGATE_INCREMENT_SIGNATURE)
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl From<Selector> for [u8; 4] {
    fn from(selector: Selector) -> Self {
        selector.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A public operation requested by the private phase.
///
/// Carries the caller as `origin` but never the identity whose counter
/// changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredCall {
    /// Target operation.
    pub selector: Selector,

    /// Arguments, in order.
    pub args: Vec<u64>,

    /// Identity that ran the private phase.
    pub origin: Identity,
}

/// Ordered deferred calls of one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallQueue {
    calls: Vec<DeferredCall>,
}

impl CallQueue {
    /// An empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Append `call` after every call already queued.
    pub fn enqueue(&mut self, call: DeferredCall) {
        self.calls.push(call);
    }

    /// Number of queued calls.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether no call is queued.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Queued calls in enqueue order.
    pub fn iter(&self) -> core::slice::Iter<'_, DeferredCall> {
        self.calls.iter()
    }

    /// Order-sensitive digest of the queue.
    ///
    /// Each call is length-prefixed so that no two distinct queues encode to
    /// the same byte string.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut state = blake2b_simd::Params::new()
            .hash_length(32)
            .personal(CALL_QUEUE_PERSONALIZATION)
            .to_state();
        state.update(&u64::try_from(self.calls.len()).unwrap_or(u64::MAX).to_le_bytes());
        for call in &self.calls {
            state.update(&call.selector.0);
            state.update(call.origin.as_bytes());
            state.update(&u64::try_from(call.args.len()).unwrap_or(u64::MAX).to_le_bytes());
            for arg in &call.args {
                state.update(&arg.to_le_bytes());
            }
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(state.finalize().as_bytes());
        digest
    }
}

impl IntoIterator for CallQueue {
    type Item = DeferredCall;
    type IntoIter = alloc::vec::IntoIter<DeferredCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.into_iter()
    }
}

impl<'queue> IntoIterator for &'queue CallQueue {
    type Item = &'queue DeferredCall;
    type IntoIter = core::slice::Iter<'queue, DeferredCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}
