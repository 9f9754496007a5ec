//! Out-of-band reads of private state.
//!
//! # Privacy
//!
//! Everything here reads note plaintexts directly. Nothing in this module
//! may feed a transaction: a value read here and then proven or published
//! would reveal an individual counter. Use it for inspection and tests only.

use crate::{error::ExecutionError, keys::Identity, store::NoteStore, value::Value};

/// Current value of `owner`'s counter: the sum of their live notes.
///
/// Pure read. Emits no commitment, nullifier or proof.
///
/// Fails with
/// [`OverflowOrInvalidAmount`](ExecutionError::OverflowOrInvalidAmount)
/// only if the live notes sum past [`Value::MAX`]. Notes settled from
/// accepted transactions never do, since the public aggregate bounds every
/// counter.
pub fn get_counter(notes: &NoteStore, owner: &Identity) -> Result<Value, ExecutionError> {
    notes.read_total(owner)
}
