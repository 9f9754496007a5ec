//! Per-owner note collections.
//!
//! The store is the client-side half of private state: it holds note
//! plaintexts, which never leave the client. The ledger only ever sees their
//! commitments and, once consumed, their nullifiers.
//!
//! Collections only grow. Consuming a note marks it nullified; the entry is
//! kept so that [`NoteStore::note_count`] reflects every note ever created.

use alloc::collections::BTreeMap;

use rand::{CryptoRng, RngCore};

use crate::{
    error::ExecutionError,
    keys::Identity,
    note::{Commitment, Note},
    value::Value,
};

#[derive(Clone, Copy, Debug)]
struct Entry {
    note: Note,
    nullified: bool,
}

/// The notes created and consumed by one settled transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NoteDelta {
    /// Notes to append.
    pub created: Vec<Note>,

    /// Consumed notes, to mark nullified.
    pub spent: Vec<Note>,
}

impl NoteDelta {
    /// Commitments of the created notes, in creation order.
    pub fn commitments(&self) -> impl Iterator<Item = Commitment> + '_ {
        self.created.iter().map(Note::commitment)
    }
}

/// Append-only, per-owner collections of notes.
#[derive(Clone, Debug, Default)]
#[expect(clippy::module_name_repetitions, reason = "reads as the component name")]
pub struct NoteStore {
    owners: BTreeMap<Identity, Vec<Entry>>,
}

impl NoteStore {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owners: BTreeMap::new(),
        }
    }

    /// Create a note of `amount` for `owner` with fresh randomness.
    ///
    /// Never consumes an existing note. Fails with
    /// [`OverflowOrInvalidAmount`](ExecutionError::OverflowOrInvalidAmount)
    /// if `amount` is negative or would push the owner's counter past
    /// [`Value::MAX`].
    pub fn add(
        &mut self,
        owner: Identity,
        amount: i64,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Commitment, ExecutionError> {
        let value = Value::try_from(amount)?;
        self.add_value(owner, value, rng)
            .map(|note| note.commitment())
    }

    pub(crate) fn add_value(
        &mut self,
        owner: Identity,
        value: Value,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Note, ExecutionError> {
        self.read_total(&owner)?.checked_add(value)?;
        let note = Note::new(owner, value, rng);
        self.push(note);
        Ok(note)
    }

    fn push(&mut self, note: Note) {
        self.owners.entry(note.owner).or_default().push(Entry {
            note,
            nullified: false,
        });
    }

    /// Sum of the owner's live notes.
    ///
    /// Reads plaintext values, so it must stay off every path that ends in a
    /// transaction. See [`get_counter`](crate::utility::get_counter).
    ///
    /// Fails with
    /// [`OverflowOrInvalidAmount`](ExecutionError::OverflowOrInvalidAmount)
    /// if the live notes sum past [`Value::MAX`], which settled notes never
    /// do.
    pub(crate) fn read_total(&self, owner: &Identity) -> Result<Value, ExecutionError> {
        Value::checked_sum(self.live_notes(owner).map(|note| &note.value))
    }

    /// The owner's notes that have not been nullified.
    pub fn live_notes(&self, owner: &Identity) -> impl Iterator<Item = &Note> + '_ {
        self.owners
            .get(owner)
            .into_iter()
            .flatten()
            .filter(|entry| !entry.nullified)
            .map(|entry| &entry.note)
    }

    /// Number of notes ever created for `owner`, nullified ones included.
    #[must_use]
    pub fn note_count(&self, owner: &Identity) -> usize {
        self.owners.get(owner).map_or(0, Vec::len)
    }

    /// Apply a settled transaction: append created notes and mark spent ones
    /// nullified.
    ///
    /// A spent note the store does not hold is ignored; this client never
    /// saw it.
    pub fn settle(&mut self, delta: NoteDelta) {
        for spent in &delta.spent {
            let cm = spent.commitment();
            if let Some(entry) = self
                .owners
                .get_mut(&spent.owner)
                .into_iter()
                .flatten()
                .find(|entry| !entry.nullified && entry.note.commitment() == cm)
            {
                entry.nullified = true;
            }
        }
        for note in delta.created {
            self.push(note);
        }
    }

    /// Remove every note of `owner`, returning the live ones.
    pub(crate) fn take_owner(&mut self, owner: &Identity) -> Vec<Note> {
        self.owners
            .remove(owner)
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| !entry.nullified)
            .map(|entry| entry.note)
            .collect()
    }

    /// All live notes, grouped by owner.
    pub(crate) fn into_notes(self) -> Vec<Note> {
        self.owners
            .into_values()
            .flatten()
            .filter(|entry| !entry.nullified)
            .map(|entry| entry.note)
            .collect()
    }
}
