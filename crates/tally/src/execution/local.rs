//! Private (client-side) execution.

use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::{
    access::AccessCell,
    bridge::{CallQueue, DeferredCall, Selector},
    config::{Config, NoteMode},
    error::ExecutionError,
    keys::{Identity, NullifierKey, SpendingKey},
    note::{Commitment, Note, Nullifier},
    store::{NoteDelta, NoteStore},
    value::Value,
};

/// The provable result of a private phase.
///
/// Only [`PrivateContext::finish`] produces one, and only
/// [`Transaction::build`](crate::Transaction::build) consumes it. The note
/// plaintexts stay private; everything else ends up in the transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
#[expect(clippy::field_scoped_visibility_modifiers, reason = "for internal use")]
pub struct PrivateExecution {
    /// The caller that ran the phase.
    pub(crate) origin: Identity,

    /// Notes created and consumed. Applied to the client's store once the
    /// transaction is accepted.
    pub(crate) delta: NoteDelta,

    /// Nullifiers of the consumed notes, in consumption order.
    pub(crate) nullifiers: Vec<Nullifier>,

    /// Deferred calls for the public phase.
    pub(crate) calls: CallQueue,
}

/// Runs private operations for one caller.
///
/// Nothing is written to the caller's store while the context is alive: new
/// notes are staged and consumed notes are recorded, and both are applied only
/// after the ledger accepts the resulting transaction. Dropping the context
/// discards everything.
///
/// Every operation checks its preconditions before staging anything, so a
/// failed operation leaves the context as it was. The enclosing transaction
/// is still expected to be abandoned.
#[derive(Debug)]
pub struct PrivateContext<'state> {
    caller: Identity,
    nk: NullifierKey,
    notes: &'state NoteStore,
    admin: &'state AccessCell,
    config: &'state Config,

    staged: NoteStore,
    spent: Vec<Note>,
    nullifiers: Vec<Nullifier>,
    calls: CallQueue,
}

impl<'state> PrivateContext<'state> {
    /// Open a context for the holder of `caller`.
    ///
    /// `notes` is the caller's view of committed notes; `admin` is the
    /// ledger's access control cell, which is public and write-once and so
    /// safe to read from the private phase.
    #[must_use]
    pub fn new(
        caller: &SpendingKey,
        notes: &'state NoteStore,
        admin: &'state AccessCell,
        config: &'state Config,
    ) -> Self {
        Self {
            caller: caller.identity(),
            nk: caller.nullifier_key(),
            notes,
            admin,
            config,
            staged: NoteStore::new(),
            spent: Vec::new(),
            nullifiers: Vec::new(),
            calls: CallQueue::new(),
        }
    }

    /// Add one to the caller's own counter.
    pub fn increment(&mut self, rng: &mut (impl RngCore + CryptoRng)) -> Result<(), ExecutionError> {
        self.reserve_call()?;
        match self.config.note_mode {
            NoteMode::Append => {
                self.staged.add_value(self.caller, Value::ONE, rng)?;
            }
            NoteMode::MergeAndReplace => self.merge_and_replace(rng)?,
        }
        self.emit_aggregate_increment();
        debug!(queued = self.calls.len(), "staged increment");
        Ok(())
    }

    /// Add one to `target`'s counter. Privileged identity only.
    ///
    /// Always appends: the caller holds no nullifier key for `target`'s notes.
    pub fn increment_others(
        &mut self,
        target: Identity,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(), ExecutionError> {
        self.admin.require_caller(&self.caller)?;
        self.reserve_call()?;
        self.staged.add_value(target, Value::ONE, rng)?;
        self.emit_aggregate_increment();
        debug!(queued = self.calls.len(), "staged privileged increment");
        Ok(())
    }

    /// Close the context.
    #[must_use]
    pub fn finish(self) -> PrivateExecution {
        PrivateExecution {
            origin: self.caller,
            delta: NoteDelta {
                created: self.staged.into_notes(),
                spent: self.spent,
            },
            nullifiers: self.nullifiers,
            calls: self.calls,
        }
    }

    fn reserve_call(&self) -> Result<(), ExecutionError> {
        let max = self.config.max_calls_per_transaction;
        if self.calls.len() >= max {
            return Err(ExecutionError::QueueFull(max));
        }
        Ok(())
    }

    fn emit_aggregate_increment(&mut self) {
        self.calls.enqueue(DeferredCall {
            selector: Selector::aggregate_increment(),
            args: vec![u64::from(Value::ONE)],
            origin: self.caller,
        });
    }

    /// Consume every live note of the caller, committed or staged, and stage
    /// one note carrying their sum plus one.
    fn merge_and_replace(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(), ExecutionError> {
        let consumed: Vec<Note> = self
            .notes
            .live_notes(&self.caller)
            .filter(|note| !self.is_spent(&note.commitment()))
            .copied()
            .collect();

        let mut sum = Value::ONE;
        for note in consumed
            .iter()
            .chain(self.staged.live_notes(&self.caller))
        {
            sum = sum.checked_add(note.value)?;
        }

        drop(self.staged.take_owner(&self.caller));
        for note in &consumed {
            self.spent.push(*note);
            self.nullifiers.push(note.nullifier(&self.nk));
        }
        self.staged.add_value(self.caller, sum, rng)?;
        Ok(())
    }

    fn is_spent(&self, cm: &Commitment) -> bool {
        self.spent.iter().any(|spent| spent.commitment() == *cm)
    }
}
