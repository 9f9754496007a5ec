//! The private counter, end to end.
//!
//! [`PrivateCounter`] wires the client (note store, prover) to the
//! [`Ledger`] and exposes the operation table:
//!
//! | Operation | Phase | Failure |
//! | --------- | ----- | ------- |
//! | [`initialize`](PrivateCounter::initialize) | public | `AlreadyInitialized` |
//! | [`increment`](PrivateCounter::increment) | private, then public | |
//! | [`increment_others`](PrivateCounter::increment_others) | private, then public | `AccessDenied` |
//! | [`get_counter`](PrivateCounter::get_counter) | utility | `OverflowOrInvalidAmount` on a corrupt store |
//! | [`aggregate_total`](PrivateCounter::aggregate_total) | public read | |
//! | [`admin`](PrivateCounter::admin) | public read | `Uninitialized` |
//!
//! A private operation runs the private phase, proves and signs the result,
//! submits it, and settles the staged notes only once the ledger accepts.

use rand::{CryptoRng, RngCore};

use mock_prover::Prover;

use crate::{
    config::Config,
    error::ExecutionError,
    execution::{AggregateTotal, PrivateContext},
    keys::{Identity, SpendingKey},
    ledger::{Ledger, Receipt},
    store::{NoteDelta, NoteStore},
    transaction::Transaction,
    utility,
    value::Value,
};

/// A private counter with a public aggregate.
#[derive(Debug)]
pub struct PrivateCounter<R> {
    config: Config,
    ledger: Ledger,
    notes: NoteStore,
    prover: Prover,
    rng: R,
}

impl<R: RngCore + CryptoRng> PrivateCounter<R> {
    /// A fresh counter: empty ledger, empty note store.
    #[must_use]
    pub fn new(config: Config, rng: R) -> Self {
        Self {
            ledger: Ledger::new(&config),
            prover: config.prover(),
            notes: NoteStore::new(),
            config,
            rng,
        }
    }

    /// Set the privileged identity. Succeeds exactly once.
    pub fn initialize(&mut self, owner: Identity) -> Result<(), ExecutionError> {
        self.ledger.initialize(owner)
    }

    /// Add one to `caller`'s own counter and to the aggregate.
    pub fn increment(&mut self, caller: &SpendingKey) -> Result<Receipt, ExecutionError> {
        self.execute(caller, |ctx, rng| ctx.increment(rng))
    }

    /// Add one to `target`'s counter and to the aggregate. Only the
    /// privileged identity may call this.
    pub fn increment_others(
        &mut self,
        caller: &SpendingKey,
        target: Identity,
    ) -> Result<Receipt, ExecutionError> {
        self.execute(caller, |ctx, rng| ctx.increment_others(target, rng))
    }

    /// Run `ops` as one transaction and submit it.
    ///
    /// Several private operations can share a transaction; the first error
    /// aborts all of them.
    pub fn execute<F>(&mut self, caller: &SpendingKey, ops: F) -> Result<Receipt, ExecutionError>
    where
        F: FnOnce(&mut PrivateContext<'_>, &mut R) -> Result<(), ExecutionError>,
    {
        let (tx, delta) = self.prepare(caller, ops)?;
        self.submit(tx, delta)
    }

    /// Run `ops` and build the transaction without submitting it.
    ///
    /// Nothing changes until the result goes through [`submit`](Self::submit).
    pub fn prepare<F>(
        &mut self,
        caller: &SpendingKey,
        ops: F,
    ) -> Result<(Transaction, NoteDelta), ExecutionError>
    where
        F: FnOnce(&mut PrivateContext<'_>, &mut R) -> Result<(), ExecutionError>,
    {
        let mut ctx =
            PrivateContext::new(caller, &self.notes, self.ledger.access_cell(), &self.config);
        ops(&mut ctx, &mut self.rng)?;
        Transaction::build(
            ctx.finish(),
            caller,
            self.ledger.commitment_log(),
            &self.prover,
            &mut self.rng,
        )
    }

    /// Submit `tx` and, if the ledger accepts it, settle `delta` into the
    /// note store. `delta` must come from the same [`prepare`](Self::prepare)
    /// call as `tx`.
    pub fn submit(
        &mut self,
        tx: Transaction,
        delta: NoteDelta,
    ) -> Result<Receipt, ExecutionError> {
        let receipt = self.ledger.submit(tx)?;
        self.notes.settle(delta);
        Ok(receipt)
    }

    /// `owner`'s counter. See [`utility::get_counter`] for why this must
    /// stay off transaction paths.
    pub fn get_counter(&self, owner: &Identity) -> Result<Value, ExecutionError> {
        utility::get_counter(&self.notes, owner)
    }

    /// The public aggregate total.
    #[must_use]
    pub const fn aggregate_total(&self) -> AggregateTotal {
        self.ledger.aggregate_total()
    }

    /// The privileged identity.
    pub fn admin(&self) -> Result<Identity, ExecutionError> {
        self.ledger.admin()
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The client's note store.
    #[must_use]
    pub const fn notes(&self) -> &NoteStore {
        &self.notes
    }
}
