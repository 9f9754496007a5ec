//! The ledger: global order, public state and the note accumulators.
//!
//! Stands in for block inclusion. Transactions are applied one at a time in
//! submission order; each one is validated in full and then either applied
//! completely or rejected with no effect.
//!
//! ## Validation
//!
//! 1. Origin signature over the sighash
//! 2. Proof against the statement rebuilt from public data
//! 3. Anchor: a commitment log root this ledger has had
//! 4. Call queue size
//! 5. Nullifier freshness, against the global set and within the transaction
//! 6. Public phase, run on a scratch copy of the public state
//!
//! Only if every step passes are the scratch state, nullifiers and
//! commitments committed.

use alloc::collections::BTreeSet;

use mock_prover::Verifier;
use tracing::{info, warn};

use crate::{
    access::AccessCell,
    config::Config,
    constants::COMMITMENT_LOG_PERSONALIZATION,
    error::ExecutionError,
    execution::{AggregateTotal, PublicContext, PublicState},
    keys::Identity,
    note::{Commitment, Nullifier},
    transaction::{Transaction, TxId},
};

/// Every nullifier ever published. Each appears at most once.
#[derive(Clone, Debug, Default)]
pub struct NullifierSet {
    nullifiers: BTreeSet<[u8; 32]>,
}

impl NullifierSet {
    /// Whether `nf` has been published.
    #[must_use]
    pub fn contains(&self, nf: &Nullifier) -> bool {
        self.nullifiers.contains(&<[u8; 32]>::from(*nf))
    }

    /// Check that none of `nullifiers` is published and that they are
    /// pairwise distinct. Fails with
    /// [`DoubleSpend`](ExecutionError::DoubleSpend) otherwise.
    pub fn check_fresh(&self, nullifiers: &[Nullifier]) -> Result<(), ExecutionError> {
        let mut batch = BTreeSet::new();
        for nf in nullifiers {
            let bytes = <[u8; 32]>::from(*nf);
            if self.nullifiers.contains(&bytes) || !batch.insert(bytes) {
                return Err(ExecutionError::DoubleSpend);
            }
        }
        Ok(())
    }

    /// Publish `nullifiers` as one batch: all of them, or none if
    /// [`check_fresh`](Self::check_fresh) fails.
    pub fn publish(&mut self, nullifiers: &[Nullifier]) -> Result<(), ExecutionError> {
        self.check_fresh(nullifiers)?;
        self.nullifiers
            .extend(nullifiers.iter().map(|nf| <[u8; 32]>::from(*nf)));
        Ok(())
    }

    /// Number of published nullifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nullifiers.len()
    }

    /// Whether nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nullifiers.is_empty()
    }
}

/// Append-only log of every note commitment, in application order.
#[derive(Clone, Debug, Default)]
pub struct CommitmentLog {
    entries: Vec<Commitment>,
}

impl CommitmentLog {
    /// Number of logged commitments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `cm` has been logged.
    #[must_use]
    pub fn contains(&self, cm: &Commitment) -> bool {
        self.entries.contains(cm)
    }

    /// Order-sensitive digest of the whole log.
    #[must_use]
    pub fn root(&self) -> Anchor {
        let mut state = blake2b_simd::Params::new()
            .hash_length(32)
            .personal(COMMITMENT_LOG_PERSONALIZATION)
            .to_state();
        for cm in &self.entries {
            state.update(&<[u8; 32]>::from(*cm));
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(state.finalize().as_bytes());
        Anchor(root)
    }

    fn extend(&mut self, commitments: Vec<Commitment>) {
        self.entries.extend(commitments);
    }
}

/// A [`CommitmentLog`] root that a transaction's consumed notes are proven
/// to be in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Anchor([u8; 32]);

impl From<[u8; 32]> for Anchor {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Anchor> for [u8; 32] {
    fn from(anchor: Anchor) -> Self {
        anchor.0
    }
}

impl AsRef<[u8]> for Anchor {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Proof of inclusion handed back for an applied transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Receipt {
    /// The applied transaction.
    pub id: TxId,

    /// Zero-based position in the global order.
    pub position: u64,

    /// Aggregate total right after the transaction.
    pub total: AggregateTotal,
}

/// The in-process sequencer.
#[derive(Clone, Debug)]
pub struct Ledger {
    state: PublicState,
    nullifiers: NullifierSet,
    commitments: CommitmentLog,
    anchors: BTreeSet<Anchor>,
    verifier: Verifier,
    max_calls: usize,
    height: u64,
}

impl Ledger {
    /// An empty ledger accepting proofs for `config`'s circuit.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let commitments = CommitmentLog::default();
        Self {
            state: PublicState::default(),
            nullifiers: NullifierSet::default(),
            anchors: BTreeSet::from([commitments.root()]),
            commitments,
            verifier: config.verifier(),
            max_calls: config.max_calls_per_transaction,
            height: 0,
        }
    }

    /// Set the privileged identity. Succeeds exactly once.
    pub fn initialize(&mut self, owner: Identity) -> Result<(), ExecutionError> {
        self.state.admin.initialize(owner).inspect_err(|err| {
            warn!(%err, "initialization rejected");
        })?;
        info!(admin = %owner, "access control initialized");
        Ok(())
    }

    /// Validate and apply `tx`.
    ///
    /// On error nothing changes: not the public state, not the nullifier
    /// set, not the commitment log.
    pub fn submit(&mut self, tx: Transaction) -> Result<Receipt, ExecutionError> {
        let id = tx.id();
        match self.apply(id, tx) {
            Ok(receipt) => {
                info!(
                    position = receipt.position,
                    total = %receipt.total,
                    "transaction applied"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(%err, height = self.height, "transaction rejected");
                Err(err)
            }
        }
    }

    fn apply(&mut self, id: TxId, tx: Transaction) -> Result<Receipt, ExecutionError> {
        tx.verify(&self.verifier)?;
        if !self.anchors.contains(&tx.anchor) {
            return Err(ExecutionError::UnknownAnchor);
        }
        if tx.calls.len() > self.max_calls {
            return Err(ExecutionError::QueueFull(self.max_calls));
        }
        self.nullifiers.check_fresh(&tx.nullifiers)?;

        let mut scratch = self.state;
        PublicContext::new(&mut scratch).execute(tx.calls)?;

        self.nullifiers.publish(&tx.nullifiers)?;
        self.state = scratch;
        self.commitments.extend(tx.commitments);
        self.anchors.insert(self.commitments.root());
        let position = self.height;
        self.height += 1;

        Ok(Receipt {
            id,
            position,
            total: self.state.total,
        })
    }

    /// The access control cell.
    #[must_use]
    pub const fn access_cell(&self) -> &AccessCell {
        &self.state.admin
    }

    /// Current aggregate total.
    #[must_use]
    pub const fn aggregate_total(&self) -> AggregateTotal {
        self.state.total
    }

    /// The privileged identity.
    pub fn admin(&self) -> Result<Identity, ExecutionError> {
        self.state.admin.read()
    }

    /// The global commitment log.
    #[must_use]
    pub const fn commitment_log(&self) -> &CommitmentLog {
        &self.commitments
    }

    /// The global nullifier set.
    #[must_use]
    pub const fn nullifier_set(&self) -> &NullifierSet {
        &self.nullifiers
    }

    /// Number of applied transactions.
    #[must_use]
    pub const fn height(&self) -> u64 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::{
        bridge::{CallQueue, DeferredCall, Selector},
        config::NoteMode,
        execution::PrivateContext,
        keys::SpendingKey,
        note::Note,
        store::NoteStore,
        value::Value,
    };

    fn increments(
        rng: &mut StdRng,
        ledger: &Ledger,
        notes: &NoteStore,
        config: &Config,
        sk: &SpendingKey,
        count: usize,
    ) -> Transaction {
        let mut ctx = PrivateContext::new(sk, notes, ledger.access_cell(), config);
        for _ in 0..count {
            ctx.increment(rng).unwrap();
        }
        Transaction::build(
            ctx.finish(),
            sk,
            ledger.commitment_log(),
            &config.prover(),
            rng,
        )
        .unwrap()
        .0
    }

    /// Re-prove and re-sign `tx` after editing it by hand.
    fn reseal(rng: &mut StdRng, tx: &mut Transaction, config: &Config, sk: &SpendingKey) {
        tx.proof = config.prover().prove(tx.statement().as_ref(), rng);
        tx.signature = sk.authorizing_key().sign(rng, tx.sighash().as_ref());
    }

    /// A merge-mode ledger where `sk` holds one settled note.
    fn merge_ledger(rng: &mut StdRng, sk: &SpendingKey) -> (Config, Ledger, NoteStore) {
        let config = Config {
            note_mode: NoteMode::MergeAndReplace,
            ..Config::default()
        };
        let mut ledger = Ledger::new(&config);
        let mut notes = NoteStore::new();
        let mut ctx = PrivateContext::new(sk, &notes, ledger.access_cell(), &config);
        ctx.increment(rng).unwrap();
        let (tx, delta) = Transaction::build(
            ctx.finish(),
            sk,
            ledger.commitment_log(),
            &config.prover(),
            rng,
        )
        .unwrap();
        ledger.submit(tx).unwrap();
        notes.settle(delta);
        (config, ledger, notes)
    }

    fn nullifier(rng: &mut StdRng) -> Nullifier {
        let sk = SpendingKey::from([0x77u8; 32]);
        Note::new(sk.identity(), Value::ONE, rng).nullifier(&sk.nullifier_key())
    }

    #[test]
    fn applies_in_order() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = Config::default();
        let mut ledger = Ledger::new(&config);
        let notes = NoteStore::new();
        let sk = SpendingKey::from([0x21u8; 32]);

        let first = increments(&mut rng, &ledger, &notes, &config, &sk, 2);
        let second = increments(&mut rng, &ledger, &notes, &config, &sk, 1);
        let logged = first.commitments.clone();
        let r1 = ledger.submit(first).unwrap();
        let r2 = ledger.submit(second).unwrap();

        assert_eq!((r1.position, u64::from(r1.total)), (0, 2));
        assert_eq!((r2.position, u64::from(r2.total)), (1, 3));
        assert_eq!(ledger.commitment_log().len(), 3);
        assert!(logged.iter().all(|cm| ledger.commitment_log().contains(cm)));
        assert!(ledger.nullifier_set().is_empty());
        assert_eq!(ledger.height(), 2);
    }

    #[test]
    fn initialize_exactly_once() {
        let config = Config::default();
        let mut ledger = Ledger::new(&config);
        let admin = SpendingKey::from([0x01u8; 32]).identity();
        let other = SpendingKey::from([0x02u8; 32]).identity();

        assert_eq!(ledger.admin(), Err(ExecutionError::Uninitialized));
        ledger.initialize(admin).unwrap();
        assert_eq!(
            ledger.initialize(other),
            Err(ExecutionError::AlreadyInitialized)
        );
        assert_eq!(ledger.admin(), Ok(admin));
    }

    /// Two transactions consuming the same note: the second is a double
    /// spend, even though its anchor is still a known one.
    #[test]
    fn double_spend_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let sk = SpendingKey::from([0x21u8; 32]);
        let (config, mut ledger, notes) = merge_ledger(&mut rng, &sk);

        let first = increments(&mut rng, &ledger, &notes, &config, &sk, 1);
        let replay = increments(&mut rng, &ledger, &notes, &config, &sk, 1);
        assert_eq!(first.nullifiers.len(), 1);
        ledger.submit(first).unwrap();

        let root = ledger.commitment_log().root();
        assert_eq!(ledger.submit(replay), Err(ExecutionError::DoubleSpend));
        assert_eq!(ledger.commitment_log().root(), root);
        assert_eq!(u64::from(ledger.aggregate_total()), 2);
        assert_eq!(ledger.nullifier_set().len(), 1);
    }

    #[test]
    fn duplicate_nullifier_within_transaction() {
        let mut rng = StdRng::seed_from_u64(2);
        let sk = SpendingKey::from([0x21u8; 32]);
        let (config, mut ledger, notes) = merge_ledger(&mut rng, &sk);

        let mut tx = increments(&mut rng, &ledger, &notes, &config, &sk, 1);
        let nf = *tx.nullifiers.first().unwrap();
        tx.nullifiers.push(nf);
        reseal(&mut rng, &mut tx, &config, &sk);

        assert_eq!(ledger.submit(tx), Err(ExecutionError::DoubleSpend));
        assert!(ledger.nullifier_set().is_empty());
        assert_eq!(ledger.height(), 1);
    }

    /// A failing call late in the queue undoes the earlier ones.
    #[test]
    fn public_phase_is_atomic() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = Config::default();
        let mut ledger = Ledger::new(&config);
        let sk = SpendingKey::from([0x21u8; 32]);
        let origin = sk.identity();

        let mut calls = CallQueue::new();
        calls.enqueue(DeferredCall {
            selector: Selector::aggregate_increment(),
            args: vec![1],
            origin,
        });
        calls.enqueue(DeferredCall {
            selector: Selector::from_signature("aggregate_reset()"),
            args: vec![],
            origin,
        });
        let mut tx = increments(&mut rng, &ledger, &NoteStore::new(), &config, &sk, 0);
        tx.calls = calls;
        reseal(&mut rng, &mut tx, &config, &sk);

        assert!(matches!(
            ledger.submit(tx),
            Err(ExecutionError::UnknownCall(_))
        ));
        assert_eq!(ledger.aggregate_total(), AggregateTotal::ZERO);
    }

    #[test]
    fn oversized_queue_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        let client = Config::default();
        let strict = Config {
            max_calls_per_transaction: 1,
            ..Config::default()
        };
        let mut ledger = Ledger::new(&strict);
        let notes = NoteStore::new();
        let sk = SpendingKey::from([0x21u8; 32]);

        let tx = increments(&mut rng, &ledger, &notes, &client, &sk, 2);
        assert_eq!(ledger.submit(tx), Err(ExecutionError::QueueFull(1)));
        assert!(ledger.commitment_log().is_empty());
    }

    #[test]
    fn unknown_anchor_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = Config::default();
        let mut ledger = Ledger::new(&config);
        let sk = SpendingKey::from([0x21u8; 32]);

        let mut tx = increments(&mut rng, &ledger, &NoteStore::new(), &config, &sk, 1);
        tx.anchor = Anchor::from([0x5au8; 32]);
        reseal(&mut rng, &mut tx, &config, &sk);

        assert_eq!(ledger.submit(tx), Err(ExecutionError::UnknownAnchor));
        assert!(ledger.commitment_log().is_empty());
        assert_eq!(ledger.aggregate_total(), AggregateTotal::ZERO);
    }

    /// A batch with a published or repeated nullifier publishes nothing.
    #[test]
    fn publish_is_all_or_nothing() {
        let mut rng = StdRng::seed_from_u64(6);
        let (first, second, third) = (
            nullifier(&mut rng),
            nullifier(&mut rng),
            nullifier(&mut rng),
        );
        let mut set = NullifierSet::default();

        set.publish(&[first]).unwrap();
        assert_eq!(
            set.publish(&[second, first]),
            Err(ExecutionError::DoubleSpend)
        );
        assert_eq!(
            set.publish(&[third, third]),
            Err(ExecutionError::DoubleSpend)
        );
        assert_eq!(set.len(), 1);
        assert!(!set.contains(&second));
        assert!(!set.contains(&third));

        set.check_fresh(&[second, third]).unwrap();
        set.publish(&[second, third]).unwrap();
        assert_eq!(set.len(), 3);
    }
}
