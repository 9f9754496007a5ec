//! Transactions: the public face of a private phase.
//!
//! A transaction carries only public data. Note plaintexts stay on the
//! client; the ledger sees commitments, nullifiers, the call queue, a proof
//! and the origin's signature.
//!
//! ## Authorization
//!
//! $$\text{sighash} = \text{BLAKE2b-512}(\text{"Tally-TxSigHash"},\;
//!   \text{statement} \| \text{proof})$$
//!
//! The origin signs the sighash with its authorizing key. The ledger checks
//! the signature under the origin [`Identity`] before anything else.

use mock_prover::{Prover, Verifier};
use rand::{CryptoRng, RngCore};

use crate::{
    bridge::CallQueue,
    constants::{SIGHASH_PERSONALIZATION, TX_ID_PERSONALIZATION},
    error::ExecutionError,
    execution::PrivateExecution,
    keys::{Identity, Signature, SpendingKey},
    ledger::{Anchor, CommitmentLog},
    note::{Commitment, Nullifier},
    proof::{Proof, Statement, Witness},
    store::NoteDelta,
};

/// BLAKE2b-512 digest signed by the transaction's origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SigHash([u8; 64]);

impl AsRef<[u8]> for SigHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Transaction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxId([u8; 32]);

impl From<TxId> for [u8; 32] {
    fn from(id: TxId) -> Self {
        id.0
    }
}

/// A proven, signed transaction ready for submission.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    /// Identity that ran the private phase and signs the transaction.
    pub origin: Identity,

    /// Commitment log root the consumed notes are proven against.
    pub anchor: Anchor,

    /// Commitments of the created notes, sorted by encoding so that their
    /// order says nothing about how they were created.
    pub commitments: Vec<Commitment>,

    /// Nullifiers of the consumed notes.
    pub nullifiers: Vec<Nullifier>,

    /// Deferred calls for the public phase.
    pub calls: CallQueue,

    /// Proof over the [`statement`](Self::statement).
    pub proof: Proof,

    /// Origin's signature over the [`sighash`](Self::sighash).
    pub signature: Signature,
}

impl Transaction {
    /// Prove and sign a private phase's output.
    ///
    /// `sk` must be the key the private phase ran under and `log` the
    /// commitment log its consumed notes were read from. Returns the
    /// transaction together with the note delta the client applies once the
    /// ledger accepts it.
    ///
    /// Fails with [`InvalidWitness`](ExecutionError::InvalidWitness) if the
    /// execution does not satisfy the relation described in
    /// [`proof`](crate::proof).
    pub fn build(
        execution: PrivateExecution,
        sk: &SpendingKey,
        log: &CommitmentLog,
        prover: &Prover,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<(Self, NoteDelta), ExecutionError> {
        let witness = Witness::new(&execution, sk, log);
        let anchor = log.root();
        let commitments = witness.commitments();
        let statement = witness.statement();
        let proof = statement.prove(&witness, prover, rng)?;
        let signature = sk
            .authorizing_key()
            .sign(rng, sighash(&statement, &proof).as_ref());

        let PrivateExecution {
            origin,
            delta,
            nullifiers,
            calls,
        } = execution;
        let tx = Self {
            origin,
            anchor,
            commitments,
            nullifiers,
            calls,
            proof,
            signature,
        };
        Ok((tx, delta))
    }

    /// Rebuild the statement from this transaction's public inputs.
    #[must_use]
    pub fn statement(&self) -> Statement {
        Statement::new(
            &self.origin,
            &self.anchor,
            &self.commitments,
            &self.nullifiers,
            &self.calls,
        )
    }

    /// The digest the origin signs.
    #[must_use]
    pub fn sighash(&self) -> SigHash {
        sighash(&self.statement(), &self.proof)
    }

    /// Identifier of this transaction.
    #[must_use]
    pub fn id(&self) -> TxId {
        let hash = blake2b_simd::Params::new()
            .hash_length(32)
            .personal(TX_ID_PERSONALIZATION)
            .to_state()
            .update(self.sighash().as_ref())
            .update(&<[u8; 64]>::from(self.signature))
            .finalize();
        let mut id = [0u8; 32];
        id.copy_from_slice(hash.as_bytes());
        TxId(id)
    }

    /// Check the origin's signature, then the proof.
    pub fn verify(&self, verifier: &Verifier) -> Result<(), ExecutionError> {
        let statement = self.statement();
        self.origin
            .verify(sighash(&statement, &self.proof).as_ref(), &self.signature)
            .map_err(|_err| ExecutionError::InvalidSignature)?;
        statement.verify(verifier, &self.proof)
    }
}

fn sighash(statement: &Statement, proof: &Proof) -> SigHash {
    let hash = blake2b_simd::Params::new()
        .hash_length(64)
        .personal(SIGHASH_PERSONALIZATION)
        .to_state()
        .update(statement.as_ref())
        .update(&<[u8; 64]>::from(*proof))
        .finalize();
    SigHash(*hash.as_array())
}

#[cfg(test)]
mod tests {
    use mock_prover::CircuitId;
    use rand::{SeedableRng as _, rngs::StdRng};

    use super::*;
    use crate::{
        access::AccessCell,
        bridge::{DeferredCall, Selector},
        config::{Config, NoteMode},
        execution::PrivateContext,
        ledger::Ledger,
        note::Note,
        store::NoteStore,
        value::Value,
    };

    fn increment_call(origin: Identity, amount: u64) -> DeferredCall {
        DeferredCall {
            selector: Selector::aggregate_increment(),
            args: vec![amount],
            origin,
        }
    }

    fn executed(rng: &mut StdRng, sk: &SpendingKey, count: usize) -> PrivateExecution {
        let config = Config::default();
        let notes = NoteStore::new();
        let cell = AccessCell::new();
        let mut ctx = PrivateContext::new(sk, &notes, &cell, &config);
        for _ in 0..count {
            ctx.increment(rng).unwrap();
        }
        ctx.finish()
    }

    fn built(rng: &mut StdRng, sk: &SpendingKey) -> (Transaction, Prover) {
        let prover = Config::default().prover();
        let execution = executed(rng, sk, 2);
        let (tx, _) =
            Transaction::build(execution, sk, &CommitmentLog::default(), &prover, rng).unwrap();
        (tx, prover)
    }

    /// A ledger holding one settled note of `sk`'s, and the store that
    /// holds its plaintext.
    fn settled(rng: &mut StdRng, sk: &SpendingKey) -> (Ledger, NoteStore) {
        let config = Config::default();
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
        (ledger, notes)
    }

    fn merged(rng: &mut StdRng, sk: &SpendingKey, notes: &NoteStore) -> PrivateExecution {
        let config = Config {
            note_mode: NoteMode::MergeAndReplace,
            ..Config::default()
        };
        let cell = AccessCell::new();
        let mut ctx = PrivateContext::new(sk, notes, &cell, &config);
        ctx.increment(rng).unwrap();
        ctx.finish()
    }

    #[test]
    fn built_transaction_verifies() {
        let mut rng = StdRng::seed_from_u64(0);
        let sk = SpendingKey::from([0x11u8; 32]);
        let (tx, prover) = built(&mut rng, &sk);

        assert_eq!(tx.origin, sk.identity());
        assert_eq!(tx.anchor, CommitmentLog::default().root());
        assert_eq!(tx.commitments.len(), 2);
        tx.verify(&prover.verifier()).unwrap();
    }

    #[test]
    fn tampered_calls_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let sk = SpendingKey::from([0x11u8; 32]);
        let (mut tx, prover) = built(&mut rng, &sk);

        tx.calls.enqueue(increment_call(sk.identity(), 1));
        assert_eq!(
            tx.verify(&prover.verifier()),
            Err(ExecutionError::InvalidSignature)
        );
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let sk = SpendingKey::from([0x11u8; 32]);
        let (mut tx, prover) = built(&mut rng, &sk);

        let mallory = SpendingKey::from([0x66u8; 32]);
        tx.signature = mallory.authorizing_key().sign(&mut rng, tx.sighash().as_ref());
        assert_eq!(
            tx.verify(&prover.verifier()),
            Err(ExecutionError::InvalidSignature)
        );
    }

    /// A correctly signed transaction whose proof was made for another
    /// circuit still fails.
    #[test]
    fn wrong_circuit_proof_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let sk = SpendingKey::from([0x11u8; 32]);
        let (mut tx, prover) = built(&mut rng, &sk);

        let other = Prover::new(CircuitId::from_label("other"));
        tx.proof = other.prove(tx.statement().as_ref(), &mut rng);
        tx.signature = sk.authorizing_key().sign(&mut rng, tx.sighash().as_ref());
        assert_eq!(
            tx.verify(&prover.verifier()),
            Err(ExecutionError::InvalidProof)
        );
    }

    #[test]
    fn ids_differ_per_transaction() {
        let mut rng = StdRng::seed_from_u64(4);
        let sk = SpendingKey::from([0x11u8; 32]);
        let (first, _) = built(&mut rng, &sk);
        let (second, _) = built(&mut rng, &sk);
        assert_ne!(first.id(), second.id());
        assert_eq!(first.id(), first.id());
    }

    /// An aggregate bump with no matching note is never proven.
    #[test]
    fn inflated_increment_is_not_provable() {
        let mut rng = StdRng::seed_from_u64(5);
        let sk = SpendingKey::from([0x11u8; 32]);
        let mut calls = CallQueue::new();
        calls.enqueue(increment_call(sk.identity(), 1000));
        let execution = PrivateExecution {
            origin: sk.identity(),
            delta: NoteDelta::default(),
            nullifiers: vec![],
            calls,
        };

        assert_eq!(
            Transaction::build(
                execution,
                &sk,
                &CommitmentLog::default(),
                &Config::default().prover(),
                &mut rng,
            )
            .map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );
    }

    /// Calls and created value must match one for one.
    #[test]
    fn calls_must_match_created_notes() {
        let mut rng = StdRng::seed_from_u64(6);
        let sk = SpendingKey::from([0x11u8; 32]);
        let prover = Config::default().prover();
        let log = CommitmentLog::default();

        let mut extra_call = executed(&mut rng, &sk, 1);
        extra_call.calls.enqueue(increment_call(sk.identity(), 1));
        assert_eq!(
            Transaction::build(extra_call, &sk, &log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );

        let mut extra_note = executed(&mut rng, &sk, 1);
        extra_note
            .delta
            .created
            .push(Note::new(sk.identity(), Value::ONE, &mut rng));
        assert_eq!(
            Transaction::build(extra_note, &sk, &log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );

        let mut foreign_origin = executed(&mut rng, &sk, 1);
        foreign_origin.calls = CallQueue::new();
        let mallory = SpendingKey::from([0x66u8; 32]).identity();
        foreign_origin.calls.enqueue(increment_call(mallory, 1));
        assert_eq!(
            Transaction::build(foreign_origin, &sk, &log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );
    }

    /// The witness key must be the origin's.
    #[test]
    fn foreign_key_is_not_provable() {
        let mut rng = StdRng::seed_from_u64(7);
        let sk = SpendingKey::from([0x11u8; 32]);
        let mallory = SpendingKey::from([0x66u8; 32]);
        let execution = executed(&mut rng, &sk, 1);

        assert_eq!(
            Transaction::build(
                execution,
                &mallory,
                &CommitmentLog::default(),
                &Config::default().prover(),
                &mut rng,
            )
            .map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );
    }

    /// Consumed notes need the owner's nullifier and a place in the log.
    #[test]
    fn consumed_notes_are_checked() {
        let mut rng = StdRng::seed_from_u64(8);
        let sk = SpendingKey::from([0x11u8; 32]);
        let prover = Config::default().prover();
        let (ledger, notes) = settled(&mut rng, &sk);
        let log = ledger.commitment_log();

        let honest = merged(&mut rng, &sk, &notes);
        let (tx, _) = Transaction::build(honest, &sk, log, &prover, &mut rng).unwrap();
        assert_eq!(tx.nullifiers.len(), 1);
        assert_eq!(tx.anchor, log.root());

        let mut wrong_nf = merged(&mut rng, &sk, &notes);
        let other_nk = SpendingKey::from([0x66u8; 32]).nullifier_key();
        wrong_nf.nullifiers = wrong_nf
            .delta
            .spent
            .iter()
            .map(|note| note.nullifier(&other_nk))
            .collect();
        assert_eq!(
            Transaction::build(wrong_nf, &sk, log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );

        let mut missing_nf = merged(&mut rng, &sk, &notes);
        missing_nf.nullifiers.clear();
        assert_eq!(
            Transaction::build(missing_nf, &sk, log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );

        let mut unlogged = notes.clone();
        unlogged.add(sk.identity(), 1000, &mut rng).unwrap();
        let fabricated = merged(&mut rng, &sk, &unlogged);
        assert_eq!(
            Transaction::build(fabricated, &sk, log, &prover, &mut rng).map(|_built| ()),
            Err(ExecutionError::InvalidWitness)
        );
    }
}
