//! Transaction proofs.
//!
//! The proof system is an external service; this module only fixes what gets
//! proven. The client proves a [`Statement`] built from the transaction's
//! public inputs:
//!
//! $$\text{statement} = \text{BLAKE2b-512}(\text{"Tally-Statement"},\;
//!   \mathsf{origin} \| \mathsf{anchor} \| \#\mathsf{cm} \| \mathsf{cm}_i \|
//!   \#\mathsf{nf} \| \mathsf{nf}_j \| \text{digest(calls)})$$
//!
//! ## Relation
//!
//! A proof is only produced for a [`Witness`] that satisfies the relation:
//!
//! - the witness key is the origin's
//! - every consumed note is owned by the origin, appears in the anchored
//!   commitment log, and has the published nullifier at the same position
//! - every call is `aggregate_increment(1)` issued by the origin
//! - created value equals consumed value plus the number of calls
//! - the commitments are exactly those of the created notes
//!
//! The last two make the public aggregate move by exactly what the private
//! counters gain.
//!
//! ## Verification
//!
//! The statement is not transmitted. The ledger rebuilds it from the public
//! data it received and checks the proof against that, so any change to the
//! commitments, nullifiers or call queue after proving is caught.

use mock_prover::{Prover, Verifier};
use rand::{CryptoRng, RngCore};

pub use mock_prover::Proof;

use crate::{
    bridge::{CallQueue, Selector},
    constants::STATEMENT_PERSONALIZATION,
    error::ExecutionError,
    execution::PrivateExecution,
    keys::{Identity, SpendingKey},
    ledger::{Anchor, CommitmentLog},
    note::{Commitment, Nullifier},
    value::Value,
};

/// Digest of a transaction's public inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statement([u8; 64]);

impl Statement {
    /// Build the statement for the given public inputs.
    ///
    /// Commitments and nullifiers are hashed in the order given.
    #[must_use]
    pub fn new(
        origin: &Identity,
        anchor: &Anchor,
        commitments: &[Commitment],
        nullifiers: &[Nullifier],
        calls: &CallQueue,
    ) -> Self {
        let mut state = blake2b_simd::Params::new()
            .hash_length(64)
            .personal(STATEMENT_PERSONALIZATION)
            .to_state();
        state.update(origin.as_bytes());
        state.update(anchor.as_ref());
        state.update(&len_bytes(commitments.len()));
        for cm in commitments {
            state.update(&<[u8; 32]>::from(*cm));
        }
        state.update(&len_bytes(nullifiers.len()));
        for nf in nullifiers {
            state.update(&<[u8; 32]>::from(*nf));
        }
        state.update(&calls.digest());
        Self(*state.finalize().as_array())
    }

    /// Prove this statement from `witness`.
    ///
    /// Fails with [`InvalidWitness`](ExecutionError::InvalidWitness) unless
    /// the witness satisfies the relation and its public part is this
    /// statement.
    pub(crate) fn prove(
        &self,
        witness: &Witness<'_>,
        prover: &Prover,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Proof, ExecutionError> {
        if *self != witness.statement() {
            return Err(ExecutionError::InvalidWitness);
        }
        witness.check()?;
        Ok(prover.prove(&self.0, rng))
    }

    /// Check `proof` against this statement.
    pub fn verify(&self, verifier: &Verifier, proof: &Proof) -> Result<(), ExecutionError> {
        verifier
            .verify(&self.0, proof)
            .map_err(|_err| ExecutionError::InvalidProof)
    }
}

impl AsRef<[u8]> for Statement {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Private inputs to a proof.
///
/// The full output of a private phase, the key it ran under, and the
/// commitment log its consumed notes were read from.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Witness<'exec> {
    execution: &'exec PrivateExecution,
    sk: &'exec SpendingKey,
    log: &'exec CommitmentLog,
}

impl<'exec> Witness<'exec> {
    pub(crate) const fn new(
        execution: &'exec PrivateExecution,
        sk: &'exec SpendingKey,
        log: &'exec CommitmentLog,
    ) -> Self {
        Self { execution, sk, log }
    }

    /// Commitments of the created notes, sorted by encoding.
    pub(crate) fn commitments(&self) -> Vec<Commitment> {
        let mut commitments: Vec<Commitment> = self.execution.delta.commitments().collect();
        commitments.sort_by_key(|cm| <[u8; 32]>::from(*cm));
        commitments
    }

    /// The public inputs this witness attests to.
    pub(crate) fn statement(&self) -> Statement {
        Statement::new(
            &self.execution.origin,
            &self.log.root(),
            &self.commitments(),
            &self.execution.nullifiers,
            &self.execution.calls,
        )
    }

    fn check(&self) -> Result<(), ExecutionError> {
        let execution = self.execution;
        let origin = execution.origin;
        if self.sk.identity() != origin {
            return Err(ExecutionError::InvalidWitness);
        }

        let nk = self.sk.nullifier_key();
        let spent = &execution.delta.spent;
        if spent.len() != execution.nullifiers.len()
            || spent.iter().zip(&execution.nullifiers).any(|(note, nf)| {
                note.owner != origin
                    || note.nullifier(&nk) != *nf
                    || !self.log.contains(&note.commitment())
            })
        {
            return Err(ExecutionError::InvalidWitness);
        }

        let increment = Selector::aggregate_increment();
        let one = u64::from(Value::ONE);
        if execution.calls.iter().any(|call| {
            call.selector != increment || call.args != [one] || call.origin != origin
        }) {
            return Err(ExecutionError::InvalidWitness);
        }

        let created = Value::checked_sum(execution.delta.created.iter().map(|note| &note.value))?;
        let consumed = Value::checked_sum(spent.iter().map(|note| &note.value))?;
        let increments = u64::try_from(execution.calls.len())
            .map_err(|_err| ExecutionError::InvalidWitness)?;
        if consumed.checked_add(Value::try_from(increments)?)? != created {
            return Err(ExecutionError::InvalidWitness);
        }
        Ok(())
    }
}

fn len_bytes(len: usize) -> [u8; 8] {
    u64::try_from(len).unwrap_or(u64::MAX).to_le_bytes()
}
