//! Errors raised while executing or validating a transaction.
//!
//! Every variant aborts the enclosing transaction as a whole. Private-phase
//! errors surface while the client builds the transaction; the rest surface
//! when the ledger validates it. Nothing is retried automatically.

use crate::bridge::Selector;

/// Why a transaction could not be built or was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[expect(clippy::module_name_repetitions, reason = "one error type for the crate")]
pub enum ExecutionError {
    /// The caller is not the privileged identity.
    #[error("caller is not the privileged identity")]
    AccessDenied,

    /// The access control cell has already been set.
    #[error("access control cell is already initialized")]
    AlreadyInitialized,

    /// The access control cell was read before being set.
    #[error("access control cell is not initialized")]
    Uninitialized,

    /// A nullifier was already published, or appears twice in one
    /// transaction.
    #[error("nullifier has already been published")]
    DoubleSpend,

    /// An amount was negative, or adding it would overflow a counter or the
    /// aggregate.
    #[error("amount is negative or overflows the counter")]
    OverflowOrInvalidAmount,

    /// A deferred call targets no known public operation.
    #[error("no public operation with selector {0}")]
    UnknownCall(Selector),

    /// A deferred call carries the wrong number of arguments.
    #[error("call to {selector} expects {expected} argument(s), got {got}")]
    MalformedCall {
        /// Target of the call.
        selector: Selector,
        /// Arity of the target operation.
        expected: usize,
        /// Arguments actually supplied.
        got: usize,
    },

    /// A transaction carries more deferred calls than allowed.
    #[error("a transaction carries at most {0} deferred calls")]
    QueueFull(usize),

    /// A private execution does not satisfy the transaction relation, so no
    /// proof is produced for it.
    #[error("private execution does not satisfy the transaction relation")]
    InvalidWitness,

    /// A transaction is anchored to a commitment log root the ledger never
    /// had.
    #[error("unknown commitment log anchor")]
    UnknownAnchor,

    /// The proof does not verify against the transaction's public inputs.
    #[error("proof does not verify against the public inputs")]
    InvalidProof,

    /// The origin's signature over the transaction does not verify.
    #[error("origin signature does not verify")]
    InvalidSignature,
}
