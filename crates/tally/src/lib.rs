//! # tally
//!
//! Private per-owner counters with a publicly verifiable aggregate.
//!
//! Each owner's counter lives in committed notes that only the owner's
//! client can read. Every increment also bumps a public aggregate total, and
//! the aggregate always equals the sum of all private counters. Observers see
//! that *some* increment happened, never whose counter moved or by how much
//! it stands.
//!
//! ## Phases
//!
//! A transaction runs in two phases:
//!
//! - **Private** ([`PrivateContext`]): client side, against the caller's
//!   [`NoteStore`]. Stages new notes, nullifies consumed ones, and queues
//!   deferred calls on the [`CallQueue`].
//! - **Public** (inside [`Ledger::submit`]): ledger side, in the global
//!   order. Drains the call queue against the public state.
//!
//! Between the two, the client proves the private phase's public outputs
//! and signs the result as a [`Transaction`]. The ledger checks both, applies
//! the whole transaction or none of it, and only then does the client settle
//! its staged notes.
//!
//! ## Note Modes
//!
//! - [`NoteMode::Append`] (default): every increment adds a note; nothing is
//!   ever nullified.
//! - [`NoteMode::MergeAndReplace`]: a self-increment folds the caller's
//!   notes into one. Two transactions built on the same notes conflict, and
//!   the second is rejected as a double spend.
//!
//! ## Nomenclature
//!
//! - *Identity*: an encoded RedPallas verification key.
//! - *Commitment* / *nullifier*: what a note looks like on the ledger when it
//!   is created / consumed.
//! - *Selector*: 4-byte identifier of a public operation.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::pub_use, reason = "exporting items for consumers")]

extern crate alloc;

pub mod access;
pub mod bridge;
pub mod config;
pub mod constants;
pub mod contract;
pub mod error;
pub mod execution;
pub mod keys;
pub mod ledger;
pub mod note;
pub mod proof;
pub mod store;
pub mod transaction;
pub mod utility;
pub mod value;

pub use access::AccessCell;
pub use bridge::{CallQueue, DeferredCall, Selector};
pub use config::{Config, NoteMode};
pub use contract::PrivateCounter;
pub use error::ExecutionError;
pub use execution::{AggregateTotal, PrivateContext, PrivateExecution};
pub use keys::{Identity, SpendingKey};
pub use ledger::{Anchor, Ledger, Receipt};
pub use note::{Commitment, Note, Nullifier};
pub use proof::Proof;
pub use store::{NoteDelta, NoteStore};
pub use transaction::Transaction;
pub use value::Value;
