//! The two execution phases.
//!
//! - [`PrivateContext`] runs on the client against its own notes. It stages
//!   notes and nullifiers and records deferred calls. Its output,
//!   [`PrivateExecution`], is what gets proven.
//! - The public phase runs on the ledger, in the global order, and applies
//!   the deferred calls to the public state. It is only reachable through a
//!   submitted transaction's call queue.

mod global;
mod local;

pub use global::AggregateTotal;
pub(crate) use global::{PublicContext, PublicState};
pub use local::{PrivateContext, PrivateExecution};
