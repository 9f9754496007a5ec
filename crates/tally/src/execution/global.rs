//! Public (ledger-side) execution.

use core::fmt;

use crate::{
    access::AccessCell,
    bridge::{CallQueue, DeferredCall, Selector},
    constants::COUNTER_MAX,
    error::ExecutionError,
};

/// The public aggregate: sum of every private counter.
///
/// Only ever grows, and never past [`COUNTER_MAX`]. Because it bounds every
/// individual counter, no private counter can overflow once settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateTotal(u64);

impl AggregateTotal {
    /// The initial total.
    pub const ZERO: Self = Self(0);

    /// Add `amount`, failing past [`COUNTER_MAX`].
    pub fn checked_add(self, amount: u64) -> Result<Self, ExecutionError> {
        self.0
            .checked_add(amount)
            .filter(|total| *total <= COUNTER_MAX)
            .map(Self)
            .ok_or(ExecutionError::OverflowOrInvalidAmount)
    }
}

impl From<AggregateTotal> for u64 {
    fn from(total: AggregateTotal) -> Self {
        total.0
    }
}

impl fmt::Display for AggregateTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Globally visible mutable state, held by the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[expect(clippy::field_scoped_visibility_modifiers, reason = "for internal use")]
pub(crate) struct PublicState {
    /// The privileged identity.
    pub(crate) admin: AccessCell,

    /// The aggregate total.
    pub(crate) total: AggregateTotal,
}

/// Applies one transaction's deferred calls.
///
/// Public operations have no other entry point. Callers run this against a
/// scratch copy of the state and keep the copy only if every call succeeds.
#[derive(Debug)]
pub(crate) struct PublicContext<'state> {
    state: &'state mut PublicState,
}

impl<'state> PublicContext<'state> {
    pub(crate) const fn new(state: &'state mut PublicState) -> Self {
        Self { state }
    }

    /// Drain `calls` in enqueue order. Stops at the first failure.
    pub(crate) fn execute(&mut self, calls: CallQueue) -> Result<(), ExecutionError> {
        calls.into_iter().try_for_each(|call| self.dispatch(call))
    }

    fn dispatch(&mut self, call: DeferredCall) -> Result<(), ExecutionError> {
        if call.selector != Selector::aggregate_increment() {
            return Err(ExecutionError::UnknownCall(call.selector));
        }
        let &[amount] = call.args.as_slice() else {
            return Err(ExecutionError::MalformedCall {
                selector: call.selector,
                expected: 1,
                got: call.args.len(),
            });
        };
        self.aggregate_increment(amount)
    }

    fn aggregate_increment(&mut self, amount: u64) -> Result<(), ExecutionError> {
        self.state.total = self.state.total.checked_add(amount)?;
        Ok(())
    }
}
