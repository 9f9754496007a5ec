//! Engine configuration.

use alloc::string::String;

use mock_prover::{CircuitId, Prover, Verifier};

use crate::constants::{DEFAULT_CIRCUIT_LABEL, DEFAULT_MAX_CALLS_PER_TRANSACTION};

/// How a self-increment treats the caller's existing notes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoteMode {
    /// Every increment appends one note. No nullifier is ever published.
    #[default]
    Append,

    /// A self-increment nullifies the caller's live notes and replaces them
    /// with a single note carrying the new sum. Keeps collections small at
    /// the cost of making concurrent self-increments conflict.
    MergeAndReplace,
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Note handling for self-increments.
    pub note_mode: NoteMode,

    /// Upper bound on deferred calls per transaction.
    pub max_calls_per_transaction: usize,

    /// Label the proof circuit identifier is derived from. Client and ledger
    /// must agree on it.
    pub circuit_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            note_mode: NoteMode::Append,
            max_calls_per_transaction: DEFAULT_MAX_CALLS_PER_TRANSACTION,
            circuit_label: String::from(DEFAULT_CIRCUIT_LABEL),
        }
    }
}

impl Config {
    /// The proof circuit identifier.
    #[must_use]
    pub fn circuit(&self) -> CircuitId {
        CircuitId::from_label(&self.circuit_label)
    }

    /// A prover for [`circuit`](Self::circuit).
    #[must_use]
    pub fn prover(&self) -> Prover {
        Prover::new(self.circuit())
    }

    /// A verifier for [`circuit`](Self::circuit).
    #[must_use]
    pub fn verifier(&self) -> Verifier {
        Verifier::new(self.circuit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.note_mode, NoteMode::Append);
        assert_eq!(config.max_calls_per_transaction, 16);
        assert_eq!(config.circuit(), CircuitId::from_label("tally:private-counter:v1"));
    }

    #[test]
    fn circuit_follows_label() {
        let config = Config {
            circuit_label: String::from("other"),
            ..Config::default()
        };
        assert_ne!(config.circuit(), Config::default().circuit());
    }
}
