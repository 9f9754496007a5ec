//! Counter values.
//!
//! A [`Value`] is the non-negative amount carried by one note, or the sum of
//! several. Amounts enter the crate as signed integers (the operation surface
//! accepts `i64` so that a negative request can be told apart from a valid
//! one and rejected) and are stored unsigned.

use core::fmt;

use crate::{constants::COUNTER_MAX, error::ExecutionError};

/// A non-negative counter amount, at most [`COUNTER_MAX`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(u64);

impl Value {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// One increment.
    pub const ONE: Self = Self(1);

    /// The largest representable amount.
    pub const MAX: Self = Self(COUNTER_MAX);

    /// Add two amounts, failing past [`Value::MAX`].
    pub fn checked_add(self, rhs: Self) -> Result<Self, ExecutionError> {
        self.0
            .checked_add(rhs.0)
            .filter(|sum| *sum <= COUNTER_MAX)
            .map(Self)
            .ok_or(ExecutionError::OverflowOrInvalidAmount)
    }

    /// Sum a sequence of amounts, failing past [`Value::MAX`].
    pub fn checked_sum<'value>(
        values: impl IntoIterator<Item = &'value Self>,
    ) -> Result<Self, ExecutionError> {
        values
            .into_iter()
            .try_fold(Self::ZERO, |acc, value| acc.checked_add(*value))
    }

    /// Little-endian encoding, as committed to in notes.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }
}

impl TryFrom<i64> for Value {
    type Error = ExecutionError;

    fn try_from(amount: i64) -> Result<Self, Self::Error> {
        u64::try_from(amount)
            .map(Self)
            .map_err(|_err| ExecutionError::OverflowOrInvalidAmount)
    }
}

impl TryFrom<u64> for Value {
    type Error = ExecutionError;

    fn try_from(amount: u64) -> Result<Self, Self::Error> {
        if amount <= COUNTER_MAX {
            Ok(Self(amount))
        } else {
            Err(ExecutionError::OverflowOrInvalidAmount)
        }
    }
}

impl From<Value> for u64 {
    fn from(value: Value) -> Self {
        value.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_rejected() {
        assert_eq!(
            Value::try_from(-1i64),
            Err(ExecutionError::OverflowOrInvalidAmount)
        );
        assert_eq!(Value::try_from(0i64), Ok(Value::ZERO));
    }

    #[test]
    fn amounts_past_the_cap_are_rejected() {
        assert!(Value::try_from(COUNTER_MAX).is_ok());
        assert_eq!(
            Value::try_from(u64::MAX),
            Err(ExecutionError::OverflowOrInvalidAmount)
        );
        assert_eq!(
            Value::MAX.checked_add(Value::try_from(1i64).unwrap()),
            Err(ExecutionError::OverflowOrInvalidAmount)
        );
    }

    #[test]
    fn sum_of_values() {
        let values = [1i64, 2, 3].map(|amount| Value::try_from(amount).unwrap());
        assert_eq!(Value::checked_sum(&values).map(u64::from), Ok(6));
        assert_eq!(Value::checked_sum(&[]), Ok(Value::ZERO));
    }

    /// A sum past the cap is an error, never a clamped total.
    #[test]
    fn sum_past_the_cap_is_rejected() {
        assert_eq!(
            Value::checked_sum(&[Value::MAX, Value::ONE]),
            Err(ExecutionError::OverflowOrInvalidAmount)
        );
        assert_eq!(
            Value::checked_sum(&[Value::MAX, Value::ZERO]),
            Ok(Value::MAX)
        );
    }
}
