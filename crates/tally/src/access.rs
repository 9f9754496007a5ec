//! The write-once access control cell.

use crate::{error::ExecutionError, keys::Identity};

/// A guarded slot holding the privileged identity.
///
/// Created empty, set exactly once by [`initialize`](Self::initialize), and
/// read-only from then on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::module_name_repetitions, reason = "reads as the component name")]
pub struct AccessCell {
    identity: Option<Identity>,
}

impl AccessCell {
    /// An empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Self { identity: None }
    }

    /// Store `identity` permanently.
    ///
    /// A second call fails with
    /// [`AlreadyInitialized`](ExecutionError::AlreadyInitialized) and leaves
    /// the stored identity unchanged.
    pub fn initialize(&mut self, identity: Identity) -> Result<(), ExecutionError> {
        if self.identity.is_some() {
            return Err(ExecutionError::AlreadyInitialized);
        }
        self.identity = Some(identity);
        Ok(())
    }

    /// The privileged identity.
    pub fn read(&self) -> Result<Identity, ExecutionError> {
        self.identity.ok_or(ExecutionError::Uninitialized)
    }

    /// Fail with [`AccessDenied`](ExecutionError::AccessDenied) unless
    /// `caller` is the privileged identity.
    ///
    /// An empty cell denies everyone.
    pub fn require_caller(&self, caller: &Identity) -> Result<(), ExecutionError> {
        match self.identity {
            Some(admin) if admin == *caller => Ok(()),
            Some(_) | None => Err(ExecutionError::AccessDenied),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SpendingKey;

    #[test]
    fn initialize_once() {
        let admin = SpendingKey::from([0x0au8; 32]).identity();
        let other = SpendingKey::from([0x0bu8; 32]).identity();
        let mut cell = AccessCell::new();

        assert_eq!(cell.read(), Err(ExecutionError::Uninitialized));
        cell.initialize(admin).unwrap();
        assert_eq!(
            cell.initialize(other),
            Err(ExecutionError::AlreadyInitialized)
        );
        assert_eq!(cell.read(), Ok(admin));
    }

    #[test]
    fn only_admin_passes() {
        let admin = SpendingKey::from([0x0au8; 32]).identity();
        let other = SpendingKey::from([0x0bu8; 32]).identity();
        let mut cell = AccessCell::new();

        assert_eq!(
            cell.require_caller(&admin),
            Err(ExecutionError::AccessDenied)
        );
        cell.initialize(admin).unwrap();
        cell.require_caller(&admin).unwrap();
        assert_eq!(
            cell.require_caller(&other),
            Err(ExecutionError::AccessDenied)
        );
    }
}
