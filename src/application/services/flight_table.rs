//! # Flight Table
//!
//! Single-flight bookkeeping per (account, operation kind).
//!
//! [`FlightTable::try_acquire`] checks and marks a slot in one map-entry
//! operation. The returned [`FlightGuard`] holds the slot and releases it when
//! dropped, including when the executing future is cancelled.

use crate::domain::errors::OperationError;
use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::operation::OperationKind;
use crate::domain::value_objects::status::OperationStatus;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;

/// Key of a flight slot.
pub type FlightKey = (AccountAddress, OperationKind);

/// In-flight operations and their current status.
#[derive(Debug, Clone, Default)]
pub struct FlightTable {
    slots: Arc<DashMap<FlightKey, OperationStatus>>,
}

impl FlightTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `(account, kind)`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Busy`] if the slot is already held.
    pub fn try_acquire(
        &self,
        account: &AccountAddress,
        kind: OperationKind,
    ) -> Result<FlightGuard, OperationError> {
        let key = (account.clone(), kind);
        match self.slots.entry(key.clone()) {
            Entry::Occupied(_) => Err(OperationError::busy(kind, account.clone())),
            Entry::Vacant(slot) => {
                slot.insert(OperationStatus::Idle);
                Ok(FlightGuard {
                    slots: Arc::clone(&self.slots),
                    key,
                })
            }
        }
    }

    /// Returns the status of an in-flight operation.
    #[must_use]
    pub fn status(&self, account: &AccountAddress, kind: OperationKind) -> Option<OperationStatus> {
        self.slots
            .get(&(account.clone(), kind))
            .map(|entry| entry.value().clone())
    }

    /// Returns true if `(account, kind)` is in flight.
    #[must_use]
    pub fn is_in_flight(&self, account: &AccountAddress, kind: OperationKind) -> bool {
        self.slots.contains_key(&(account.clone(), kind))
    }

    /// Returns the number of operations in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Exclusive hold on a flight slot.
#[derive(Debug)]
pub struct FlightGuard {
    slots: Arc<DashMap<FlightKey, OperationStatus>>,
    key: FlightKey,
}

impl FlightGuard {
    /// Records the operation's current status.
    pub fn set(&self, status: OperationStatus) {
        if let Some(mut entry) = self.slots.get_mut(&self.key) {
            *entry = status;
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.slots.remove(&self.key);
    }
}
