//! # Identity Value Objects
//!
//! Type-safe identity wrappers for orchestrator identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Operation identifier.
///
/// A UUID-based identifier attached to every executed operation so that
/// status updates and log lines for the same operation can be correlated.
///
/// # Examples
///
/// ```
/// use vault_client::domain::value_objects::ids::OperationId;
///
/// let id = OperationId::new_v4();
/// println!("operation: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    /// Creates a new operation ID from an existing UUID.
    #[inline]
    #[must_use]
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a new random operation ID using UUID v4.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for OperationId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_v4_is_unique() {
        assert_ne!(OperationId::new_v4(), OperationId::new_v4());
    }

    #[test]
    fn display_is_hyphenated_uuid() {
        let uuid = Uuid::nil();
        let id = OperationId::new(uuid);
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
        assert_eq!(id.get(), uuid);
    }
}
