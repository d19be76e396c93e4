//! # Operation Status
//!
//! Lifecycle of a single logical operation.
//!
//! ```text
//! Idle ──► Submitting(0) ──► AwaitingConfirmation(0, h) ──► Submitting(1) ──► ...
//!                │                     │                                     │
//!                ▼                     ▼                                     ▼
//!             Failed                Failed                              Succeeded
//! ```

use super::contract_call::TxHandle;
use crate::domain::errors::OperationError;
use serde::Serialize;
use std::fmt;

/// Status of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationStatus {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Step `step` is being submitted.
    Submitting {
        /// Zero-based step index.
        step: usize,
    },
    /// Step `step` was broadcast and is awaiting confirmation.
    AwaitingConfirmation {
        /// Zero-based step index.
        step: usize,
        /// Handle of the broadcast transaction.
        handle: TxHandle,
    },
    /// Every step confirmed successfully.
    Succeeded {
        /// Handles of the confirmed transactions, in step order.
        handles: Vec<TxHandle>,
    },
    /// The operation ended without success.
    Failed {
        /// Why the operation failed.
        #[serde(serialize_with = "serialize_reason")]
        reason: OperationError,
    },
}

fn serialize_reason<S: serde::Serializer>(
    reason: &OperationError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&reason.user_message())
}

impl OperationStatus {
    /// Creates a failed status.
    #[must_use]
    pub fn failed(reason: OperationError) -> Self {
        Self::Failed { reason }
    }

    /// Returns true while a step is being submitted or awaited.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Submitting { .. } | Self::AwaitingConfirmation { .. }
        )
    }

    /// Returns true for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    /// Returns true for `Succeeded`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&OperationError> {
        match self {
            Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting { step } => write!(f, "submitting step {}", step + 1),
            Self::AwaitingConfirmation { step, handle } => {
                write!(f, "awaiting confirmation of step {} ({})", step + 1, handle)
            }
            Self::Succeeded { .. } => write!(f, "succeeded"),
            Self::Failed { reason } => write!(f, "failed: {}", reason.user_message()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(OperationStatus::default(), OperationStatus::Idle);
    }

    #[test]
    fn in_flight_and_terminal_are_disjoint() {
        let statuses = [
            OperationStatus::Idle,
            OperationStatus::Submitting { step: 0 },
            OperationStatus::AwaitingConfirmation {
                step: 1,
                handle: TxHandle::new("0x01"),
            },
            OperationStatus::Succeeded { handles: vec![] },
            OperationStatus::failed(OperationError::NotConnected),
        ];
        for status in &statuses {
            assert!(!(status.is_in_flight() && status.is_terminal()));
        }
        assert!(statuses.iter().filter(|s| s.is_in_flight()).count() == 2);
        assert!(statuses.iter().filter(|s| s.is_terminal()).count() == 2);
    }

    #[test]
    fn display_uses_one_based_steps() {
        assert_eq!(
            OperationStatus::Submitting { step: 0 }.to_string(),
            "submitting step 1"
        );
    }
}
