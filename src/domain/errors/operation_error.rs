//! # Operation Errors
//!
//! Failure taxonomy for executed operations.
//!
//! Every variant is terminal for the operation it belongs to; nothing is
//! retried automatically. A retry is a new user-initiated `execute`.
//!
//! `TimedOut` is distinct from every failure: the transaction may still be
//! included later, so user-facing copy reports the outcome as unknown.

use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::contract_call::TxHandle;
use crate::domain::value_objects::operation::OperationKind;
use thiserror::Error;

/// Error type for operation execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// An idempotency precondition failed (e.g. airdrop already claimed).
    #[error("already done: {0}")]
    AlreadyDone(String),

    /// The same operation is already in flight for this account.
    #[error("{kind} already in progress for {account}")]
    Busy {
        /// Operation kind.
        kind: OperationKind,
        /// Account the operation runs for.
        account: AccountAddress,
    },

    /// No wallet account is connected.
    #[error("wallet not connected")]
    NotConnected,

    /// The request parameters are invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The signer declined the transaction.
    #[error("rejected by user: {0}")]
    UserRejected(String),

    /// The account cannot pay for the transaction.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Network or node failure; recoverable by retrying the operation.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The chain rejected a specific step.
    #[error("step {} reverted: {reason}", .step + 1)]
    Reverted {
        /// Zero-based step index.
        step: usize,
        /// Revert reason, if known.
        reason: String,
    },

    /// Confirmation of a broadcast step was not observed in time.
    #[error("step {} confirmation timed out ({handle})", .step + 1)]
    TimedOut {
        /// Zero-based step index.
        step: usize,
        /// Handle of the broadcast transaction.
        handle: TxHandle,
    },
}

impl OperationError {
    /// Creates an already-done error.
    #[must_use]
    pub fn already_done(msg: impl Into<String>) -> Self {
        Self::AlreadyDone(msg.into())
    }

    /// Creates a busy error.
    #[must_use]
    pub fn busy(kind: OperationKind, account: AccountAddress) -> Self {
        Self::Busy { kind, account }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates a user-rejected error.
    #[must_use]
    pub fn user_rejected(msg: impl Into<String>) -> Self {
        Self::UserRejected(msg.into())
    }

    /// Creates an insufficient funds error.
    #[must_use]
    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::InsufficientFunds(msg.into())
    }

    /// Creates an RPC error.
    #[must_use]
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Creates a reverted error for a step.
    #[must_use]
    pub fn reverted(step: usize, reason: impl Into<String>) -> Self {
        Self::Reverted {
            step,
            reason: reason.into(),
        }
    }

    /// Creates a timed-out error for a step.
    #[must_use]
    pub fn timed_out(step: usize, handle: TxHandle) -> Self {
        Self::TimedOut { step, handle }
    }

    /// Returns true when the on-chain outcome is unknown rather than failed.
    #[must_use]
    pub const fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns true if re-running the operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::UserRejected(_))
    }

    /// Returns the copy to show the user.
    ///
    /// Failures read as failures; a timeout reads as an unknown outcome that
    /// may still succeed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AlreadyDone(what) => format!("Nothing to do: {what}."),
            Self::Busy { kind, .. } => {
                format!("A {kind} is already in progress. Wait for it to finish.")
            }
            Self::NotConnected => "Connect your wallet first.".to_string(),
            Self::InvalidRequest(msg) => format!("Invalid request: {msg}."),
            Self::UserRejected(_) => "Transaction rejected in wallet.".to_string(),
            Self::InsufficientFunds(msg) => format!("Insufficient funds: {msg}."),
            Self::Rpc(msg) => format!("Network error, please retry: {msg}."),
            Self::Reverted { step, reason } => {
                format!("Failed: step {} was reverted by the chain ({reason}).", step + 1)
            }
            Self::TimedOut { step, handle } => format!(
                "Unknown: step {} is still unconfirmed and may yet succeed. Check the explorer for {handle}.",
                step + 1
            ),
        }
    }
}
