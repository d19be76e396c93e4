//! # Chain Client Ports
//!
//! Port definitions for contract reads, writes and receipt lookups.
//!
//! The orchestrator depends only on these traits:
//!
//! - [`ChainReader`]: read-only contract calls
//! - [`ChainWriter`]: signed, state-changing contract calls
//! - [`ReceiptSource`]: receipt lookups for broadcast transactions
//!
//! Every adapter failure is reported as a [`ChainError`]; callers treat it as
//! terminal for the current step and never retry on their own.

use crate::domain::errors::OperationError;
use crate::domain::value_objects::contract_call::{ChainValue, ContractCall, TxHandle};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Confirmed transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction handle.
    pub handle: TxHandle,
    /// Block number where the transaction was included.
    pub block_number: u64,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Whether the transaction succeeded.
    pub success: bool,
}

impl TxReceipt {
    /// Creates a successful receipt.
    #[must_use]
    pub fn success(handle: TxHandle, block_number: u64) -> Self {
        Self {
            handle,
            block_number,
            gas_used: 0,
            success: true,
        }
    }

    /// Creates a reverted receipt.
    #[must_use]
    pub fn reverted(handle: TxHandle, block_number: u64) -> Self {
        Self {
            handle,
            block_number,
            gas_used: 0,
            success: false,
        }
    }
}

/// Error type for chain adapter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// RPC transport or node failure.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The signer declined to sign.
    #[error("user rejected: {0}")]
    UserRejected(String),

    /// The account cannot cover value plus gas.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    /// The call reverted during simulation or gas estimation.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The node returned data that does not match the ABI.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// An address, argument or signer is misconfigured.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ChainError {
    /// Creates an RPC error.
    #[must_use]
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
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

    /// Creates a reverted error.
    #[must_use]
    pub fn reverted(msg: impl Into<String>) -> Self {
        Self::Reverted(msg.into())
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Returns true if the same request may succeed when repeated.
    ///
    /// Transport failures and garbled node responses are transient; a
    /// rejected signature or a malformed input never fixes itself.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::InvalidResponse(_))
    }

    /// Converts the error into the operation failure for step `step`.
    #[must_use]
    pub fn into_operation_error(self, step: usize) -> OperationError {
        match self {
            Self::Rpc(msg) | Self::InvalidResponse(msg) => OperationError::Rpc(msg),
            Self::UserRejected(msg) => OperationError::UserRejected(msg),
            Self::InsufficientFunds(msg) => OperationError::InsufficientFunds(msg),
            Self::Reverted(msg) => OperationError::reverted(step, msg),
            Self::InvalidInput(msg) => OperationError::InvalidRequest(msg),
        }
    }
}

impl From<ChainError> for OperationError {
    fn from(err: ChainError) -> Self {
        err.into_operation_error(0)
    }
}

/// Result type for chain adapter operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Read-only contract calls.
#[async_trait]
pub trait ChainReader: Send + Sync + fmt::Debug {
    /// Performs a view call and decodes its single return value.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails or the result cannot be decoded.
    async fn read(&self, call: &ContractCall) -> ChainResult<ChainValue>;
}

/// Signed, state-changing contract calls.
#[async_trait]
pub trait ChainWriter: Send + Sync + fmt::Debug {
    /// Signs and broadcasts a call, returning its transaction handle.
    ///
    /// # Arguments
    ///
    /// * `call` - The contract call to submit
    /// * `gas_limit` - Explicit gas limit, or `None` to estimate
    ///
    /// # Errors
    ///
    /// Returns an error if signing is rejected, the account cannot pay, or
    /// broadcasting fails.
    async fn write(&self, call: &ContractCall, gas_limit: Option<u64>) -> ChainResult<TxHandle>;
}

/// Receipt lookups for broadcast transactions.
#[async_trait]
pub trait ReceiptSource: Send + Sync + fmt::Debug {
    /// Returns the receipt if the transaction has been included.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call fails.
    async fn receipt(&self, handle: &TxHandle) -> ChainResult<Option<TxReceipt>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_error_display() {
        let err = ChainError::rpc("connection refused");
        assert_eq!(err.to_string(), "rpc error: connection refused");

        let err = ChainError::reverted("ERC20: insufficient allowance");
        assert_eq!(
            err.to_string(),
            "execution reverted: ERC20: insufficient allowance"
        );
    }

    #[test]
    fn chain_error_maps_to_operation_error() {
        assert_eq!(
            ChainError::user_rejected("denied").into_operation_error(1),
            OperationError::UserRejected("denied".into())
        );
        assert_eq!(
            ChainError::reverted("nope").into_operation_error(1),
            OperationError::reverted(1, "nope")
        );
        assert_eq!(
            ChainError::insufficient_funds("gas").into_operation_error(0),
            OperationError::InsufficientFunds("gas".into())
        );
        assert_eq!(
            OperationError::from(ChainError::invalid_response("bad bool")),
            OperationError::Rpc("bad bool".into())
        );
    }

    #[test]
    fn transient_errors() {
        assert!(ChainError::rpc("502").is_transient());
        assert!(ChainError::invalid_response("short output").is_transient());
        assert!(!ChainError::invalid_input("bad hash").is_transient());
        assert!(!ChainError::user_rejected("denied").is_transient());
    }

    #[test]
    fn receipt_constructors() {
        let ok = TxReceipt::success(TxHandle::new("0x1"), 10);
        assert!(ok.success);
        let bad = TxReceipt::reverted(TxHandle::new("0x2"), 11);
        assert!(!bad.success);
        assert_eq!(bad.block_number, 11);
    }
}
