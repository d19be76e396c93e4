//! # Operations
//!
//! User intents the orchestrator can execute.
//!
//! An [`OperationRequest`] pairs an [`Operation`] (intent plus typed
//! parameters) with the account it is executed for. It is consumed once by
//! the sequencer and discarded after a terminal status.

use super::address::AccountAddress;
use super::ids::OperationId;
use crate::domain::errors::OperationError;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kind, without parameters.
///
/// Single-flight is enforced per (account, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// One-time airdrop claim.
    Claim,
    /// Approve (when needed) then deposit into the vault.
    Deposit,
    /// Withdraw assets from the vault.
    Withdraw,
    /// Redeem vault shares.
    Redeem,
    /// Trigger a vault rebalance across strategies.
    Rebalance,
    /// Mint test tokens to a recipient.
    MintTest,
}

impl OperationKind {
    /// Returns the kind name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Redeem => "redeem",
            Self::Rebalance => "rebalance",
            Self::MintTest => "mint_test",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An operation with its parameters.
///
/// Amounts are on-chain integers with 18 implied decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Claim the airdrop.
    Claim,
    /// Deposit `amount` of the token into the vault.
    Deposit {
        /// Asset amount.
        amount: U256,
    },
    /// Withdraw `amount` of assets from the vault.
    Withdraw {
        /// Asset amount.
        amount: U256,
    },
    /// Redeem `shares` vault shares for assets.
    Redeem {
        /// Share amount.
        shares: U256,
    },
    /// Rebalance the vault.
    Rebalance,
    /// Mint `amount` test tokens to `recipient`.
    MintTest {
        /// Recipient address.
        recipient: String,
        /// Token amount.
        amount: U256,
    },
}

impl Operation {
    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Claim => OperationKind::Claim,
            Self::Deposit { .. } => OperationKind::Deposit,
            Self::Withdraw { .. } => OperationKind::Withdraw,
            Self::Redeem { .. } => OperationKind::Redeem,
            Self::Rebalance => OperationKind::Rebalance,
            Self::MintTest { .. } => OperationKind::MintTest,
        }
    }

    /// Validates the operation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidRequest`] for zero amounts or an empty
    /// mint recipient.
    pub fn validate(&self) -> Result<(), OperationError> {
        match self {
            Self::Deposit { amount } | Self::Withdraw { amount } if amount.is_zero() => Err(
                OperationError::invalid_request(format!("{} amount must be positive", self.kind())),
            ),
            Self::Redeem { shares } if shares.is_zero() => Err(OperationError::invalid_request(
                "redeem shares must be positive",
            )),
            Self::MintTest { recipient, amount } => {
                if recipient.trim().is_empty() {
                    return Err(OperationError::invalid_request("mint recipient is empty"));
                }
                if amount.is_zero() {
                    return Err(OperationError::invalid_request("mint amount must be positive"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// A request to execute an operation for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Correlation identifier.
    pub id: OperationId,
    /// The requesting account, absent when the wallet is disconnected.
    pub account: Option<AccountAddress>,
    /// The operation to execute.
    pub operation: Operation,
}

impl OperationRequest {
    /// Creates a new request with a fresh operation ID.
    #[must_use]
    pub fn new(account: Option<AccountAddress>, operation: Operation) -> Self {
        Self {
            id: OperationId::new_v4(),
            account,
            operation,
        }
    }

    /// Creates a request for a connected account.
    #[must_use]
    pub fn for_account(account: AccountAddress, operation: Operation) -> Self {
        Self::new(Some(account), operation)
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}
