//! # Transaction Steps
//!
//! Ordered on-chain calls that make up an operation.
//!
//! An [`OperationPlan`] is derived from an [`Operation`] plus whatever
//! precondition reads the sequencer performed (currently the deposit
//! allowance). Plans are built fresh for every execution and discarded with
//! the request.

use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::contract_call::{ContractCall, ContractFunction};
use crate::domain::value_objects::contracts::ContractSet;
use crate::domain::value_objects::operation::{Operation, OperationKind};
use ethers::types::U256;
use serde::Serialize;
use std::fmt;

/// Gas limit pinned for test-token mints.
pub const MINT_GAS_LIMIT: u64 = 1_200_000;

/// One state-changing call within an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionStep {
    /// Short label for logs and progress output.
    pub label: &'static str,
    /// The call to submit.
    pub call: ContractCall,
    /// Whether the previous step must have succeeded before submission.
    pub requires_previous: bool,
    /// Explicit gas limit; `None` lets the writer estimate.
    pub gas_limit: Option<u64>,
}

impl TransactionStep {
    /// Creates an independent step.
    #[must_use]
    pub fn new(label: &'static str, call: ContractCall) -> Self {
        Self {
            label,
            call,
            requires_previous: false,
            gas_limit: None,
        }
    }

    /// Marks the step as depending on the previous one.
    #[must_use]
    pub fn after_previous(mut self) -> Self {
        self.requires_previous = true;
        self
    }

    /// Pins the gas limit.
    #[must_use]
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

impl fmt::Display for TransactionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.call)
    }
}

/// The ordered steps of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPlan {
    kind: OperationKind,
    steps: Vec<TransactionStep>,
}

impl OperationPlan {
    /// Builds the plan for an operation.
    ///
    /// For deposits, `allowance` is the token allowance the account has
    /// already granted the vault; the approve step is left out when it covers
    /// the amount. `None` means unknown and always approves.
    #[must_use]
    pub fn build(
        operation: &Operation,
        account: &AccountAddress,
        contracts: &ContractSet,
        allowance: Option<U256>,
    ) -> Self {
        let token = &contracts.token;
        let vault = &contracts.vault;

        let steps = match operation {
            Operation::Claim => vec![TransactionStep::new(
                "airdrop",
                ContractCall::new(token.clone(), ContractFunction::Airdrop),
            )],
            Operation::Deposit { amount } => {
                let mut steps = Vec::with_capacity(2);
                let covered = allowance.is_some_and(|current| current >= *amount);
                if !covered {
                    steps.push(TransactionStep::new(
                        "approve",
                        ContractCall::new(token.clone(), ContractFunction::Approve)
                            .address_arg(vault.as_str())
                            .uint_arg(*amount),
                    ));
                }
                let deposit = TransactionStep::new(
                    "deposit",
                    ContractCall::new(vault.clone(), ContractFunction::Deposit)
                        .uint_arg(*amount)
                        .address_arg(account.as_str()),
                );
                steps.push(if covered {
                    deposit
                } else {
                    deposit.after_previous()
                });
                steps
            }
            Operation::Withdraw { amount } => vec![TransactionStep::new(
                "withdraw",
                ContractCall::new(vault.clone(), ContractFunction::Withdraw)
                    .uint_arg(*amount)
                    .address_arg(account.as_str())
                    .address_arg(account.as_str()),
            )],
            Operation::Redeem { shares } => vec![TransactionStep::new(
                "redeem",
                ContractCall::new(vault.clone(), ContractFunction::Redeem)
                    .uint_arg(*shares)
                    .address_arg(account.as_str())
                    .address_arg(account.as_str()),
            )],
            Operation::Rebalance => vec![TransactionStep::new(
                "rebalance",
                ContractCall::new(vault.clone(), ContractFunction::Rebalance),
            )],
            Operation::MintTest { recipient, amount } => vec![
                TransactionStep::new(
                    "mint",
                    ContractCall::new(token.clone(), ContractFunction::Mint)
                        .address_arg(recipient.trim())
                        .uint_arg(*amount),
                )
                .with_gas_limit(MINT_GAS_LIMIT),
            ],
        };

        Self {
            kind: operation.kind(),
            steps,
        }
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the steps in submission order.
    #[must_use]
    pub fn steps(&self) -> &[TransactionStep] {
        &self.steps
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
