//! # Contract Calls
//!
//! Chain-agnostic description of a contract interaction.
//!
//! A [`ContractCall`] names the target contract, the ABI function and its
//! arguments. Encoding into calldata is the adapter's concern; the
//! orchestrator only composes and sequences calls.

use super::address::ContractAddress;
use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ABI functions the orchestrator knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractFunction {
    /// `balanceOf(address)` on the token or the vault (shares).
    BalanceOf,
    /// `hasClaimed(address)` on the token: airdrop idempotency flag.
    HasClaimed,
    /// `allowance(owner, spender)` on the token.
    Allowance,
    /// `totalAssets()` on the vault or a strategy.
    TotalAssets,
    /// `totalSupply()` on the vault (outstanding shares).
    TotalSupply,
    /// `estimatedAPY()` on a strategy, in hundredths of a percent.
    EstimatedApy,
    /// `airdrop()` on the token.
    Airdrop,
    /// `approve(spender, amount)` on the token.
    Approve,
    /// `deposit(assets, receiver)` on the vault.
    Deposit,
    /// `withdraw(assets, receiver, owner)` on the vault.
    Withdraw,
    /// `redeem(shares, receiver, owner)` on the vault.
    Redeem,
    /// `rebalance()` on the vault.
    Rebalance,
    /// `mint(to, amount)` on the token (test networks only).
    Mint,
}

impl ContractFunction {
    /// Every known function.
    pub const ALL: [Self; 13] = [
        Self::BalanceOf,
        Self::HasClaimed,
        Self::Allowance,
        Self::TotalAssets,
        Self::TotalSupply,
        Self::EstimatedApy,
        Self::Airdrop,
        Self::Approve,
        Self::Deposit,
        Self::Withdraw,
        Self::Redeem,
        Self::Rebalance,
        Self::Mint,
    ];

    /// Returns the ABI function name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BalanceOf => "balanceOf",
            Self::HasClaimed => "hasClaimed",
            Self::Allowance => "allowance",
            Self::TotalAssets => "totalAssets",
            Self::TotalSupply => "totalSupply",
            Self::EstimatedApy => "estimatedAPY",
            Self::Airdrop => "airdrop",
            Self::Approve => "approve",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Redeem => "redeem",
            Self::Rebalance => "rebalance",
            Self::Mint => "mint",
        }
    }

    /// Returns the human-readable ABI signature.
    #[must_use]
    pub const fn signature(&self) -> &'static str {
        match self {
            Self::BalanceOf => "function balanceOf(address account) view returns (uint256)",
            Self::HasClaimed => "function hasClaimed(address account) view returns (bool)",
            Self::Allowance => {
                "function allowance(address owner, address spender) view returns (uint256)"
            }
            Self::TotalAssets => "function totalAssets() view returns (uint256)",
            Self::TotalSupply => "function totalSupply() view returns (uint256)",
            Self::EstimatedApy => "function estimatedAPY() view returns (uint256)",
            Self::Airdrop => "function airdrop()",
            Self::Approve => "function approve(address spender, uint256 amount) returns (bool)",
            Self::Deposit => {
                "function deposit(uint256 assets, address receiver) returns (uint256)"
            }
            Self::Withdraw => {
                "function withdraw(uint256 assets, address receiver, address owner) returns (uint256)"
            }
            Self::Redeem => {
                "function redeem(uint256 shares, address receiver, address owner) returns (uint256)"
            }
            Self::Rebalance => "function rebalance()",
            Self::Mint => "function mint(address to, uint256 amount)",
        }
    }

    /// Returns true for read-only functions.
    #[must_use]
    pub const fn is_view(&self) -> bool {
        matches!(
            self,
            Self::BalanceOf
                | Self::HasClaimed
                | Self::Allowance
                | Self::TotalAssets
                | Self::TotalSupply
                | Self::EstimatedApy
        )
    }
}

impl fmt::Display for ContractFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single call argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CallArg {
    /// An address argument (account or contract).
    Address(String),
    /// A `uint256` argument.
    Uint(U256),
}

impl fmt::Display for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(addr) => write!(f, "{}", addr),
            Self::Uint(value) => write!(f, "{}", value),
        }
    }
}

/// A decoded value returned by a read call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ChainValue {
    /// A `uint256` result.
    Uint(U256),
    /// A `bool` result.
    Bool(bool),
}

impl ChainValue {
    /// Returns the value as an unsigned integer, if it is one.
    #[must_use]
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(v) => Some(*v),
            Self::Bool(_) => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Uint(_) => None,
        }
    }
}

/// A contract interaction: target, function and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    /// Target contract.
    pub contract: ContractAddress,
    /// Function to invoke.
    pub function: ContractFunction,
    /// Positional arguments.
    pub args: Vec<CallArg>,
}

impl ContractCall {
    /// Creates a call with no arguments.
    #[must_use]
    pub fn new(contract: ContractAddress, function: ContractFunction) -> Self {
        Self {
            contract,
            function,
            args: Vec::new(),
        }
    }

    /// Appends an address argument.
    #[must_use]
    pub fn address_arg(mut self, address: impl Into<String>) -> Self {
        self.args.push(CallArg::Address(address.into()));
        self
    }

    /// Appends a `uint256` argument.
    #[must_use]
    pub fn uint_arg(mut self, value: U256) -> Self {
        self.args.push(CallArg::Uint(value));
        self
    }
}

impl fmt::Display for ContractCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{}.{}({})",
            self.contract,
            self.function,
            args.join(", ")
        )
    }
}

/// Identifier of a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHandle(pub String);

impl TxHandle {
    /// Creates a new transaction handle.
    #[must_use]
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Returns the handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn view_functions() {
        assert!(ContractFunction::HasClaimed.is_view());
        assert!(ContractFunction::EstimatedApy.is_view());
        assert!(!ContractFunction::Deposit.is_view());
        assert!(!ContractFunction::Airdrop.is_view());
    }

    #[test]
    fn signature_mentions_name() {
        for function in ContractFunction::ALL {
            assert!(function.signature().contains(function.name()));
        }
    }

    #[test]
    fn call_display() {
        let vault = ContractAddress::new("0xvault").unwrap();
        let call = ContractCall::new(vault, ContractFunction::Deposit)
            .uint_arg(U256::from(500u64))
            .address_arg("0xa1");
        assert_eq!(call.to_string(), "0xvault.deposit(500, 0xa1)");
    }

    #[test]
    fn chain_value_accessors() {
        assert_eq!(ChainValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ChainValue::Bool(true).as_uint(), None);
        assert_eq!(
            ChainValue::Uint(U256::from(7u8)).as_uint(),
            Some(U256::from(7u8))
        );
    }
}
