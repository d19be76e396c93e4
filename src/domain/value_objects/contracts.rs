//! # Contract Set
//!
//! The deployed contracts a session talks to.

use super::address::ContractAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of yield strategy the vault allocates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Lending market strategy.
    Lending,
    /// Staking strategy.
    Staking,
    /// Liquidity provision strategy.
    Liquidity,
}

impl StrategyKind {
    /// Returns the strategy name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lending => "lending",
            Self::Staking => "staking",
            Self::Liquidity => "liquidity",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A strategy contract with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyContract {
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Strategy contract address.
    pub address: ContractAddress,
}

impl StrategyContract {
    /// Creates a new strategy contract.
    #[must_use]
    pub fn new(kind: StrategyKind, address: ContractAddress) -> Self {
        Self { kind, address }
    }
}

/// Addresses of the token, the vault and its strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSet {
    /// The vault's underlying token (also the airdrop source).
    pub token: ContractAddress,
    /// The yield vault.
    pub vault: ContractAddress,
    /// Strategies the vault allocates to.
    pub strategies: Vec<StrategyContract>,
}

impl ContractSet {
    /// Creates a contract set without strategies.
    #[must_use]
    pub fn new(token: ContractAddress, vault: ContractAddress) -> Self {
        Self {
            token,
            vault,
            strategies: Vec::new(),
        }
    }

    /// Adds a strategy.
    #[must_use]
    pub fn with_strategy(mut self, kind: StrategyKind, address: ContractAddress) -> Self {
        self.strategies.push(StrategyContract::new(kind, address));
        self
    }
}
