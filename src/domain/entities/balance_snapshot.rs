//! # Balance Snapshot
//!
//! Read-through cache of an account's balances and the vault's pool metrics.
//!
//! A snapshot is assembled in one go from a complete set of [`ChainReadings`]
//! and never patched afterwards; every derived figure is computed from the
//! readings of the same snapshot. The chain stays authoritative: a snapshot
//! may be stale between refreshes.
//!
//! # Numeric Policy
//!
//! - Token amounts and shares are 18-decimal fixed-point integers.
//! - Strategy APYs are integers in hundredths of a percent.
//! - Weighted APY with no assets across strategies is defined as zero.

use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::arithmetic::{
    APY_DECIMALS, ArithmeticError, ArithmeticResult, CheckedArithmetic, TOKEN_DECIMALS,
    fixed_to_decimal,
};
use crate::domain::value_objects::contracts::StrategyKind;
use chrono::{DateTime, Utc};
use ethers::types::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Raw values read from a single strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyReading {
    /// Strategy kind.
    pub kind: StrategyKind,
    /// `totalAssets()` of the strategy.
    pub total_assets: U256,
    /// `estimatedAPY()` of the strategy.
    pub apy: U256,
}

/// Every raw value a snapshot is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainReadings {
    /// Spendable token balance of the account.
    pub token_balance: U256,
    /// Whether the account has claimed the airdrop.
    pub claimed: bool,
    /// Vault shares held by the account.
    pub vault_shares: U256,
    /// Total assets managed by the vault.
    pub vault_total_assets: U256,
    /// Total vault shares outstanding.
    pub vault_total_supply: U256,
    /// Per-strategy readings.
    pub strategies: Vec<StrategyReading>,
}

/// Decimal view of one strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyMetrics {
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Assets allocated to the strategy, in tokens.
    pub total_assets: Decimal,
    /// Estimated APY in percent.
    pub apy_percent: Decimal,
}

impl StrategyMetrics {
    /// Converts a raw strategy reading.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if a value cannot be represented.
    pub fn from_reading(reading: &StrategyReading) -> ArithmeticResult<Self> {
        Ok(Self {
            kind: reading.kind,
            total_assets: fixed_to_decimal(reading.total_assets, TOKEN_DECIMALS)?,
            apy_percent: fixed_to_decimal(reading.apy, APY_DECIMALS)?,
        })
    }
}

/// Asset-weighted average APY across strategies, in percent.
///
/// Returns zero when the strategies hold no assets.
///
/// # Errors
///
/// Returns an arithmetic error on overflow.
pub fn weighted_apy(strategies: &[StrategyMetrics]) -> ArithmeticResult<Decimal> {
    let mut total_assets = Decimal::ZERO;
    let mut weighted_sum = Decimal::ZERO;
    for strategy in strategies {
        total_assets = total_assets.safe_add(strategy.total_assets)?;
        weighted_sum = weighted_sum.safe_add(strategy.total_assets.safe_mul(strategy.apy_percent)?)?;
    }
    weighted_sum.div_or_zero(total_assets)
}

/// Cached, internally consistent view of balances and pool metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    account: AccountAddress,
    fetched_at: DateTime<Utc>,
    readings: ChainReadings,
    token_balance: Decimal,
    vault_shares: Decimal,
    vault_total_assets: Decimal,
    account_assets: Decimal,
    strategies: Vec<StrategyMetrics>,
    strategies_total_assets: Decimal,
    weighted_apy_percent: Decimal,
    estimated_annual_return: Decimal,
}

impl BalanceSnapshot {
    /// Assembles a snapshot from a complete set of readings.
    ///
    /// # Errors
    ///
    /// Returns an arithmetic error if any figure cannot be represented.
    pub fn assemble(
        account: AccountAddress,
        readings: ChainReadings,
        fetched_at: DateTime<Utc>,
    ) -> ArithmeticResult<Self> {
        let strategies = readings
            .strategies
            .iter()
            .map(StrategyMetrics::from_reading)
            .collect::<ArithmeticResult<Vec<_>>>()?;

        let strategies_total_assets = strategies
            .iter()
            .try_fold(Decimal::ZERO, |acc, s| acc.safe_add(s.total_assets))?;
        let weighted_apy_percent = weighted_apy(&strategies)?;

        let account_assets_raw = proportional_assets(
            readings.vault_shares,
            readings.vault_total_assets,
            readings.vault_total_supply,
        )?;
        let account_assets = fixed_to_decimal(account_assets_raw, TOKEN_DECIMALS)?;
        let estimated_annual_return = account_assets
            .safe_mul(weighted_apy_percent)?
            .safe_div(Decimal::ONE_HUNDRED)?;

        Ok(Self {
            account,
            fetched_at,
            token_balance: fixed_to_decimal(readings.token_balance, TOKEN_DECIMALS)?,
            vault_shares: fixed_to_decimal(readings.vault_shares, TOKEN_DECIMALS)?,
            vault_total_assets: fixed_to_decimal(readings.vault_total_assets, TOKEN_DECIMALS)?,
            account_assets,
            strategies,
            strategies_total_assets,
            weighted_apy_percent,
            estimated_annual_return,
            readings,
        })
    }

    /// Returns the account the snapshot belongs to.
    #[must_use]
    pub fn account(&self) -> &AccountAddress {
        &self.account
    }

    /// Returns when the readings were fetched.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Returns the raw readings.
    #[must_use]
    pub fn readings(&self) -> &ChainReadings {
        &self.readings
    }

    /// Returns the spendable token balance.
    #[must_use]
    pub fn token_balance(&self) -> Decimal {
        self.token_balance
    }

    /// Returns whether the airdrop was claimed.
    #[must_use]
    pub fn claimed(&self) -> bool {
        self.readings.claimed
    }

    /// Returns the account's vault shares.
    #[must_use]
    pub fn vault_shares(&self) -> Decimal {
        self.vault_shares
    }

    /// Returns the vault's total assets.
    #[must_use]
    pub fn vault_total_assets(&self) -> Decimal {
        self.vault_total_assets
    }

    /// Returns the assets backing the account's shares.
    #[must_use]
    pub fn account_assets(&self) -> Decimal {
        self.account_assets
    }

    /// Returns the per-strategy metrics.
    #[must_use]
    pub fn strategies(&self) -> &[StrategyMetrics] {
        &self.strategies
    }

    /// Returns the assets held across all strategies.
    #[must_use]
    pub fn strategies_total_assets(&self) -> Decimal {
        self.strategies_total_assets
    }

    /// Returns the asset-weighted APY in percent.
    #[must_use]
    pub fn weighted_apy_percent(&self) -> Decimal {
        self.weighted_apy_percent
    }

    /// Returns the estimated yearly return on the account's vault position.
    #[must_use]
    pub fn estimated_annual_return(&self) -> Decimal {
        self.estimated_annual_return
    }
}

/// `shares * total_assets / total_supply`, zero when nothing is outstanding.
fn proportional_assets(shares: U256, total_assets: U256, total_supply: U256) -> ArithmeticResult<U256> {
    if total_supply.is_zero() {
        return Ok(U256::zero());
    }
    shares
        .checked_mul(total_assets)
        .ok_or(ArithmeticError::Overflow)?
        .checked_div(total_supply)
        .ok_or(ArithmeticError::DivisionByZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn readings(strategies: Vec<StrategyReading>) -> ChainReadings {
        ChainReadings {
            token_balance: tokens(9_500),
            claimed: true,
            vault_shares: tokens(500),
            vault_total_assets: tokens(2_000),
            vault_total_supply: tokens(1_000),
            strategies,
        }
    }

    fn account() -> AccountAddress {
        AccountAddress::new("0xa1").unwrap()
    }

    #[test]
    fn weighted_apy_with_no_assets_is_zero() {
        let strategies = vec![
            StrategyMetrics {
                kind: StrategyKind::Lending,
                total_assets: Decimal::ZERO,
                apy_percent: Decimal::new(5, 0),
            },
            StrategyMetrics {
                kind: StrategyKind::Staking,
                total_assets: Decimal::ZERO,
                apy_percent: Decimal::new(8, 0),
            },
        ];
        assert_eq!(weighted_apy(&strategies).unwrap(), Decimal::ZERO);
        assert_eq!(weighted_apy(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn weighted_apy_weights_by_assets() {
        let snapshot = BalanceSnapshot::assemble(
            account(),
            readings(vec![
                StrategyReading {
                    kind: StrategyKind::Lending,
                    total_assets: tokens(300),
                    apy: U256::from(500u64),
                },
                StrategyReading {
                    kind: StrategyKind::Liquidity,
                    total_assets: tokens(100),
                    apy: U256::from(1_300u64),
                },
            ]),
            Utc::now(),
        )
        .unwrap();

        // (300 * 5 + 100 * 13) / 400 = 7
        assert_eq!(snapshot.weighted_apy_percent(), Decimal::new(7, 0));
        assert_eq!(snapshot.strategies_total_assets(), Decimal::new(400, 0));
    }

    #[test]
    fn account_assets_are_proportional_to_shares() {
        let snapshot = BalanceSnapshot::assemble(account(), readings(vec![]), Utc::now()).unwrap();
        // 500 shares of 1000 outstanding against 2000 assets
        assert_eq!(snapshot.account_assets(), Decimal::new(1_000, 0));
        assert_eq!(snapshot.token_balance(), Decimal::new(9_500, 0));
        assert_eq!(snapshot.vault_total_assets(), Decimal::new(2_000, 0));
        assert!(snapshot.claimed());
    }

    #[test]
    fn estimated_return_uses_weighted_apy() {
        let snapshot = BalanceSnapshot::assemble(
            account(),
            readings(vec![StrategyReading {
                kind: StrategyKind::Staking,
                total_assets: tokens(1_000),
                apy: U256::from(1_250u64),
            }]),
            Utc::now(),
        )
        .unwrap();
        // 1000 assets at 12.5 %
        assert_eq!(snapshot.estimated_annual_return(), Decimal::new(125, 0));
    }

    #[test]
    fn empty_vault_has_zero_account_assets() {
        let mut raw = readings(vec![]);
        raw.vault_total_supply = U256::zero();
        let snapshot = BalanceSnapshot::assemble(account(), raw, Utc::now()).unwrap();
        assert_eq!(snapshot.account_assets(), Decimal::ZERO);
        assert_eq!(snapshot.estimated_annual_return(), Decimal::ZERO);
    }

    #[test]
    fn unrepresentable_reading_fails_assembly() {
        let mut raw = readings(vec![]);
        raw.token_balance = U256::MAX;
        assert!(BalanceSnapshot::assemble(account(), raw, Utc::now()).is_err());
    }

    proptest! {
        #[test]
        fn weighted_apy_stays_within_strategy_range(
            entries in proptest::collection::vec((0u64..1_000_000, 0u64..10_000), 1..6)
        ) {
            let strategies: Vec<StrategyMetrics> = entries
                .iter()
                .map(|(assets, apy)| StrategyMetrics {
                    kind: StrategyKind::Lending,
                    total_assets: Decimal::from(*assets),
                    apy_percent: Decimal::new(i64::try_from(*apy).unwrap_or(0), 2),
                })
                .collect();

            let result = weighted_apy(&strategies).unwrap();
            let funded: Vec<&StrategyMetrics> = strategies
                .iter()
                .filter(|s| !s.total_assets.is_zero())
                .collect();

            if funded.is_empty() {
                prop_assert_eq!(result, Decimal::ZERO);
            } else {
                let min = funded.iter().map(|s| s.apy_percent).min().unwrap();
                let max = funded.iter().map(|s| s.apy_percent).max().unwrap();
                prop_assert!(result >= min - Decimal::new(1, 20));
                prop_assert!(result <= max + Decimal::new(1, 20));
            }
        }
    }
}
