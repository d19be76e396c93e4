//! # Domain Entities
//!
//! ## Operation Planning
//!
//! - [`OperationPlan`]: ordered steps of an operation
//! - [`TransactionStep`]: one state-changing call
//!
//! ## Cached State
//!
//! - [`BalanceSnapshot`]: consistent view of balances and pool metrics

pub mod balance_snapshot;
pub mod transaction_step;

pub use balance_snapshot::{
    BalanceSnapshot, ChainReadings, StrategyMetrics, StrategyReading, weighted_apy,
};
pub use transaction_step::{MINT_GAS_LIMIT, OperationPlan, TransactionStep};
