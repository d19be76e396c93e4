//! # State Synchronizer
//!
//! Re-derives the cached [`BalanceSnapshot`] of an account from chain reads.
//!
//! All reads of a refresh are issued concurrently. A new snapshot is stored
//! only when every read succeeds; any failure leaves the previous snapshot in
//! place. Snapshots are replaced wholesale, never patched.
//!
//! Every account carries an epoch that [`StateSynchronizer::forget`] advances.
//! A refresh stores its snapshot only if the epoch it was issued under is
//! still current, so reads that finish after a disconnect are discarded.

use crate::application::error::{SyncError, SyncResult};
use crate::domain::entities::balance_snapshot::{BalanceSnapshot, ChainReadings, StrategyReading};
use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::contract_call::{ContractCall, ContractFunction};
use crate::domain::value_objects::contracts::{ContractSet, StrategyContract};
use crate::infrastructure::blockchain::client::ChainReader;
use chrono::Utc;
use dashmap::DashMap;
use ethers::types::U256;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Snapshot slot of one account.
#[derive(Debug, Default)]
struct Slot {
    epoch: u64,
    snapshot: Option<Arc<BalanceSnapshot>>,
}

/// Maintains one snapshot per account.
#[derive(Debug)]
pub struct StateSynchronizer {
    reader: Arc<dyn ChainReader>,
    contracts: ContractSet,
    slots: DashMap<AccountAddress, Slot>,
}

impl StateSynchronizer {
    /// Creates a synchronizer with no cached snapshots.
    #[must_use]
    pub fn new(reader: Arc<dyn ChainReader>, contracts: ContractSet) -> Self {
        Self {
            reader,
            contracts,
            slots: DashMap::new(),
        }
    }

    /// Returns the contracts read from.
    #[must_use]
    pub fn contracts(&self) -> &ContractSet {
        &self.contracts
    }

    /// Returns the cached snapshot for `account`, if any.
    #[must_use]
    pub fn snapshot(&self, account: &AccountAddress) -> Option<Arc<BalanceSnapshot>> {
        self.slots
            .get(account)
            .and_then(|slot| slot.snapshot.as_ref().map(Arc::clone))
    }

    /// Returns the current epoch of `account`.
    #[must_use]
    pub fn epoch(&self, account: &AccountAddress) -> u64 {
        self.slots.get(account).map_or(0, |slot| slot.epoch)
    }

    /// Drops the cached snapshot for `account` and advances its epoch.
    ///
    /// Refreshes issued before this call no longer store their result.
    pub fn forget(&self, account: &AccountAddress) {
        let mut slot = self.slots.entry(account.clone()).or_default();
        slot.epoch = slot.epoch.wrapping_add(1);
        slot.snapshot = None;
    }

    /// Reads fresh chain state for `account` and replaces its snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails or a figure cannot be represented;
    /// the previous snapshot is kept.
    pub async fn refresh(&self, account: &AccountAddress) -> SyncResult<Arc<BalanceSnapshot>> {
        self.refresh_in_epoch(account, self.epoch(account)).await
    }

    /// Refreshes on behalf of work issued under `epoch`.
    ///
    /// The snapshot is stored only while `epoch` is still current, and never
    /// replaces one whose reads started later. The fresh snapshot is returned
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails or a figure cannot be represented;
    /// the previous snapshot is kept.
    #[instrument(skip(self), fields(account = %account))]
    pub async fn refresh_in_epoch(
        &self,
        account: &AccountAddress,
        epoch: u64,
    ) -> SyncResult<Arc<BalanceSnapshot>> {
        let started = Utc::now();

        let readings = match self.read_all(account).await {
            Ok(readings) => readings,
            Err(e) => {
                warn!(error = %e, retryable = e.is_retryable(), "refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };
        let snapshot = Arc::new(BalanceSnapshot::assemble(account.clone(), readings, started)?);

        let mut slot = self.slots.entry(account.clone()).or_default();
        if slot.epoch != epoch {
            debug!(epoch, current = slot.epoch, "account forgotten during refresh, discarding");
            return Ok(snapshot);
        }
        if let Some(current) = slot
            .snapshot
            .as_ref()
            .filter(|current| current.fetched_at() > started)
        {
            debug!("newer snapshot already stored");
            return Ok(Arc::clone(current));
        }
        slot.snapshot = Some(Arc::clone(&snapshot));
        drop(slot);

        debug!(
            vault_shares = %snapshot.vault_shares(),
            claimed = snapshot.claimed(),
            "snapshot refreshed"
        );
        Ok(snapshot)
    }

    async fn read_all(&self, account: &AccountAddress) -> SyncResult<ChainReadings> {
        let token = &self.contracts.token;
        let vault = &self.contracts.vault;

        let (token_balance, claimed, vault_shares, vault_total_assets, vault_total_supply, strategies) = futures::try_join!(
            self.read_uint(
                "token.balanceOf",
                ContractCall::new(token.clone(), ContractFunction::BalanceOf)
                    .address_arg(account.as_str()),
            ),
            self.read_bool(
                "token.hasClaimed",
                ContractCall::new(token.clone(), ContractFunction::HasClaimed)
                    .address_arg(account.as_str()),
            ),
            self.read_uint(
                "vault.balanceOf",
                ContractCall::new(vault.clone(), ContractFunction::BalanceOf)
                    .address_arg(account.as_str()),
            ),
            self.read_uint(
                "vault.totalAssets",
                ContractCall::new(vault.clone(), ContractFunction::TotalAssets),
            ),
            self.read_uint(
                "vault.totalSupply",
                ContractCall::new(vault.clone(), ContractFunction::TotalSupply),
            ),
            try_join_all(
                self.contracts
                    .strategies
                    .iter()
                    .map(|strategy| self.read_strategy(strategy))
            ),
        )?;

        Ok(ChainReadings {
            token_balance,
            claimed,
            vault_shares,
            vault_total_assets,
            vault_total_supply,
            strategies,
        })
    }

    async fn read_strategy(&self, strategy: &StrategyContract) -> SyncResult<StrategyReading> {
        let (total_assets, apy) = futures::try_join!(
            self.read_uint(
                "strategy.totalAssets",
                ContractCall::new(strategy.address.clone(), ContractFunction::TotalAssets),
            ),
            self.read_uint(
                "strategy.estimatedAPY",
                ContractCall::new(strategy.address.clone(), ContractFunction::EstimatedApy),
            ),
        )?;

        Ok(StrategyReading {
            kind: strategy.kind,
            total_assets,
            apy,
        })
    }

    async fn read_uint(&self, field: &'static str, call: ContractCall) -> SyncResult<U256> {
        self.reader
            .read(&call)
            .await
            .map_err(|e| SyncError::read(field, e))?
            .as_uint()
            .ok_or(SyncError::unexpected_type(field))
    }

    async fn read_bool(&self, field: &'static str, call: ContractCall) -> SyncResult<bool> {
        self.reader
            .read(&call)
            .await
            .map_err(|e| SyncError::read(field, e))?
            .as_bool()
            .ok_or(SyncError::unexpected_type(field))
    }
}
