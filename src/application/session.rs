//! # Sessions
//!
//! Session-scoped context for a connected account.
//!
//! A [`Session`] is created when an account connects and torn down when it
//! disconnects. It refreshes the account's snapshot on connect, fronts the
//! shared sequencer for that account and, when configured, keeps a periodic
//! refresh task alive until disconnect.
//!
//! [`SessionManager`] follows a wallet's [`WalletEvent`]s and keeps at most one
//! session open.

use crate::application::error::SyncResult;
use crate::application::services::sequencer::OperationSequencer;
use crate::application::services::synchronizer::StateSynchronizer;
use crate::domain::entities::balance_snapshot::BalanceSnapshot;
use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::operation::{Operation, OperationKind, OperationRequest};
use crate::domain::value_objects::status::OperationStatus;
use crate::infrastructure::blockchain::wallet::WalletEvent;
use ethers::types::U256;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Operations and state for one connected account.
#[derive(Debug)]
pub struct Session {
    account: AccountAddress,
    sequencer: Arc<OperationSequencer>,
    refresher: Option<JoinHandle<()>>,
}

impl Session {
    /// Opens a session and performs the initial refresh.
    ///
    /// A failed initial refresh is logged; the session still opens.
    pub async fn connect(
        account: AccountAddress,
        sequencer: Arc<OperationSequencer>,
        refresh_interval: Option<Duration>,
    ) -> Self {
        info!(account = %account, "session connected");
        if let Err(e) = sequencer.synchronizer().refresh(&account).await {
            warn!(account = %account, error = %e, "initial refresh failed");
        }

        let refresher = refresh_interval.map(|every| {
            spawn_refresher(Arc::clone(sequencer.synchronizer()), account.clone(), every)
        });

        Self {
            account,
            sequencer,
            refresher,
        }
    }

    /// Returns the connected account.
    #[must_use]
    pub fn account(&self) -> &AccountAddress {
        &self.account
    }

    /// Executes an operation for the session's account.
    pub async fn execute(&self, operation: Operation) -> OperationStatus {
        self.sequencer
            .execute(OperationRequest::for_account(self.account.clone(), operation))
            .await
    }

    /// Claims the airdrop.
    pub async fn claim(&self) -> OperationStatus {
        self.execute(Operation::Claim).await
    }

    /// Deposits `amount` tokens into the vault, approving first when needed.
    pub async fn deposit(&self, amount: U256) -> OperationStatus {
        self.execute(Operation::Deposit { amount }).await
    }

    /// Withdraws `amount` tokens from the vault.
    pub async fn withdraw(&self, amount: U256) -> OperationStatus {
        self.execute(Operation::Withdraw { amount }).await
    }

    /// Redeems `shares` vault shares.
    pub async fn redeem(&self, shares: U256) -> OperationStatus {
        self.execute(Operation::Redeem { shares }).await
    }

    /// Rebalances the vault across its strategies.
    pub async fn rebalance(&self) -> OperationStatus {
        self.execute(Operation::Rebalance).await
    }

    /// Mints test tokens to `recipient`.
    pub async fn mint_test(&self, recipient: impl Into<String>, amount: U256) -> OperationStatus {
        self.execute(Operation::MintTest {
            recipient: recipient.into(),
            amount,
        })
        .await
    }

    /// Refreshes the account's snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if any read fails; the previous snapshot is kept.
    pub async fn refresh(&self) -> SyncResult<Arc<BalanceSnapshot>> {
        self.sequencer.synchronizer().refresh(&self.account).await
    }

    /// Returns the cached snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<BalanceSnapshot>> {
        self.sequencer.synchronizer().snapshot(&self.account)
    }

    /// Returns the status of an operation kind for this account.
    #[must_use]
    pub fn status(&self, kind: OperationKind) -> OperationStatus {
        self.sequencer.status(&self.account, kind)
    }

    /// Tears the session down: stops periodic refresh and drops the snapshot.
    ///
    /// Operations already in flight run to their terminal status.
    pub fn disconnect(&self) {
        if let Some(refresher) = &self.refresher {
            refresher.abort();
        }
        self.sequencer.synchronizer().forget(&self.account);
        info!(account = %self.account, "session disconnected");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(refresher) = self.refresher.take() {
            refresher.abort();
        }
    }
}

fn spawn_refresher(
    synchronizer: Arc<StateSynchronizer>,
    account: AccountAddress,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; connect already refreshed.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = synchronizer.refresh(&account).await {
                warn!(account = %account, error = %e, "periodic refresh failed");
            }
        }
    })
}

/// Keeps at most one session open, following wallet events.
#[derive(Debug)]
pub struct SessionManager {
    sequencer: Arc<OperationSequencer>,
    refresh_interval: Option<Duration>,
    current: Mutex<Option<Arc<Session>>>,
}

impl SessionManager {
    /// Creates a manager with no open session.
    #[must_use]
    pub fn new(sequencer: Arc<OperationSequencer>, refresh_interval: Option<Duration>) -> Self {
        Self {
            sequencer,
            refresh_interval,
            current: Mutex::new(None),
        }
    }

    /// Returns the open session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.lock().clone()
    }

    /// Applies a wallet event.
    ///
    /// Connecting replaces any open session; the previous one is torn down.
    pub async fn handle(&self, event: WalletEvent) -> Option<Arc<Session>> {
        match event {
            WalletEvent::Connected(account) => {
                if let Some(current) = self.current()
                    && current.account() == &account
                {
                    return Some(current);
                }
                let session = Arc::new(
                    Session::connect(account, Arc::clone(&self.sequencer), self.refresh_interval)
                        .await,
                );
                let previous = self.current.lock().replace(Arc::clone(&session));
                if let Some(previous) = previous {
                    previous.disconnect();
                }
                Some(session)
            }
            WalletEvent::Disconnected => {
                let previous = self.current.lock().take();
                if let Some(previous) = previous {
                    previous.disconnect();
                }
                None
            }
        }
    }

    /// Applies events until the wallet's channel closes.
    pub async fn run(&self, mut events: broadcast::Receiver<WalletEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle(event).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "wallet events lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
