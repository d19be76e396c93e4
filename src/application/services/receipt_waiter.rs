//! # Receipt Waiter
//!
//! Polls a [`ReceiptSource`] until a broadcast transaction is included or a
//! deadline passes.
//!
//! A transient poll failure is not a verdict on the transaction: it is logged
//! and polling continues until the deadline. [`ReceiptOutcome::TimedOut`]
//! therefore means "unknown", never "failed". A lookup that can never succeed
//! (a malformed handle) ends the wait with [`ReceiptOutcome::Failed`].

use crate::domain::value_objects::contract_call::TxHandle;
use crate::infrastructure::blockchain::client::{ChainError, ReceiptSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Terminal result of waiting for a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// Included and successful.
    Success {
        /// Block the transaction was included in.
        block_number: u64,
    },
    /// Included and reverted.
    Reverted {
        /// Block the transaction was included in.
        block_number: u64,
    },
    /// Not observed before the deadline.
    TimedOut,
    /// The receipt cannot be looked up at all.
    Failed {
        /// Non-transient lookup error.
        reason: ChainError,
    },
}

impl ReceiptOutcome {
    /// Returns true for [`ReceiptOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Configuration for receipt polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterConfig {
    /// Delay between polls.
    pub poll_interval: Duration,
    /// Default deadline for state-changing calls.
    pub timeout: Duration,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1_000),
            timeout: Duration::from_millis(60_000),
        }
    }
}

impl WaiterConfig {
    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Waits for transaction receipts.
#[derive(Debug, Clone)]
pub struct ReceiptWaiter {
    source: Arc<dyn ReceiptSource>,
    config: WaiterConfig,
}

impl ReceiptWaiter {
    /// Creates a waiter over a receipt source.
    #[must_use]
    pub fn new(source: Arc<dyn ReceiptSource>, config: WaiterConfig) -> Self {
        Self { source, config }
    }

    /// Returns the waiter configuration.
    #[must_use]
    pub const fn config(&self) -> &WaiterConfig {
        &self.config
    }

    /// Waits with the configured default timeout.
    pub async fn await_default(&self, handle: &TxHandle) -> ReceiptOutcome {
        self.await_receipt(handle, self.config.timeout).await
    }

    /// Polls until `handle` is included or `deadline` elapses.
    pub async fn await_receipt(&self, handle: &TxHandle, deadline: Duration) -> ReceiptOutcome {
        match timeout(deadline, self.poll(handle)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let timeout_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX);
                warn!(handle = %handle, timeout_ms, "receipt wait timed out");
                ReceiptOutcome::TimedOut
            }
        }
    }

    async fn poll(&self, handle: &TxHandle) -> ReceiptOutcome {
        let mut attempts: u64 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            match self.source.receipt(handle).await {
                Ok(Some(receipt)) if receipt.success => {
                    debug!(
                        handle = %handle,
                        block = receipt.block_number,
                        gas_used = receipt.gas_used,
                        attempts,
                        "transaction confirmed"
                    );
                    return ReceiptOutcome::Success {
                        block_number: receipt.block_number,
                    };
                }
                Ok(Some(receipt)) => {
                    warn!(handle = %handle, block = receipt.block_number, "transaction reverted");
                    return ReceiptOutcome::Reverted {
                        block_number: receipt.block_number,
                    };
                }
                Ok(None) => {}
                Err(e) if !e.is_transient() => {
                    warn!(handle = %handle, error = %e, "receipt lookup failed permanently");
                    return ReceiptOutcome::Failed { reason: e };
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, attempts, "receipt poll failed, retrying");
                }
            }
            sleep(self.config.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::client::{ChainResult, TxReceipt};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Returns scripted poll results, then `None` forever.
    #[derive(Debug, Default)]
    struct ScriptedReceipts {
        script: Mutex<VecDeque<ChainResult<Option<TxReceipt>>>>,
        polls: Mutex<u32>,
    }

    impl ScriptedReceipts {
        fn new(script: Vec<ChainResult<Option<TxReceipt>>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                polls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl ReceiptSource for ScriptedReceipts {
        async fn receipt(&self, _handle: &TxHandle) -> ChainResult<Option<TxReceipt>> {
            *self.polls.lock() += 1;
            self.script.lock().pop_front().unwrap_or(Ok(None))
        }
    }

    fn waiter(source: Arc<ScriptedReceipts>) -> ReceiptWaiter {
        ReceiptWaiter::new(
            source,
            WaiterConfig::default().with_poll_interval(Duration::from_millis(10)),
        )
    }

    fn handle() -> TxHandle {
        TxHandle::new("0xabc")
    }

    #[tokio::test]
    async fn success_after_pending_polls() {
        let source = ScriptedReceipts::new(vec![
            Ok(None),
            Ok(None),
            Ok(Some(TxReceipt::success(handle(), 42))),
        ]);
        let outcome = waiter(Arc::clone(&source))
            .await_receipt(&handle(), Duration::from_secs(5))
            .await;

        assert_eq!(outcome, ReceiptOutcome::Success { block_number: 42 });
        assert_eq!(*source.polls.lock(), 3);
    }

    #[tokio::test]
    async fn reverted_receipt() {
        let source = ScriptedReceipts::new(vec![Ok(Some(TxReceipt::reverted(handle(), 7)))]);
        let outcome = waiter(source).await_receipt(&handle(), Duration::from_secs(5)).await;
        assert_eq!(outcome, ReceiptOutcome::Reverted { block_number: 7 });
    }

    #[tokio::test]
    async fn poll_errors_do_not_end_the_wait() {
        let source = ScriptedReceipts::new(vec![
            Err(ChainError::rpc("502 bad gateway")),
            Ok(Some(TxReceipt::success(handle(), 9))),
        ]);
        let outcome = waiter(source).await_receipt(&handle(), Duration::from_secs(5)).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn permanent_lookup_error_ends_the_wait() {
        let source = ScriptedReceipts::new(vec![
            Ok(None),
            Err(ChainError::invalid_input("invalid transaction hash")),
        ]);
        let outcome = waiter(Arc::clone(&source))
            .await_receipt(&handle(), Duration::from_secs(5))
            .await;

        assert_eq!(
            outcome,
            ReceiptOutcome::Failed {
                reason: ChainError::invalid_input("invalid transaction hash")
            }
        );
        assert_eq!(*source.polls.lock(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_when_never_included() {
        let source = ScriptedReceipts::new(vec![]);
        let outcome = waiter(source)
            .await_receipt(&handle(), Duration::from_secs(60))
            .await;
        assert_eq!(outcome, ReceiptOutcome::TimedOut);
    }

    #[test]
    fn default_config() {
        let config = WaiterConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }
}
