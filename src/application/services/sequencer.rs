//! # Operation Sequencer
//!
//! Executes user operations as ordered sequences of on-chain steps.
//!
//! For every request the sequencer:
//! 1. Requires a connected account and valid parameters
//! 2. Claims the single-flight slot for (account, kind), or fails with `Busy`
//! 3. Runs precondition reads (claim idempotency, deposit allowance)
//! 4. Submits each step and waits for its receipt before the next one
//! 5. Refreshes the account's snapshot after success
//!
//! Intermediate statuses are published to subscribers as [`StatusUpdate`]s.
//! Requests rejected before a slot is claimed are answered directly and not
//! published, so they never shadow the status of the operation in flight.

use super::flight_table::{FlightGuard, FlightTable};
use super::receipt_waiter::{ReceiptOutcome, ReceiptWaiter};
use super::synchronizer::StateSynchronizer;
use crate::domain::entities::transaction_step::OperationPlan;
use crate::domain::errors::OperationError;
use crate::domain::value_objects::address::AccountAddress;
use crate::domain::value_objects::contract_call::{ContractCall, ContractFunction, TxHandle};
use crate::domain::value_objects::ids::OperationId;
use crate::domain::value_objects::operation::{Operation, OperationKind, OperationRequest};
use crate::domain::value_objects::status::OperationStatus;
use crate::infrastructure::blockchain::client::{ChainReader, ChainWriter};
use ethers::types::U256;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Capacity of the status broadcast channel.
const STATUS_CHANNEL_CAPACITY: usize = 64;

/// A status change of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// Operation the update belongs to.
    pub id: OperationId,
    /// Account the operation runs for.
    pub account: AccountAddress,
    /// Operation kind.
    pub kind: OperationKind,
    /// New status.
    pub status: OperationStatus,
}

/// Sequences operation steps with single-flight execution.
#[derive(Debug)]
pub struct OperationSequencer {
    reader: Arc<dyn ChainReader>,
    writer: Arc<dyn ChainWriter>,
    waiter: ReceiptWaiter,
    synchronizer: Arc<StateSynchronizer>,
    flights: FlightTable,
    updates: broadcast::Sender<StatusUpdate>,
}

impl OperationSequencer {
    /// Creates a new sequencer.
    ///
    /// Contracts are taken from the synchronizer so both always agree.
    #[must_use]
    pub fn new(
        reader: Arc<dyn ChainReader>,
        writer: Arc<dyn ChainWriter>,
        waiter: ReceiptWaiter,
        synchronizer: Arc<StateSynchronizer>,
    ) -> Self {
        let (updates, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        Self {
            reader,
            writer,
            waiter,
            synchronizer,
            flights: FlightTable::new(),
            updates,
        }
    }

    /// Returns the synchronizer refreshed after successful operations.
    #[must_use]
    pub fn synchronizer(&self) -> &Arc<StateSynchronizer> {
        &self.synchronizer
    }

    /// Returns the current status of `(account, kind)`.
    ///
    /// Anything not in flight is [`OperationStatus::Idle`].
    #[must_use]
    pub fn status(&self, account: &AccountAddress, kind: OperationKind) -> OperationStatus {
        self.flights.status(account, kind).unwrap_or_default()
    }

    /// Subscribes to status updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.updates.subscribe()
    }

    /// Returns status updates as a stream, skipping updates a slow consumer
    /// missed.
    pub fn status_stream(&self) -> impl Stream<Item = StatusUpdate> + Send + 'static {
        BroadcastStream::new(self.subscribe()).filter_map(Result::ok)
    }

    /// Executes an operation and returns its terminal status.
    ///
    /// The result is always [`OperationStatus::Succeeded`] or
    /// [`OperationStatus::Failed`].
    #[instrument(skip(self, request), fields(operation_id = %request.id, kind = %request.kind()))]
    pub async fn execute(&self, request: OperationRequest) -> OperationStatus {
        let kind = request.kind();

        let account = match admit(&request) {
            Ok(account) => account,
            Err(reason) => {
                warn!(error = %reason, "operation rejected");
                return OperationStatus::failed(reason);
            }
        };

        let guard = match self.flights.try_acquire(&account, kind) {
            Ok(guard) => guard,
            Err(reason) => {
                info!(account = %account, "operation already in flight");
                return OperationStatus::failed(reason);
            }
        };

        // Work issued before a disconnect must not repopulate the snapshot.
        let epoch = self.synchronizer.epoch(&account);
        info!(account = %account, "operation started");
        let status = match self.run(&request, &account, &guard).await {
            Ok(handles) => {
                info!(account = %account, transactions = handles.len(), "operation succeeded");
                OperationStatus::Succeeded { handles }
            }
            Err(reason) => {
                warn!(
                    account = %account,
                    error = %reason,
                    retryable = reason.is_retryable(),
                    "operation failed"
                );
                OperationStatus::failed(reason)
            }
        };
        self.transition(&guard, &request, &account, status.clone());
        drop(guard);

        if status.is_success() {
            if let Err(e) = self.synchronizer.refresh_in_epoch(&account, epoch).await {
                warn!(account = %account, error = %e, "post-operation refresh failed");
            }
        }

        status
    }

    async fn run(
        &self,
        request: &OperationRequest,
        account: &AccountAddress,
        guard: &FlightGuard,
    ) -> Result<Vec<TxHandle>, OperationError> {
        let allowance = self.check_preconditions(&request.operation, account).await?;
        let plan = OperationPlan::build(
            &request.operation,
            account,
            self.synchronizer.contracts(),
            allowance,
        );

        let mut handles = Vec::with_capacity(plan.len());
        for (index, step) in plan.steps().iter().enumerate() {
            self.transition(guard, request, account, OperationStatus::Submitting { step: index });
            debug!(
                step = index,
                label = step.label,
                call = %step.call,
                after_previous = step.requires_previous,
                "submitting step"
            );

            let handle = self
                .writer
                .write(&step.call, step.gas_limit)
                .await
                .map_err(|e| e.into_operation_error(index))?;

            self.transition(
                guard,
                request,
                account,
                OperationStatus::AwaitingConfirmation {
                    step: index,
                    handle: handle.clone(),
                },
            );

            match self.waiter.await_default(&handle).await {
                ReceiptOutcome::Success { block_number } => {
                    debug!(step = index, handle = %handle, block_number, "step confirmed");
                    handles.push(handle);
                }
                ReceiptOutcome::Reverted { block_number } => {
                    return Err(OperationError::reverted(
                        index,
                        format!("{} reverted in block {}", step.label, block_number),
                    ));
                }
                ReceiptOutcome::TimedOut => {
                    return Err(OperationError::timed_out(index, handle));
                }
                ReceiptOutcome::Failed { reason } => {
                    return Err(reason.into_operation_error(index));
                }
            }
        }

        Ok(handles)
    }

    /// Runs the reads an operation depends on.
    ///
    /// Returns the deposit allowance when one was read.
    async fn check_preconditions(
        &self,
        operation: &Operation,
        account: &AccountAddress,
    ) -> Result<Option<U256>, OperationError> {
        let contracts = self.synchronizer.contracts();
        match operation {
            Operation::Claim => {
                let call = ContractCall::new(contracts.token.clone(), ContractFunction::HasClaimed)
                    .address_arg(account.as_str());
                let claimed = self
                    .reader
                    .read(&call)
                    .await?
                    .as_bool()
                    .ok_or_else(|| OperationError::rpc("hasClaimed returned a non-bool"))?;
                if claimed {
                    return Err(OperationError::already_done("airdrop already claimed"));
                }
                Ok(None)
            }
            Operation::Deposit { .. } => {
                let call = ContractCall::new(contracts.token.clone(), ContractFunction::Allowance)
                    .address_arg(account.as_str())
                    .address_arg(contracts.vault.as_str());
                match self.reader.read(&call).await {
                    Ok(value) => Ok(value.as_uint()),
                    Err(e) => {
                        warn!(error = %e, "allowance read failed, approving");
                        Ok(None)
                    }
                }
            }
            _ => Ok(None),
        }
    }

    fn transition(
        &self,
        guard: &FlightGuard,
        request: &OperationRequest,
        account: &AccountAddress,
        status: OperationStatus,
    ) {
        guard.set(status.clone());
        // No subscribers is fine.
        let _ = self.updates.send(StatusUpdate {
            id: request.id,
            account: account.clone(),
            kind: request.kind(),
            status,
        });
    }
}

/// Checks account presence and request parameters.
fn admit(request: &OperationRequest) -> Result<AccountAddress, OperationError> {
    let account = request.account.clone().ok_or(OperationError::NotConnected)?;
    request.operation.validate()?;
    Ok(account)
}
