//! # Application Layer
//!
//! Operation orchestration and session management.
//!
//! This layer coordinates domain objects and chain adapters: it sequences
//! operation steps, tracks their lifecycle and keeps balance snapshots in
//! sync with the chain.
//!
//! ## Services
//!
//! - [`OperationSequencer`]: executes operations step by step
//! - [`StateSynchronizer`]: refreshes balance snapshots
//! - [`ReceiptWaiter`]: waits for transaction receipts
//!
//! ## Sessions
//!
//! - [`Session`]: context of one connected account
//! - [`SessionManager`]: follows wallet connect/disconnect events

pub mod error;
pub mod services;
pub mod session;

pub use error::{SyncError, SyncResult};
pub use services::{
    FlightGuard, FlightTable, OperationSequencer, ReceiptOutcome, ReceiptWaiter,
    StateSynchronizer, StatusUpdate, WaiterConfig,
};
pub use session::{Session, SessionManager};
