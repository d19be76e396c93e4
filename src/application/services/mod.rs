//! # Application Services
//!
//! Services that orchestrate domain logic and chain adapters.
//!
//! This module provides:
//! - [`OperationSequencer`]: single-flight, step-by-step operation execution
//! - [`StateSynchronizer`]: snapshot refresh from concurrent chain reads
//! - [`ReceiptWaiter`]: receipt polling with a deadline
//! - [`FlightTable`]: in-flight bookkeeping per (account, kind)

pub mod flight_table;
pub mod receipt_waiter;
pub mod sequencer;
pub mod synchronizer;


pub use flight_table::{FlightGuard, FlightTable};
pub use receipt_waiter::{ReceiptOutcome, ReceiptWaiter, WaiterConfig};
pub use sequencer::{OperationSequencer, StatusUpdate};
pub use synchronizer::StateSynchronizer;
