//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`OperationId`]: UUID-based operation identifier
//! - [`AccountAddress`], [`ContractAddress`]: non-empty address strings
//!
//! ## Chain Interaction
//!
//! - [`ContractCall`]: target, ABI function and arguments
//! - [`TxHandle`]: identifier of a broadcast transaction
//!
//! ## Operations
//!
//! - [`Operation`], [`OperationKind`], [`OperationRequest`]: user intents
//! - [`OperationStatus`]: operation lifecycle
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`]: Error type for arithmetic failures
//! - [`CheckedArithmetic`]: Trait for safe arithmetic operations

pub mod address;
pub mod arithmetic;
pub mod contract_call;
pub mod contracts;
pub mod ids;
pub mod operation;
pub mod status;

pub use address::{AccountAddress, ContractAddress};
pub use arithmetic::{
    APY_DECIMALS, ArithmeticError, ArithmeticResult, CheckedArithmetic, TOKEN_DECIMALS,
    fixed_to_decimal, parse_amount,
};
pub use contract_call::{CallArg, ChainValue, ContractCall, ContractFunction, TxHandle};
pub use contracts::{ContractSet, StrategyContract, StrategyKind};
pub use ids::OperationId;
pub use operation::{Operation, OperationKind, OperationRequest};
pub use status::OperationStatus;
