//! # Domain Errors
//!
//! Typed error types for domain operations.
//!
//! # Examples
//!
//! ```
//! use vault_client::domain::errors::OperationError;
//!
//! let err = OperationError::already_done("airdrop already claimed");
//! assert!(!err.is_outcome_unknown());
//! ```

pub mod operation_error;

pub use operation_error::OperationError;
