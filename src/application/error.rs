//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Operation failures are reported as
//! [`OperationError`](crate::domain::errors::OperationError), which lives in
//! the domain because it is carried inside operation statuses. Refresh
//! failures are reported as [`SyncError`].
//!
//! # Error Hierarchy
//!
//! ```text
//! SyncError
//! ├── Read { field, source }     - A chain read failed
//! ├── UnexpectedType { field }   - A read decoded to the wrong type
//! └── Arithmetic(ArithmeticError) - A figure could not be represented
//! ```

use crate::domain::value_objects::arithmetic::ArithmeticError;
use crate::infrastructure::blockchain::client::ChainError;
use thiserror::Error;

/// Error type for snapshot refreshes.
///
/// A failed refresh never touches the stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A chain read failed.
    #[error("read of {field} failed: {source}")]
    Read {
        /// Which value was being read.
        field: &'static str,
        /// Adapter error.
        #[source]
        source: ChainError,
    },

    /// A read returned a value of the wrong type.
    #[error("read of {field} returned an unexpected type")]
    UnexpectedType {
        /// Which value was being read.
        field: &'static str,
    },

    /// A snapshot figure could not be represented.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl SyncError {
    /// Creates a read error.
    #[must_use]
    pub fn read(field: &'static str, source: ChainError) -> Self {
        Self::Read { field, source }
    }

    /// Creates an unexpected type error.
    #[must_use]
    pub const fn unexpected_type(field: &'static str) -> Self {
        Self::UnexpectedType { field }
    }

    /// Returns true if retrying the refresh may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Read {
                source: ChainError::Rpc(_),
                ..
            }
        )
    }
}

/// Result type for snapshot refreshes.
pub type SyncResult<T> = Result<T, SyncError>;
