//! # Addresses
//!
//! Account and contract address value objects.
//!
//! Both are opaque strings to the orchestrator: the only validation applied
//! here is non-emptiness. Parsing into a concrete chain address happens in
//! the chain adapters at call time.

use crate::domain::errors::OperationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The connected wallet account.
///
/// Normalized to lowercase so that checksummed and plain spellings of the
/// same address key the same in-flight operation.
///
/// # Examples
///
/// ```
/// use vault_client::domain::value_objects::address::AccountAddress;
///
/// let account = AccountAddress::new("0xA1").unwrap();
/// assert_eq!(account.as_str(), "0xa1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Creates a new account address.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidRequest`] if the address is empty.
    pub fn new(address: impl AsRef<str>) -> Result<Self, OperationError> {
        let trimmed = address.as_ref().trim();
        if trimmed.is_empty() {
            return Err(OperationError::invalid_request("account address is empty"));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountAddress {
    type Error = OperationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountAddress> for String {
    fn from(value: AccountAddress) -> Self {
        value.0
    }
}

/// A deployed contract address, injected from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractAddress(String);

impl ContractAddress {
    /// Creates a new contract address.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidRequest`] if the address is empty.
    pub fn new(address: impl AsRef<str>) -> Result<Self, OperationError> {
        let trimmed = address.as_ref().trim();
        if trimmed.is_empty() {
            return Err(OperationError::invalid_request("contract address is empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ContractAddress {
    type Error = OperationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ContractAddress> for String {
    fn from(value: ContractAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn account_address_is_lowercased() {
        let a = AccountAddress::new("0xABCdef").unwrap();
        let b = AccountAddress::new("0xabcDEF").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabcdef");
    }

    #[test]
    fn empty_addresses_are_rejected() {
        assert!(AccountAddress::new("").is_err());
        assert!(AccountAddress::new("   ").is_err());
        assert!(ContractAddress::new("").is_err());
    }

    #[test]
    fn contract_address_keeps_spelling() {
        let addr = ContractAddress::new(" 0xAbC ").unwrap();
        assert_eq!(addr.as_str(), "0xAbC");
    }

    #[test]
    fn deserialize_rejects_empty() {
        let result: Result<ContractAddress, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
        let ok: ContractAddress = serde_json::from_str("\"0x01\"").unwrap();
        assert_eq!(ok.as_str(), "0x01");
    }
}
