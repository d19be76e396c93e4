//! # Wallet Provider
//!
//! Account connectivity as seen by the orchestrator.
//!
//! A [`WalletProvider`] reports the connected account and whether it can
//! sign, and announces connect/disconnect through [`WalletEvent`]s.
//! [`LocalWalletProvider`] backs it with an `ethers` [`LocalWallet`] loaded
//! from a private key.

use crate::domain::errors::OperationError;
use crate::domain::value_objects::address::AccountAddress;
use ethers::signers::{LocalWallet, Signer};
use parking_lot::RwLock;
use std::fmt;
use tokio::sync::broadcast;

/// Capacity of the wallet event channel.
const EVENT_CAPACITY: usize = 16;

/// Connectivity change announced by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// An account was connected.
    Connected(AccountAddress),
    /// The account was disconnected.
    Disconnected,
}

/// Source of the connected account.
pub trait WalletProvider: Send + Sync + fmt::Debug {
    /// Returns the connected account, if any.
    fn current_account(&self) -> Option<AccountAddress>;

    /// Returns true if the connected account can sign transactions.
    fn signer_available(&self) -> bool;

    /// Subscribes to connectivity changes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Wallet provider backed by a local private key.
#[derive(Debug)]
pub struct LocalWalletProvider {
    wallet: LocalWallet,
    connected: RwLock<Option<AccountAddress>>,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWalletProvider {
    /// Creates a provider for the given wallet, initially disconnected.
    #[must_use]
    pub fn new(wallet: LocalWallet) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            wallet,
            connected: RwLock::new(None),
            events,
        }
    }

    /// Creates a provider from a hex private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not parse.
    pub fn from_private_key(key: &str) -> Result<Self, OperationError> {
        let wallet: LocalWallet = key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .map_err(|_| OperationError::invalid_request("invalid private key"))?;
        Ok(Self::new(wallet))
    }

    /// Returns the wallet.
    #[must_use]
    pub fn wallet(&self) -> &LocalWallet {
        &self.wallet
    }

    /// Returns the wallet's address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be formatted.
    pub fn address(&self) -> Result<AccountAddress, OperationError> {
        AccountAddress::new(format!("{:?}", self.wallet.address()))
    }

    /// Connects the wallet's account and announces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be formatted.
    pub fn connect(&self) -> Result<AccountAddress, OperationError> {
        let account = self.address()?;
        *self.connected.write() = Some(account.clone());
        // No subscribers is fine.
        let _ = self.events.send(WalletEvent::Connected(account.clone()));
        Ok(account)
    }

    /// Disconnects and announces it.
    pub fn disconnect(&self) {
        if self.connected.write().take().is_some() {
            let _ = self.events.send(WalletEvent::Disconnected);
        }
    }
}

impl WalletProvider for LocalWalletProvider {
    fn current_account(&self) -> Option<AccountAddress> {
        self.connected.read().clone()
    }

    fn signer_available(&self) -> bool {
        self.connected.read().is_some()
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Well-known development key (anvil account 0).
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn starts_disconnected() {
        let provider = LocalWalletProvider::from_private_key(DEV_KEY).unwrap();
        assert!(provider.current_account().is_none());
        assert!(!provider.signer_available());
    }

    #[test]
    fn address_is_lowercase() {
        let provider = LocalWalletProvider::from_private_key(DEV_KEY).unwrap();
        assert_eq!(
            provider.address().unwrap().as_str(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn invalid_key_is_rejected() {
        assert!(LocalWalletProvider::from_private_key("xyz").is_err());
    }

    #[tokio::test]
    async fn connect_and_disconnect_emit_events() {
        let provider = LocalWalletProvider::from_private_key(DEV_KEY).unwrap();
        let mut events = provider.subscribe();

        let account = provider.connect().unwrap();
        assert_eq!(provider.current_account(), Some(account.clone()));
        assert!(provider.signer_available());
        assert_eq!(events.recv().await.unwrap(), WalletEvent::Connected(account));

        provider.disconnect();
        assert!(provider.current_account().is_none());
        assert_eq!(events.recv().await.unwrap(), WalletEvent::Disconnected);
    }
}
