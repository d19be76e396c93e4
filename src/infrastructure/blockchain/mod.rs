//! # Blockchain Adapters
//!
//! Chain access for the orchestrator.
//!
//! ## Available Components
//!
//! - [`ChainReader`], [`ChainWriter`], [`ReceiptSource`]: adapter ports
//! - [`EthereumClient`]: JSON-RPC implementation of all three on ethers-rs
//! - [`ContractAbi`]: human-readable ABI encoding and decoding
//! - [`GasEstimator`]: gas estimation with buffer
//! - [`WalletProvider`]: connected account and signer availability

pub mod abi;
pub mod client;
pub mod ethereum;
pub mod gas;
pub mod wallet;

pub use abi::ContractAbi;
pub use client::{ChainError, ChainReader, ChainResult, ChainWriter, ReceiptSource, TxReceipt};
pub use ethereum::EthereumClient;
pub use gas::GasEstimator;
pub use wallet::{LocalWalletProvider, WalletEvent, WalletProvider};
