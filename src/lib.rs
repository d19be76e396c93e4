//! # Vault Client
//!
//! Client-side orchestrator for a yield vault: airdrop claims, deposits,
//! withdrawals and pool metrics, driven through an Ethereum JSON-RPC node.
//!
//! ## Architecture
//!
//! This crate follows Domain-Driven Design with a layered architecture:
//!
//! - **Domain Layer** (`domain`): Operations, step plans, statuses, errors and the balance snapshot
//! - **Application Layer** (`application`): Sequencer, synchronizer, receipt waiting and sessions
//! - **Infrastructure Layer** (`infrastructure`): Chain adapter, ABI codec, gas estimation and wallets
//!
//! ## Example
//!
//! ```rust,ignore
//! use vault_client::application::Session;
//!
//! let session = Session::connect(account, sequencer, None).await;
//! let status = session.deposit(amount).await;
//! assert!(status.is_success());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
