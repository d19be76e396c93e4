//! # Infrastructure Layer
//!
//! Adapters between the application layer and an Ethereum node: the ABI
//! codec, the JSON-RPC client, gas estimation and wallet providers.

pub mod blockchain;
