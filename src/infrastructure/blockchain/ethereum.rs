//! # Ethereum Client
//!
//! JSON-RPC chain adapter using ethers-rs.
//!
//! Reads and receipt lookups go straight to the HTTP provider. Writes need a
//! signer: the client wraps the provider in a [`SignerMiddleware`] once a
//! wallet is attached.

use super::abi::{ContractAbi, parse_address};
use super::client::{
    ChainError, ChainReader, ChainResult, ChainWriter, ReceiptSource, TxReceipt,
};
use super::gas::GasEstimator;
use crate::domain::value_objects::contract_call::{ChainValue, ContractCall, TxHandle};
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, H256, TransactionRequest, U256};
use tracing::debug;

/// Ethereum client implementation using ethers-rs.
#[derive(Debug)]
pub struct EthereumClient {
    /// Chain id the client expects the node to report.
    chain_id: u64,
    /// RPC provider.
    provider: Provider<Http>,
    /// Signing middleware, present once a wallet is attached.
    signer: Option<SignerMiddleware<Provider<Http>, LocalWallet>>,
    /// Parsed contract ABI.
    abi: ContractAbi,
    /// Gas estimator with buffer.
    gas_estimator: GasEstimator,
}

impl EthereumClient {
    /// Creates a read-only client.
    ///
    /// # Arguments
    ///
    /// * `chain_id` - Expected chain id
    /// * `rpc_url` - RPC endpoint URL
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(chain_id: u64, rpc_url: &str) -> ChainResult<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| ChainError::invalid_input(format!("rpc url: {}", e)))?;

        Ok(Self {
            chain_id,
            provider,
            signer: None,
            abi: ContractAbi::load()?,
            gas_estimator: GasEstimator::default(),
        })
    }

    /// Replaces the gas estimator.
    #[must_use]
    pub fn with_gas_estimator(mut self, gas_estimator: GasEstimator) -> Self {
        self.gas_estimator = gas_estimator;
        self
    }

    /// Attaches a wallet, enabling writes.
    #[must_use]
    pub fn with_wallet(mut self, wallet: LocalWallet) -> Self {
        let wallet = wallet.with_chain_id(self.chain_id);
        self.signer = Some(SignerMiddleware::new(self.provider.clone(), wallet));
        self
    }

    /// Returns the expected chain id.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Returns the gas estimator.
    #[must_use]
    pub fn gas_estimator(&self) -> &GasEstimator {
        &self.gas_estimator
    }

    /// Returns the signer address, if a wallet is attached.
    #[must_use]
    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(SignerMiddleware::address)
    }

    /// Checks that the node is reachable and on the expected chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unreachable or reports another chain.
    pub async fn health_check(&self) -> ChainResult<()> {
        let chain_id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))?;

        if chain_id.as_u64() != self.chain_id {
            return Err(ChainError::invalid_input(format!(
                "chain ID mismatch: expected {}, got {}",
                self.chain_id,
                chain_id.as_u64()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ChainReader for EthereumClient {
    async fn read(&self, call: &ContractCall) -> ChainResult<ChainValue> {
        if !call.function.is_view() {
            return Err(ChainError::invalid_input(format!(
                "{} is not a view function",
                call.function
            )));
        }
        let to = parse_address(call.contract.as_str())?;
        let data = self.abi.encode(call)?;
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();

        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| classify_error(&e.to_string()))?;

        self.abi.decode(call.function, &output)
    }
}

#[async_trait]
impl ChainWriter for EthereumClient {
    async fn write(&self, call: &ContractCall, gas_limit: Option<u64>) -> ChainResult<TxHandle> {
        if call.function.is_view() {
            return Err(ChainError::invalid_input(format!(
                "{} is a view function",
                call.function
            )));
        }
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| ChainError::invalid_input("no signer configured"))?;

        let to = parse_address(call.contract.as_str())?;
        let data = self.abi.encode(call)?;
        let mut tx: TypedTransaction = TransactionRequest::new()
            .from(signer.address())
            .to(to)
            .data(data)
            .into();

        let gas = match gas_limit {
            Some(limit) => limit,
            None => {
                let estimate = signer
                    .estimate_gas(&tx, None)
                    .await
                    .map_err(|e| classify_error(&e.to_string()))?;
                self.gas_estimator.apply_buffer(saturating_u64(estimate))
            }
        };
        tx.set_gas(U256::from(gas));
        debug!(call = %call, gas, "submitting transaction");

        let pending = signer
            .send_transaction(tx, None)
            .await
            .map_err(|e| classify_error(&e.to_string()))?;

        Ok(TxHandle::new(format!("{:?}", pending.tx_hash())))
    }
}

#[async_trait]
impl ReceiptSource for EthereumClient {
    async fn receipt(&self, handle: &TxHandle) -> ChainResult<Option<TxReceipt>> {
        let hash: H256 = handle
            .as_str()
            .parse()
            .map_err(|_| ChainError::invalid_input(format!("invalid transaction hash: {}", handle)))?;

        let Some(receipt) = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::rpc(e.to_string()))?
        else {
            return Ok(None);
        };

        // Pending receipts carry no block yet.
        let Some(block_number) = receipt.block_number else {
            return Ok(None);
        };

        Ok(Some(TxReceipt {
            handle: handle.clone(),
            block_number: block_number.as_u64(),
            gas_used: receipt.gas_used.map(saturating_u64).unwrap_or_default(),
            success: receipt.status.is_some_and(|s| s.as_u64() == 1),
        }))
    }
}

/// Narrows a node-reported quantity, clamping at `u64::MAX`.
fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Maps a provider or signer error message onto a [`ChainError`].
#[must_use]
pub fn classify_error(message: &str) -> ChainError {
    let lower = message.to_lowercase();
    if lower.contains("user rejected") || lower.contains("user denied") || lower.contains("code: 4001")
    {
        ChainError::user_rejected(message)
    } else if lower.contains("insufficient funds") {
        ChainError::insufficient_funds(message)
    } else if lower.contains("execution reverted") || lower.contains("revert") {
        ChainError::reverted(message)
    } else {
        ChainError::rpc(message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::address::ContractAddress;
    use crate::domain::value_objects::contract_call::ContractFunction;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEPOLIA: u64 = 11_155_111;
    const TOKEN: &str = "0x00000000000000000000000000000000000000aa";
    const ACCOUNT: &str = "0x00000000000000000000000000000000000000a1";

    async fn rpc_server(rpc_method: &str, response: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&server)
            .await;
        server
    }

    fn result(value: Value) -> Value {
        json!({ "jsonrpc": "2.0", "id": 1, "result": value })
    }

    fn balance_call() -> ContractCall {
        ContractCall::new(
            ContractAddress::new(TOKEN).unwrap(),
            ContractFunction::BalanceOf,
        )
        .address_arg(ACCOUNT)
    }

    #[tokio::test]
    async fn read_decodes_eth_call_result() {
        let server = rpc_server("eth_call", result(json!(format!("0x{:064x}", 500)))).await;
        let client = EthereumClient::new(SEPOLIA, &server.uri()).unwrap();

        let value = client.read(&balance_call()).await.unwrap();
        assert_eq!(value, ChainValue::Uint(U256::from(500u64)));
    }

    #[tokio::test]
    async fn read_maps_revert() {
        let server = rpc_server(
            "eth_call",
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": 3, "message": "execution reverted: paused" }
            }),
        )
        .await;
        let client = EthereumClient::new(SEPOLIA, &server.uri()).unwrap();

        let err = client.read(&balance_call()).await.unwrap_err();
        assert!(matches!(err, ChainError::Reverted(_)));
    }

    #[tokio::test]
    async fn missing_receipt_is_none() {
        let server = rpc_server("eth_getTransactionReceipt", result(Value::Null)).await;
        let client = EthereumClient::new(SEPOLIA, &server.uri()).unwrap();
        let handle = TxHandle::new(format!("0x{}", "ab".repeat(32)));

        assert!(client.receipt(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn health_check_compares_chain_id() {
        let server = rpc_server("eth_chainId", result(json!("0xaa36a7"))).await;

        let client = EthereumClient::new(SEPOLIA, &server.uri()).unwrap();
        assert!(client.health_check().await.is_ok());

        let client = EthereumClient::new(1, &server.uri()).unwrap();
        assert!(client.health_check().await.is_err());
    }

    #[tokio::test]
    async fn write_without_wallet_is_rejected() {
        let client = EthereumClient::new(SEPOLIA, "http://127.0.0.1:8545").unwrap();
        let call = ContractCall::new(
            ContractAddress::new(TOKEN).unwrap(),
            ContractFunction::Airdrop,
        );

        let err = client.write(&call, None).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput(_)));
        assert!(client.signer_address().is_none());
    }

    #[tokio::test]
    async fn calls_must_match_function_mutability() {
        // Nothing listens here: both calls fail before any request.
        let client = EthereumClient::new(SEPOLIA, "http://127.0.0.1:1").unwrap();
        let token = ContractAddress::new(TOKEN).unwrap();

        let err = client
            .write(&balance_call(), Some(100_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput(ref msg) if msg.contains("view")));

        let airdrop = ContractCall::new(token, ContractFunction::Airdrop);
        let err = client.read(&airdrop).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput(ref msg) if msg.contains("not a view")));
    }

    #[test]
    fn oversized_quantities_saturate() {
        assert_eq!(saturating_u64(U256::from(21_000u64)), 21_000);
        assert_eq!(saturating_u64(U256::from(u64::MAX) + 1), u64::MAX);
    }

    #[tokio::test]
    async fn malformed_handle_is_invalid_input() {
        let client = EthereumClient::new(SEPOLIA, "http://127.0.0.1:1").unwrap();
        let err = client
            .receipt(&TxHandle::new("not-a-hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn invalid_rpc_url_is_rejected() {
        assert!(EthereumClient::new(SEPOLIA, "not a url").is_err());
    }

    #[test]
    fn classify_error_messages() {
        assert!(matches!(
            classify_error("MetaMask Tx Signature: User denied transaction signature."),
            ChainError::UserRejected(_)
        ));
        assert!(matches!(
            classify_error("(code: 4001, message: rejected, data: None)"),
            ChainError::UserRejected(_)
        ));
        assert!(matches!(
            classify_error("insufficient funds for gas * price + value"),
            ChainError::InsufficientFunds(_)
        ));
        assert!(matches!(
            classify_error("execution reverted: ERC20: insufficient allowance"),
            ChainError::Reverted(_)
        ));
        assert!(matches!(
            classify_error("connection refused"),
            ChainError::Rpc(_)
        ));
    }
}
