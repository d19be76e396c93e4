//! # Configuration
//!
//! Application configuration loading and management.
//!
//! # Configuration Sources
//!
//! Configuration is loaded in the following order (later sources override earlier):
//! 1. Default values
//! 2. Configuration file (if exists), `vault-client.toml` unless
//!    `VAULT_CLIENT_CONFIG_FILE` names another
//! 3. Environment variables (prefixed with `VAULT_CLIENT__`, nested with `__`),
//!    including those from a `.env` file
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `VAULT_CLIENT__CHAIN__RPC_URL` | JSON-RPC endpoint | (required) |
//! | `VAULT_CLIENT__CHAIN__CHAIN_ID` | Expected chain id | `11155111` |
//! | `VAULT_CLIENT__CHAIN__PRIVATE_KEY` | Signer key | (none) |
//! | `VAULT_CLIENT__CONTRACTS__TOKEN` | Token address | (required) |
//! | `VAULT_CLIENT__CONTRACTS__VAULT` | Vault address | (required) |
//! | `VAULT_CLIENT__CONTRACTS__LENDING` | Lending strategy address | (required) |
//! | `VAULT_CLIENT__CONTRACTS__STAKING` | Staking strategy address | (required) |
//! | `VAULT_CLIENT__CONTRACTS__LIQUIDITY` | Liquidity strategy address | (required) |
//! | `VAULT_CLIENT__ORCHESTRATOR__RECEIPT_TIMEOUT_MS` | Receipt deadline | `60000` |
//! | `VAULT_CLIENT__ORCHESTRATOR__POLL_INTERVAL_MS` | Receipt poll interval | `1000` |
//! | `VAULT_CLIENT__ORCHESTRATOR__GAS_BUFFER_PERCENT` | Gas estimate buffer | `20` |
//! | `VAULT_CLIENT__ORCHESTRATOR__REFRESH_INTERVAL_SECS` | Periodic refresh | (off) |
//! | `VAULT_CLIENT__LOG__LEVEL` | Log level | `info` |
//! | `VAULT_CLIENT__LOG__FORMAT` | Log format (json/pretty) | `json` |
//!
//! # Examples
//!
//! ```ignore
//! use vault_client::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! config.validate()?;
//! println!("rpc: {}", config.chain.rpc_url);
//! ```

use crate::application::services::receipt_waiter::WaiterConfig;
use crate::domain::value_objects::address::ContractAddress;
use crate::domain::value_objects::contracts::{ContractSet, StrategyKind};
use crate::infrastructure::blockchain::gas::GasEstimator;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV: &str = "VAULT_CLIENT_CONFIG_FILE";

/// Configuration file read when [`CONFIG_FILE_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "vault-client.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "VAULT_CLIENT";

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse a configuration source.
    #[error("failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid value error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Chain Configuration
// ============================================================================

/// Chain connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint.
    #[serde(default)]
    pub rpc_url: String,

    /// Chain id the node must report.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Hex private key of the signing account.
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            chain_id: default_chain_id(),
            private_key: None,
        }
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

// ============================================================================
// Contracts Configuration
// ============================================================================

/// Deployed contract addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Token contract.
    #[serde(default)]
    pub token: String,

    /// Vault contract.
    #[serde(default)]
    pub vault: String,

    /// Lending strategy contract.
    #[serde(default)]
    pub lending: String,

    /// Staking strategy contract.
    #[serde(default)]
    pub staking: String,

    /// Liquidity strategy contract.
    #[serde(default)]
    pub liquidity: String,
}

impl ContractsConfig {
    fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("contracts.token", &self.token),
            ("contracts.vault", &self.vault),
            ("contracts.lending", &self.lending),
            ("contracts.staking", &self.staking),
            ("contracts.liquidity", &self.liquidity),
        ]
    }

    /// Builds the contract set.
    ///
    /// # Errors
    ///
    /// Returns an error if any address is empty.
    pub fn contract_set(&self) -> Result<ContractSet, ConfigError> {
        let address = |field: &str, raw: &str| {
            ContractAddress::new(raw).map_err(|_| ConfigError::invalid_value(field, "address is empty"))
        };

        Ok(ContractSet::new(
            address("contracts.token", &self.token)?,
            address("contracts.vault", &self.vault)?,
        )
        .with_strategy(StrategyKind::Lending, address("contracts.lending", &self.lending)?)
        .with_strategy(StrategyKind::Staking, address("contracts.staking", &self.staking)?)
        .with_strategy(
            StrategyKind::Liquidity,
            address("contracts.liquidity", &self.liquidity)?,
        ))
    }
}

// ============================================================================
// Orchestrator Configuration
// ============================================================================

/// Sequencer and synchronizer tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Receipt deadline for state-changing calls in milliseconds.
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,

    /// Delay between receipt polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Percentage added to gas estimates.
    #[serde(default = "default_gas_buffer_percent")]
    pub gas_buffer_percent: u64,

    /// Periodic snapshot refresh in seconds; off when unset.
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            receipt_timeout_ms: default_receipt_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            gas_buffer_percent: default_gas_buffer_percent(),
            refresh_interval_secs: None,
        }
    }
}

impl OrchestratorConfig {
    /// Returns the receipt waiter configuration.
    #[must_use]
    pub fn waiter_config(&self) -> WaiterConfig {
        WaiterConfig::default()
            .with_timeout(Duration::from_millis(self.receipt_timeout_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
    }

    /// Returns the gas estimator.
    #[must_use]
    pub fn gas_estimator(&self) -> GasEstimator {
        GasEstimator::new(self.gas_buffer_percent)
    }

    /// Returns the periodic refresh interval, if enabled.
    #[must_use]
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (structured logging).
    #[default]
    Json,
    /// Pretty format (human-readable).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include target (module path) in logs.
    #[serde(default = "default_true")]
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Json,
            include_target: true,
        }
    }
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Chain connection.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Contract addresses.
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Orchestrator tuning.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Loads configuration from the config file, `.env` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();

        let path =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path, env_source())
    }

    /// Loads configuration from an optional file and an environment source.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or parsed.
    pub fn load_from(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let loaded = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        Ok(loaded)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.rpc_url.trim().is_empty() {
            return Err(ConfigError::invalid_value("chain.rpc_url", "must not be empty"));
        }

        for (field, value) in self.contracts.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::invalid_value(field, "address is empty"));
            }
        }

        if self.orchestrator.receipt_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "orchestrator.receipt_timeout_ms",
                "must be positive",
            ));
        }
        if self.orchestrator.poll_interval_ms == 0 {
            return Err(ConfigError::invalid_value(
                "orchestrator.poll_interval_ms",
                "must be positive",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "log.level",
                format!(
                    "invalid log level '{}', must be one of: {:?}",
                    self.log.level, valid_levels
                ),
            ));
        }

        Ok(())
    }
}

/// Environment source for `VAULT_CLIENT__SECTION__KEY` variables.
#[must_use]
pub fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_chain_id() -> u64 {
    11_155_111
}

fn default_receipt_timeout_ms() -> u64 {
    60_000
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_gas_buffer_percent() -> u64 {
    GasEstimator::DEFAULT_BUFFER_PERCENT
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
