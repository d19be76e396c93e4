//! # vault-cli
//!
//! Command-line front end for the vault client.
//!
//! Subcommands:
//! - `vault-cli status`    Print the account's balances and pool metrics
//! - `vault-cli watch`     Reprint them on every periodic refresh
//! - `vault-cli claim`     Claim the airdrop
//! - `vault-cli deposit`   Deposit tokens into the vault
//! - `vault-cli withdraw`  Withdraw tokens from the vault
//! - `vault-cli redeem`    Redeem vault shares
//! - `vault-cli rebalance` Rebalance the vault across strategies
//! - `vault-cli mint`      Mint test tokens

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::StreamExt;
use tracing::info;
use vault_client::application::{
    OperationSequencer, ReceiptWaiter, Session, SessionManager, StateSynchronizer,
};
use vault_client::config::{AppConfig, env_source};
use vault_client::domain::entities::balance_snapshot::BalanceSnapshot;
use vault_client::domain::value_objects::address::AccountAddress;
use vault_client::domain::value_objects::arithmetic::parse_amount;
use vault_client::domain::value_objects::status::OperationStatus;
use vault_client::infrastructure::blockchain::{
    ChainReader, ChainWriter, EthereumClient, LocalWalletProvider, ReceiptSource, WalletEvent,
};
use vault_client::logging::init_tracing;

/// Yield vault client: airdrop claims, deposits, withdrawals and pool metrics.
#[derive(Parser)]
#[command(name = "vault-cli", version, about)]
struct Cli {
    /// Path to the configuration file (default: vault-client.toml).
    #[arg(long, short, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print balances and pool metrics.
    Status {
        /// Account to inspect (default: the configured signer).
        #[arg(long)]
        account: Option<String>,
    },

    /// Reprint balances and pool metrics on every periodic refresh.
    Watch {
        /// Account to inspect (default: the configured signer).
        #[arg(long)]
        account: Option<String>,
    },

    /// Claim the airdrop.
    Claim,

    /// Deposit tokens into the vault.
    Deposit {
        /// Human-readable amount (e.g. "12.5").
        amount: String,
    },

    /// Withdraw tokens from the vault.
    Withdraw {
        /// Human-readable amount (e.g. "12.5").
        amount: String,
    },

    /// Redeem vault shares.
    Redeem {
        /// Human-readable share amount.
        shares: String,
    },

    /// Rebalance the vault across its strategies.
    Rebalance,

    /// Mint test tokens.
    Mint {
        /// Human-readable amount.
        amount: String,

        /// Recipient address (default: the signer).
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path, env_source()),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;
    config.validate()?;
    init_tracing(&config.log);

    info!("Starting vault-cli v{}", env!("CARGO_PKG_VERSION"));

    let wallet = config
        .chain
        .private_key
        .as_deref()
        .map(LocalWalletProvider::from_private_key)
        .transpose()?;

    let mut client = EthereumClient::new(config.chain.chain_id, &config.chain.rpc_url)?
        .with_gas_estimator(config.orchestrator.gas_estimator());
    if let Some(wallet) = &wallet {
        client = client.with_wallet(wallet.wallet().clone());
    }
    client
        .health_check()
        .await
        .context("node health check failed")?;
    let client = Arc::new(client);

    let reader: Arc<dyn ChainReader> = Arc::clone(&client) as Arc<dyn ChainReader>;
    let writer: Arc<dyn ChainWriter> = Arc::clone(&client) as Arc<dyn ChainWriter>;
    let receipts: Arc<dyn ReceiptSource> = Arc::clone(&client) as Arc<dyn ReceiptSource>;

    let synchronizer = Arc::new(StateSynchronizer::new(
        Arc::clone(&reader),
        config.contracts.contract_set()?,
    ));
    let sequencer = Arc::new(OperationSequencer::new(
        reader,
        writer,
        ReceiptWaiter::new(receipts, config.orchestrator.waiter_config()),
        synchronizer,
    ));

    let refresh_interval = config.orchestrator.refresh_interval();
    match &cli.command {
        Commands::Status { account: Some(account) } => {
            let session = Session::connect(AccountAddress::new(account)?, sequencer, None).await;
            print_snapshot(session.snapshot().as_deref());
            return Ok(());
        }
        Commands::Watch { account: Some(account) } => {
            let Some(every) = refresh_interval else {
                bail!("watch needs VAULT_CLIENT__ORCHESTRATOR__REFRESH_INTERVAL_SECS");
            };
            let session =
                Session::connect(AccountAddress::new(account)?, sequencer, Some(every)).await;
            return watch(&session, every).await;
        }
        _ => {}
    }

    let Some(wallet) = wallet else {
        bail!("no signer configured: set VAULT_CLIENT__CHAIN__PRIVATE_KEY");
    };
    let manager = SessionManager::new(Arc::clone(&sequencer), refresh_interval);
    let session = manager
        .handle(WalletEvent::Connected(wallet.connect()?))
        .await
        .context("wallet did not connect")?;

    let progress = sequencer.status_stream();
    let printer = tokio::spawn(async move {
        tokio::pin!(progress);
        while let Some(update) = progress.next().await {
            if update.status.is_in_flight() {
                eprintln!("{}: {}", update.kind, update.status);
            }
        }
    });

    let status = match cli.command {
        Commands::Status { .. } => {
            print_snapshot(session.snapshot().as_deref());
            None
        }
        Commands::Watch { .. } => {
            let Some(every) = refresh_interval else {
                bail!("watch needs VAULT_CLIENT__ORCHESTRATOR__REFRESH_INTERVAL_SECS");
            };
            watch(&session, every).await?;
            None
        }
        Commands::Claim => Some(session.claim().await),
        Commands::Deposit { amount } => Some(session.deposit(parse_amount(&amount)?).await),
        Commands::Withdraw { amount } => Some(session.withdraw(parse_amount(&amount)?).await),
        Commands::Redeem { shares } => Some(session.redeem(parse_amount(&shares)?).await),
        Commands::Rebalance => Some(session.rebalance().await),
        Commands::Mint { amount, to } => {
            let recipient = to.unwrap_or_else(|| session.account().to_string());
            Some(session.mint_test(recipient, parse_amount(&amount)?).await)
        }
    };
    printer.abort();
    manager.handle(WalletEvent::Disconnected).await;

    match status {
        Some(OperationStatus::Failed { reason }) => bail!(reason.user_message()),
        Some(status) => {
            println!("{status}");
            Ok(())
        }
        None => Ok(()),
    }
}

/// Prints the snapshot after every refresh period until interrupted.
async fn watch(session: &Session, every: Duration) -> anyhow::Result<()> {
    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => print_snapshot(session.snapshot().as_deref()),
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("watch stopped");
                return Ok(());
            }
        }
    }
}

fn print_snapshot(snapshot: Option<&BalanceSnapshot>) {
    let Some(snapshot) = snapshot else {
        println!("No data: chain reads failed, see logs.");
        return;
    };

    println!("account:            {}", snapshot.account());
    println!("fetched at:         {}", snapshot.fetched_at());
    println!("token balance:      {}", snapshot.token_balance());
    println!("airdrop claimed:    {}", snapshot.claimed());
    println!("vault shares:       {}", snapshot.vault_shares());
    println!("your assets:        {}", snapshot.account_assets());
    println!("vault total assets: {}", snapshot.vault_total_assets());
    for strategy in snapshot.strategies() {
        println!(
            "  {:<10} assets {} apy {}%",
            strategy.kind, strategy.total_assets, strategy.apy_percent
        );
    }
    println!("weighted APY:       {}%", snapshot.weighted_apy_percent());
    println!("est. annual return: {}", snapshot.estimated_annual_return());
}
