//! Payment verifier daemon: serves the HTTP API or runs one-off commands
//! against the consumption registry.

mod config;
mod shutdown;

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use payproof_rpc::{AppState, RpcServer};
use payproof_store::ConsumptionStore;
use payproof_store_lmdb::LmdbEnvironment;
use payproof_types::{AccountId, Lamports, TxReference};
use payproof_utils::{init_logging, LogFormat};
use payproof_verification::VerificationEngine;

use crate::config::ServiceConfig;
use crate::shutdown::ShutdownController;

#[derive(Parser)]
#[command(name = "payproof", about = "Ledger payment verification service")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, global = true, env = "PAYPROOF_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the consumption registry.
    #[arg(long, global = true, env = "PAYPROOF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Ledger JSON-RPC endpoint (overrides the cluster default).
    #[arg(long, global = true, env = "PAYPROOF_RPC_URL")]
    rpc_url: Option<String>,

    /// Cluster: "mainnet", "devnet", "testnet" or "localnet".
    #[arg(long, global = true, env = "PAYPROOF_CLUSTER")]
    cluster: Option<String>,

    /// Account that payments must reach.
    #[arg(long, global = true, env = "PAYPROOF_RECIPIENT")]
    recipient: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "PAYPROOF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "PAYPROOF_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted.
    Serve {
        /// Listen port.
        #[arg(long, env = "PAYPROOF_PORT")]
        port: Option<u16>,
    },
    /// Verify one payment and print the outcome as JSON.
    Verify {
        reference: String,
        /// Expected amount in SOL.
        amount: f64,
        /// Account expected to have sent the payment.
        #[arg(long)]
        sender: Option<String>,
    },
    /// Report whether a reference has been consumed.
    Check { reference: String },
    /// List every consumed reference, oldest first.
    List,
}

impl Cli {
    /// Merge file configuration (or defaults) with CLI and env overrides.
    fn resolve_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ServiceConfig::default(),
        };
        if let Some(cluster) = &self.cluster {
            config.cluster = cluster.parse()?;
        }
        if let Some(url) = &self.rpc_url {
            config.rpc_url = Some(url.clone());
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(recipient) = &self.recipient {
            config.recipient = recipient.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
        }
        if let Command::Serve { port: Some(port) } = &self.command {
            config.listen_port = *port;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_format, &config.log_level).map_err(anyhow::Error::msg)?;

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())
        .with_context(|| format!("opening registry in {}", config.data_dir.display()))?;
    let store: Arc<dyn ConsumptionStore> = Arc::new(env.consumption_store());

    match cli.command {
        Command::Serve { .. } => {
            serve(&config, store).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            reference,
            amount,
            sender,
        } => {
            let engine = build_engine(&config, store)?;
            let Some(expected) = Lamports::from_sol(amount) else {
                anyhow::bail!("expected amount must be a positive number of SOL");
            };
            let sender = sender.map(AccountId::new);
            let result = engine.verify(&reference, expected, sender.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.is_verified() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check { reference } => {
            let reference = TxReference::parse(&reference)?;
            let consumed_at = store.consumed_at(&reference)?;
            let report = serde_json::json!({
                "reference": reference.as_str(),
                "isUsed": consumed_at.is_some(),
                "consumedAt": consumed_at.map(|t| t.to_rfc3339()),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::List => {
            for entry in store.list_consumed()? {
                println!("{}\t{}", entry.consumed_at.to_rfc3339(), entry.reference);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_engine(
    config: &ServiceConfig,
    store: Arc<dyn ConsumptionStore>,
) -> anyhow::Result<VerificationEngine> {
    let ledger = config.ledger_client()?;
    let engine = VerificationEngine::new(Arc::new(ledger), store, config.verifier_config()?)?;
    Ok(engine)
}

async fn serve(config: &ServiceConfig, store: Arc<dyn ConsumptionStore>) -> anyhow::Result<()> {
    let ledger = config.ledger_client()?;
    if let Err(e) = ledger.health().await {
        warn!(endpoint = ledger.endpoint(), "ledger health check failed: {e}");
    }
    let engine = VerificationEngine::new(Arc::new(ledger), store, config.verifier_config()?)?;

    info!(
        "Starting payment verifier on {} (recipient {}, API port {})",
        config.cluster.as_str(),
        config.recipient,
        config.listen_port,
    );

    let shutdown = ShutdownController::new();
    let server = RpcServer::new(
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.listen_port)),
        Arc::new(AppState::new(Arc::new(engine))),
    );
    let api_shutdown = shutdown.subscribe();
    let mut api = tokio::spawn(async move { server.start(api_shutdown).await });

    tokio::select! {
        finished = &mut api => {
            // The server only stops on its own when it failed to start.
            finished??;
            return Ok(());
        }
        _ = shutdown.wait_for_signal() => {}
    }
    api.await??;
    info!("payment verifier exited cleanly");
    Ok(())
}
