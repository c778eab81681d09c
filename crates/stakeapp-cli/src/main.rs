//! Stakeapp - A command-line client for token staking on an EVM chain.

mod render;
mod shell;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use stakeapp_chain::{
    ChainConnection, ContractAddresses, JsonRpcProvider, StakeOperationController,
};
use stakeapp_core::config::{self, AppConfig};
use stakeapp_core::{ClientState, OperationIntent, OperationKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stakeapp - Stake, unstake and fund rewards through your wallet.
#[derive(Parser, Debug)]
#[command(name = "stakeapp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-RPC endpoint of the wallet provider (overrides the config file)
    #[arg(long = "wallet-url")]
    wallet_url: Option<String>,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log debug output from the client crates
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect and show balances
    Status,
    /// Allow the staking contract to transfer tokens
    Approve { amount: String },
    /// Deposit tokens into the staking contract
    Stake { amount: String },
    /// Withdraw staked tokens
    Unstake { amount: String },
    /// Mint demo tokens to the connected account
    Mint { amount: String },
    /// Add tokens to the reward pool
    Reward { amount: String },
    /// Show the effective configuration
    Config {
        /// Write the default configuration if no config file exists
        #[arg(long)]
        init: bool,
    },
    /// Interactive session
    Shell,
}

impl Command {
    fn intent(&self) -> Option<OperationIntent> {
        let (kind, amount) = match self {
            Command::Approve { amount } => (OperationKind::Approve, amount),
            Command::Stake { amount } => (OperationKind::Stake, amount),
            Command::Unstake { amount } => (OperationKind::Unstake, amount),
            Command::Mint { amount } => (OperationKind::Mint, amount),
            Command::Reward { amount } => (OperationKind::AddReward, amount),
            Command::Status | Command::Config { .. } | Command::Shell => return None,
        };
        Some(OperationIntent::new(kind, amount.as_str()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize error handling
    color_eyre::install()?;

    // Logs go to stderr so stdout only carries results
    let level = if args.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("stakeapp={}", level).parse()?)
        .add_directive(format!("stakeapp_chain={}", level).parse()?)
        .add_directive(format!("stakeapp_core={}", level).parse()?);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::get_config_path()?,
    };
    let mut app_config = config::load_config_from(&config_path)?;
    if let Some(url) = &args.wallet_url {
        app_config.wallet_url = Some(url.clone());
    }

    if let Command::Config { init } = args.command {
        return show_config(&app_config, &config_path, init);
    }

    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let controller = build_controller(&app_config).with_updates(update_tx);

    // Print progress as operations move through their phases
    let progress = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            eprintln!("{}", render::format_update(&update));
        }
    });

    let mut state = ClientState::new();
    let result = run_command(&controller, &mut state, &args.command).await;

    // Closing the channel lets the progress task drain and exit
    drop(controller);
    join_progress(progress).await;
    result
}

/// Wait for the progress printer; returns `false` if it panicked or was cancelled.
async fn join_progress(progress: JoinHandle<()>) -> bool {
    match progress.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Progress printer stopped abnormally: {}", e);
            false
        }
    }
}

fn build_controller(app_config: &AppConfig) -> StakeOperationController {
    let connection = match &app_config.wallet_url {
        Some(url) => {
            let provider = JsonRpcProvider::new(
                url.clone(),
                Duration::from_millis(app_config.receipt_poll_interval_ms),
            );
            tracing::info!("Using wallet provider at {}", provider.url());
            ChainConnection::new(Arc::new(provider))
        }
        None => ChainConnection::unavailable(),
    };

    StakeOperationController::new(
        connection,
        app_config.network.clone(),
        ContractAddresses {
            token: app_config.token_address,
            staking: app_config.staking_address,
        },
    )
}

async fn run_command(
    controller: &StakeOperationController,
    state: &mut ClientState,
    command: &Command,
) -> Result<()> {
    if let Command::Shell = command {
        return shell::run(controller, state).await;
    }

    controller.connect(state).await?;

    if let Some(intent) = command.intent() {
        let receipt = controller.execute(state, &intent).await?;
        println!(
            "{} confirmed in block {}",
            intent.kind,
            receipt
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
    }

    println!("{}", render::format_state(state, controller.network()));
    Ok(())
}

fn show_config(app_config: &AppConfig, path: &Path, init: bool) -> Result<()> {
    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            config::save_config_to(app_config, path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    println!("{}", serde_json::to_string_pretty(app_config)?);
    Ok(())
}
