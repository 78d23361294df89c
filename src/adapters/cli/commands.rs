//! CLI Command Handlers
//!
//! Argument definitions and handlers for the `aurora` binary. Every handler
//! loads credentials and settings, builds the engine, and runs one engine
//! operation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::AuroraEngine;
use crate::config::{load_settings_or_default, Credentials};
use crate::domain::resolve_mint;

/// Aurora - Solana agent operations (prices, balances, trade, stake, lend)
#[derive(Parser, Debug)]
#[command(
    name = "aurora",
    version = env!("CARGO_PKG_VERSION"),
    about = "Solana agent operations: prices, balances, trade, stake, lend",
    long_about = "Aurora reads Pyth prices and token balances and submits Jupiter swaps, \
                  native stake delegations and lending deposits from the configured wallet. \
                  Secrets come from the environment or a .env file."
)]
pub struct CliApp {
    /// The command to execute (defaults to `ready`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to an optional settings file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Load configuration and check the engine can be constructed
    Ready,

    /// Show the wallet address and SOL balance
    Wallet,

    /// Fetch an oracle price (SOL/USD, USDC/USD, BTC/USD)
    Price(PriceCmd),

    /// Show the wallet's balance of a token
    Balance(BalanceCmd),

    /// Swap tokens through Jupiter
    Trade(TradeCmd),

    /// Create and delegate a stake account
    Stake(StakeCmd),

    /// Deposit tokens into a lending pool
    Lend(LendCmd),
}

#[derive(Parser, Debug, PartialEq)]
pub struct PriceCmd {
    /// Pair symbol (e.g., SOL/USD)
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,
}

#[derive(Parser, Debug, PartialEq)]
pub struct BalanceCmd {
    /// Token symbol (SOL, USDC) or mint address
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

#[derive(Parser, Debug, PartialEq)]
pub struct TradeCmd {
    /// Input token symbol or mint
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Output token symbol or mint
    #[arg(value_name = "TO")]
    pub to: String,

    /// Amount of the input token
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,
}

#[derive(Parser, Debug, PartialEq)]
pub struct StakeCmd {
    /// Amount of SOL to stake
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,

    /// Lockup duration in days (only 0 is supported)
    #[arg(long, value_name = "DAYS", default_value = "0")]
    pub duration_days: u32,
}

#[derive(Parser, Debug, PartialEq)]
pub struct LendCmd {
    /// Token symbol or mint
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Amount to deposit
    #[arg(value_name = "AMOUNT")]
    pub amount: f64,

    /// Lock duration in days (only 0 is supported)
    #[arg(long, value_name = "DAYS", default_value = "0")]
    pub duration_days: u32,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let engine = build_engine(&app)?;

    match app.command.unwrap_or(Command::Ready) {
        Command::Ready => {
            println!("Agent Aurora ready for operation");
            Ok(())
        }
        Command::Wallet => wallet_command(&engine).await,
        Command::Price(cmd) => price_command(&engine, cmd).await,
        Command::Balance(cmd) => balance_command(&engine, cmd).await,
        Command::Trade(cmd) => trade_command(&engine, cmd).await,
        Command::Stake(cmd) => stake_command(&engine, cmd).await,
        Command::Lend(cmd) => lend_command(&engine, cmd).await,
    }
}

fn build_engine(app: &CliApp) -> Result<AuroraEngine> {
    let credentials = Credentials::load().context("Failed to load credentials")?;
    let settings = load_settings_or_default(app.config.as_deref())
        .context("Failed to load settings")?;

    AuroraEngine::connect(&credentials, &settings).context("Failed to initialize engine")
}

async fn wallet_command(engine: &AuroraEngine) -> Result<()> {
    let sol = engine
        .try_native_balance()
        .await
        .context("Failed to read SOL balance")?;

    println!("Wallet: {}", engine.wallet_pubkey());
    println!("  SOL: {:.9}", sol);
    Ok(())
}

async fn price_command(engine: &AuroraEngine, cmd: PriceCmd) -> Result<()> {
    match engine.fetch_price(&cmd.symbol).await? {
        Some(price) => println!("{}: {:.6}", cmd.symbol, price),
        None => println!("{}: no price available", cmd.symbol),
    }
    Ok(())
}

async fn balance_command(engine: &AuroraEngine, cmd: BalanceCmd) -> Result<()> {
    let mint = resolve_mint(&cmd.token);
    let balance = engine
        .try_token_balance(&mint)
        .await
        .with_context(|| format!("Failed to read balance of {}", cmd.token))?;

    match balance {
        Some(amount) => println!("{}: {}", cmd.token, amount),
        None => println!("{}: 0 (no token account)", cmd.token),
    }
    Ok(())
}

async fn trade_command(engine: &AuroraEngine, cmd: TradeCmd) -> Result<()> {
    let from = resolve_mint(&cmd.from);
    let to = resolve_mint(&cmd.to);

    let signature = engine
        .try_trade(&from, &to, cmd.amount)
        .await
        .with_context(|| format!("Trade {} {} -> {} failed", cmd.amount, cmd.from, cmd.to))?;

    println!("Trade confirmed: {}", signature);
    Ok(())
}

async fn stake_command(engine: &AuroraEngine, cmd: StakeCmd) -> Result<()> {
    let receipt = engine
        .try_stake(cmd.amount, cmd.duration_days)
        .await
        .with_context(|| format!("Stake of {} SOL failed", cmd.amount))?;

    println!("Stake confirmed: {}", receipt.signature);
    println!("  Stake account: {}", receipt.stake_account);
    println!("  Validator: {}", receipt.vote_account);
    println!("  Lamports: {}", receipt.lamports);
    println!("  Confirmed at: {}", receipt.confirmed_at.to_rfc3339());
    Ok(())
}

async fn lend_command(engine: &AuroraEngine, cmd: LendCmd) -> Result<()> {
    let mint = resolve_mint(&cmd.token);

    let signature = engine
        .try_lend(&mint, cmd.amount, cmd.duration_days)
        .await
        .with_context(|| format!("Lend of {} {} failed", cmd.amount, cmd.token))?;

    println!("Lend confirmed: {}", signature);
    Ok(())
}
