//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: swap routing API client
//! - Solana: RPC client and wallet management
//! - Pyth: oracle price accounts read over RPC
//! - CLI: Command-line interface handlers

pub mod jupiter;
pub mod solana;
pub mod pyth;
pub mod cli;

pub use jupiter::JupiterClient;
pub use solana::{SolanaClient, WalletManager};
pub use pyth::PythOracle;
pub use cli::CliApp;
