//! Aurora - Solana agent operations library
//!
//! Lets an agent read oracle prices and token balances and submit trade,
//! stake and lend transactions on Solana.
//!
//! # Modules
//!
//! - `domain`: Static tables and pure data handling (mints, feeds, amounts)
//! - `ports`: Trait abstractions (LedgerPort, PriceOraclePort, SwapRouterPort)
//! - `adapters`: External implementations (Solana RPC, Pyth, Jupiter, CLI)
//! - `config`: Credentials and settings loading
//! - `application`: The `AuroraEngine` façade

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
