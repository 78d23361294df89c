//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The Solana ledger (account reads, submission, confirmation)
//! - The price oracle (Pyth feeds)
//! - The swap routing service (Jupiter quote and swap endpoints)

pub mod ledger;
pub mod oracle;
pub mod router;
pub mod models;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use ledger::{LedgerError, LedgerPort, TokenAmount, VoteAccount};
pub use oracle::{OracleError, PriceOraclePort};
pub use router::{ExecutionError, SwapRouterPort};
pub use models::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo, SwapRequest, SwapResponse};
