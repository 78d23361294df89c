//! Price Oracle Port

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::domain::PriceFeed;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Transport(String),
    #[error("Malformed price data: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PriceOraclePort: Send + Sync {
    /// Read one price feed account. `None` when the oracle has no data.
    async fn get_price_feed(&self, feed: &Pubkey) -> Result<Option<PriceFeed>, OracleError>;
}
