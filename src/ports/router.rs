//! Swap Router Port
//!
//! Quote and transaction-building calls of the routing service.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("API request failed: {0}")]
    ApiError(String),
    #[error("No route found from {input_mint} to {output_mint}")]
    NoRoute {
        input_mint: String,
        output_mint: String,
    },
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Invalid swap transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

#[async_trait]
pub trait SwapRouterPort: Send + Sync {
    /// Request a swap quote (HTTP GET)
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError>;

    /// Request a signable transaction for a quote (HTTP POST)
    async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError>;
}
