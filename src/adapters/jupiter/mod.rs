//! Jupiter Adapter
//!
//! Implementation of the SwapRouterPort for the Jupiter DEX aggregator.
//! Handles quote fetching and swap transaction building.

mod client;

pub use client::{JupiterClient, JupiterConfig};
pub use crate::ports::models::{
    QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo, SwapRequest, SwapResponse,
};
