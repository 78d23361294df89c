//! Jupiter API Client
//!
//! HTTP client for the Jupiter swap API: quote fetching and swap
//! transaction building. Transient HTTP failures (429, 5xx, connection
//! errors) are retried here; nothing on-chain happens in this client.

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::settings::{JupiterSection, MAX_RETRIES};
use crate::ports::{
    ExecutionError, QuoteRequest, QuoteResponse, SwapRequest, SwapResponse, SwapRouterPort,
};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for Jupiter API
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per request
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl From<&JupiterSection> for JupiterConfig {
    fn from(section: &JupiterSection) -> Self {
        Self {
            api_base_url: section.api_url.trim_end_matches('/').to_string(),
            api_key: section.get_api_key(),
            timeout: section.timeout(),
            max_retries: section.max_retries.clamp(1, MAX_RETRIES),
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, ExecutionError> {
        Self::with_config(JupiterConfig::default())
    }

    /// Create a new Jupiter client with custom configuration
    pub fn with_config(config: JupiterConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get a quote for a token swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        let url = format!("{}/quote", self.config.api_base_url);

        let mut req = self.http.get(&url).query(&request.query_pairs());
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-api-key", api_key);
        }

        tracing::debug!(
            "Requesting quote {} -> {} amount={} slippage_bps={}",
            request.input_mint, request.output_mint, request.amount, request.slippage_bps
        );

        let response = self.execute_with_retry(&req).await?;
        self.handle_response(response).await
    }

    /// Build the swap transaction for a quote
    pub async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError> {
        let url = format!("{}/swap", self.config.api_base_url);

        let mut req = self.http.post(&url).json(request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-api-key", api_key);
        }

        let response = self.execute_with_retry(&req).await?;
        self.handle_response(response).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry(
        &self,
        request: &reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ExecutionError> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            let attempt_req = request
                .try_clone()
                .ok_or_else(|| ExecutionError::ApiError("Failed to clone request".into()))?;

            match attempt_req.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Handle rate limiting (429) with exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = rate_limit_backoff(attempt);
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff, attempt + 1, self.config.max_retries
                        );
                        last_error = Some(ExecutionError::ApiError("Rate limit exceeded".into()));
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(ExecutionError::ApiError(format!("Server error: {}", status)));
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(ExecutionError::ApiError(e.to_string()));
                    tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExecutionError::ApiError("Max retries exceeded".into())))
    }

    /// Handle API response and deserialize
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ExecutionError::ApiError(format!("Failed to parse response: {}", e)))
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }
}

/// Exponential 429 backoff (2s, 4s, 8s, ...) capped at one minute
fn rate_limit_backoff(attempt: u32) -> Duration {
    const MAX_BACKOFF_SECS: u64 = 60;
    Duration::from_secs(2u64.saturating_pow(attempt.saturating_add(1)).min(MAX_BACKOFF_SECS))
}

/// Map a non-success response body to an error
fn classify_error(status: StatusCode, body: &str) -> ExecutionError {
    if body.contains("SlippageToleranceExceeded") || body.contains("6001") {
        return ExecutionError::SlippageExceeded;
    }
    if body.contains("COULD_NOT_FIND_ANY_ROUTE") || body.contains("NO_ROUTES_FOUND") {
        return ExecutionError::NoRoute {
            input_mint: String::new(),
            output_mint: String::new(),
        };
    }
    ExecutionError::ApiError(format!("API error {}: {}", status, body))
}

#[async_trait]
impl SwapRouterPort for JupiterClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        JupiterClient::get_quote(self, request).await
    }

    async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError> {
        JupiterClient::get_swap_transaction(self, request).await
    }
}
