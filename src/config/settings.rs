//! Settings Loader
//!
//! Optional TOML file for non-secret tunables. Every section and field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Upper bound on routing API attempts per request
pub const MAX_RETRIES: u32 = 10;

/// Main settings structure matching aurora.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub jupiter: JupiterSection,
    pub solana: SolanaSection,
    pub stake: StakeSection,
}

/// Jupiter routing API section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    /// Jupiter swap API base URL
    pub api_url: String,
    /// Optional API key for higher rate limits (get from jup.ag)
    pub api_key: Option<String>,
    /// Fixed slippage tolerance in basis points (0.5% = 50 bps)
    pub slippage_bps: u16,
    /// HTTP request timeout
    pub timeout_secs: u64,
    /// HTTP attempts for quote/swap-build requests
    pub max_retries: u32,
    /// Optional prioritization fee for swap transactions
    pub priority_fee_lamports: Option<u64>,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            slippage_bps: 50,
            timeout_secs: 30,
            max_retries: 3,
            priority_fee_lamports: None,
        }
    }
}

impl JupiterSection {
    /// Get API key with environment variable fallback
    /// Checks JUPITER_API_KEY env var if config value is empty/None
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("JUPITER_API_KEY").ok().filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Solana RPC section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    /// Commitment level: "processed", "confirmed", "finalized"
    pub commitment: String,
    /// How long to wait for a submitted transaction to confirm
    pub confirm_timeout_secs: u64,
    /// Delay between signature status polls
    pub poll_interval_ms: u64,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            commitment: "confirmed".to_string(),
            confirm_timeout_secs: 60,
            poll_interval_ms: 500,
        }
    }
}

impl SolanaSection {
    pub fn commitment_config(&self) -> Result<CommitmentConfig, ConfigError> {
        match self.commitment.as_str() {
            "processed" => Ok(CommitmentConfig::processed()),
            "confirmed" => Ok(CommitmentConfig::confirmed()),
            "finalized" => Ok(CommitmentConfig::finalized()),
            other => Err(ConfigError::ValidationError(format!(
                "commitment must be processed, confirmed or finalized, got {}",
                other
            ))),
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Staking section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StakeSection {
    /// Validator vote account to delegate to. When unset, the current vote
    /// account with the largest activated stake is used.
    pub vote_account: Option<String>,
}

impl StakeSection {
    /// Get vote account with environment variable fallback
    /// Checks STAKE_VOTE_ACCOUNT env var if config value is empty/None
    pub fn get_vote_account(&self) -> Result<Option<Pubkey>, ConfigError> {
        let raw = match self.vote_account.as_deref() {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => std::env::var("STAKE_VOTE_ACCOUNT").ok().filter(|v| !v.is_empty()),
        };

        raw.map(|v| {
            Pubkey::from_str(&v).map_err(|e| {
                ConfigError::ValidationError(format!("vote_account '{}' is invalid: {}", v, e))
            })
        })
        .transpose()
    }
}

/// Load settings from a TOML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let expanded = shellexpand::tilde(&path.as_ref().to_string_lossy()).to_string();
    let content = std::fs::read_to_string(&expanded)?;
    let settings: Settings = toml::from_str(&content)?;
    settings.validate()?;
    tracing::debug!("Loaded settings from {}", expanded);
    Ok(settings)
}

/// Load settings from `path` if given, otherwise use defaults
pub fn load_settings_or_default(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => load_settings(path),
        None => Ok(Settings::default()),
    }
}

impl Settings {
    /// Validate all settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jupiter.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if self.jupiter.slippage_bps > 10_000 {
            return Err(ConfigError::ValidationError(format!(
                "slippage_bps must be 0-10000, got {}",
                self.jupiter.slippage_bps
            )));
        }

        if self.jupiter.max_retries == 0 || self.jupiter.max_retries > MAX_RETRIES {
            return Err(ConfigError::ValidationError(format!(
                "max_retries must be 1-{}, got {}",
                MAX_RETRIES, self.jupiter.max_retries
            )));
        }

        self.solana.commitment_config()?;

        if self.solana.confirm_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "confirm_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.solana.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }

        if let Some(ref vote) = self.stake.vote_account {
            if !vote.is_empty() {
                Pubkey::from_str(vote).map_err(|e| {
                    ConfigError::ValidationError(format!("vote_account '{}' is invalid: {}", vote, e))
                })?;
            }
        }

        Ok(())
    }
}
