//! Environment Credentials
//!
//! Loads the three required secrets from the process environment.
//! Every missing key is reported at once, in declaration order.

use std::collections::HashMap;
use std::fmt;

use super::ConfigError;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const BLOCKCHAIN_RPC_URL: &str = "BLOCKCHAIN_RPC_URL";
pub const WALLET_PRIVATE_KEY: &str = "WALLET_PRIVATE_KEY";

/// Variables that must be present and non-empty at startup
pub const REQUIRED_VARS: [&str; 3] = [OPENAI_API_KEY, BLOCKCHAIN_RPC_URL, WALLET_PRIVATE_KEY];

/// Credentials held in memory for the lifetime of the process
#[derive(Clone)]
pub struct Credentials {
    /// Third-party (agent LLM) API key
    pub api_key: String,
    /// Solana RPC endpoint
    pub rpc_url: String,
    /// Wallet secret key, base58 or JSON byte array
    pub wallet_secret: String,
}

impl Credentials {
    /// Build credentials from an arbitrary key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values: HashMap<&str, String> = HashMap::new();
        let mut missing = Vec::new();

        for var in REQUIRED_VARS {
            match lookup(var).filter(|value| !value.is_empty()) {
                Some(value) => {
                    values.insert(var, value);
                }
                None => missing.push(var.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        let mut take = |key: &str| values.remove(key).unwrap_or_default();
        Ok(Self {
            api_key: take(OPENAI_API_KEY),
            rpc_url: take(BLOCKCHAIN_RPC_URL),
            wallet_secret: take(WALLET_PRIVATE_KEY),
        })
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seed the environment from `.env` (if present), then read credentials
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_env()
    }

    /// Credentials as a variable-name to value mapping
    pub fn as_map(&self) -> HashMap<&'static str, &str> {
        HashMap::from([
            (OPENAI_API_KEY, self.api_key.as_str()),
            (BLOCKCHAIN_RPC_URL, self.rpc_url.as_str()),
            (WALLET_PRIVATE_KEY, self.wallet_secret.as_str()),
        ])
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("rpc_url", &self.rpc_url)
            .field("wallet_secret", &"<redacted>")
            .finish()
    }
}
