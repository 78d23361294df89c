//! Configuration Module
//!
//! Secrets (wallet key, RPC URL, API key) come from the environment and an
//! optional `.env` file. Non-secret tunables come from an optional TOML file.

pub mod env;
pub mod settings;

use thiserror::Error;

pub use env::{Credentials, REQUIRED_VARS};
pub use settings::{load_settings, load_settings_or_default, Settings};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Names of the missing variables, if this is a missing-variable error
    pub fn missing_vars(&self) -> &[String] {
        match self {
            ConfigError::MissingEnvVars(vars) => vars,
            _ => &[],
        }
    }
}
