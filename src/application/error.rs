//! Engine errors
//!
//! Every failure of a façade operation maps to one `EngineError`. Callers
//! that only need a coarse category use `kind()`.

use std::fmt;
use thiserror::Error;

use crate::adapters::solana::wallet::WalletError;
use crate::config::ConfigError;
use crate::domain::AmountError;
use crate::ports::{ExecutionError, LedgerError, OracleError};

/// Coarse failure category of an engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Lookup,
    InvalidInput,
    Unsupported,
    Transport,
    Signing,
    /// The transaction was sent but not confirmed
    Unconfirmed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Lookup => "lookup",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Transport => "transport",
            ErrorKind::Signing => "signing",
            ErrorKind::Unconfirmed => "unconfirmed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Unknown price symbol: {0}")]
    UnknownSymbol(String),
    #[error("No lending pool for token {0}")]
    UnknownLendingToken(String),
    #[error("No validator vote account available for delegation")]
    NoValidator,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("Routing error: {0}")]
    Routing(#[from] ExecutionError),
    #[error("Ledger error: {0}")]
    Ledger(LedgerError),
    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),
    #[error("Transaction {signature} sent but not confirmed: {reason}")]
    Unconfirmed { signature: String, reason: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Config(_) => ErrorKind::Configuration,
            EngineError::UnknownSymbol(_)
            | EngineError::UnknownLendingToken(_)
            | EngineError::NoValidator => ErrorKind::Lookup,
            EngineError::InvalidInput(_) | EngineError::Amount(_) => ErrorKind::InvalidInput,
            EngineError::Unsupported(_) => ErrorKind::Unsupported,
            EngineError::Wallet(WalletError::SigningError(_)) => ErrorKind::Signing,
            EngineError::Wallet(_) => ErrorKind::Configuration,
            EngineError::Oracle(_) | EngineError::Routing(_) | EngineError::Ledger(_) => {
                ErrorKind::Transport
            }
            EngineError::Unconfirmed { .. } => ErrorKind::Unconfirmed,
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TransactionFailed { signature, reason } => {
                EngineError::Unconfirmed { signature, reason }
            }
            other => EngineError::Ledger(other),
        }
    }
}
