use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::{Transaction, VersionedTransaction},
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to decode secret key: {0}")]
    DecodeError(String),
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
}

/// Wallet manager holding the agent's keypair
#[derive(Clone)]
pub struct WalletManager {
    keypair: Arc<Keypair>,
}

impl WalletManager {
    /// Load keypair from a secret string.
    ///
    /// Accepts a base58 encoded 64-byte secret (wallet export format) or a
    /// JSON array of bytes (solana-keygen file format).
    pub fn from_secret(secret: &str) -> Result<Self, WalletError> {
        let secret = secret.trim();

        let bytes: Vec<u8> = if secret.starts_with('[') {
            serde_json::from_str(secret)
                .map_err(|e| WalletError::DecodeError(format!("Invalid JSON format: {}", e)))?
        } else {
            bs58::decode(secret)
                .into_vec()
                .map_err(|e| WalletError::DecodeError(format!("Invalid base58: {}", e)))?
        };

        Self::from_bytes(&bytes)
    }

    /// Load keypair from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::from_bytes(bytes)
            .map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self {
            keypair: Arc::new(keypair),
        })
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Arc::new(Keypair::new()),
        }
    }

    /// Get the public key as a string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Keypair reference, for transactions that need extra co-signers
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Sign a transaction received from an external builder
    pub fn sign_versioned(
        &self,
        transaction: VersionedTransaction,
    ) -> Result<VersionedTransaction, WalletError> {
        VersionedTransaction::try_new(transaction.message, &[self.keypair()])
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }

    /// Sign a legacy transaction with the wallet plus `co_signers`
    pub fn sign_with(
        &self,
        transaction: &mut Transaction,
        co_signers: &[&Keypair],
    ) -> Result<(), WalletError> {
        let mut signers: Vec<&Keypair> = Vec::with_capacity(co_signers.len() + 1);
        signers.push(self.keypair());
        signers.extend_from_slice(co_signers);

        transaction
            .try_sign(&signers, transaction.message.recent_blockhash)
            .map_err(|e| WalletError::SigningError(e.to_string()))
    }

    /// Export keypair as base58 (use with caution)
    pub fn to_base58(&self) -> String {
        self.keypair.to_base58_string()
    }
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.public_key())
            .finish()
    }
}
