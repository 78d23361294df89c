//! Ledger Port
//!
//! Read and submit primitives against the Solana ledger. Implemented by
//! `adapters::solana::SolanaClient`; mocked in `ports::mocks`.

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use thiserror::Error;

use crate::domain::to_ui_amount;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Transaction {signature} failed on-chain: {reason}")]
    TransactionFailed { signature: String, reason: String },
    #[error("Timeout waiting for confirmation after {waited_secs}s")]
    ConfirmationTimeout { waited_secs: u64 },
    #[error("Blockhash expired: chain passed block height {last_valid_block_height}")]
    BlockhashExpired { last_valid_block_height: u64 },
}

/// Balance of an SPL token account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount {
    /// Raw amount in base units
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn ui_amount(&self) -> f64 {
        to_ui_amount(self.amount, self.decimals)
    }
}

/// A validator vote account eligible for delegation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteAccount {
    pub vote_pubkey: Pubkey,
    pub activated_stake: u64,
}

#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Raw account data, `None` if the account does not exist
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Native SOL balance in lamports
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError>;

    /// Token account balance, `None` if the token account does not exist
    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAmount>, LedgerError>;

    /// Latest blockhash and the last block height at which it is accepted
    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), LedgerError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError>;

    /// Currently active (non-delinquent) vote accounts
    async fn get_vote_accounts(&self) -> Result<Vec<VoteAccount>, LedgerError>;

    /// Submit a signed transaction once
    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError>;

    /// Wait until the transaction is confirmed or fails. Gives up on timeout,
    /// or once the chain is past `last_valid_block_height` and the
    /// transaction can no longer land.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_amount_ui() {
        let amount = TokenAmount { amount: 2_500_000, decimals: 6 };
        assert_eq!(amount.ui_amount(), 2.5);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::RpcError("test".to_string());
        assert!(err.to_string().contains("RPC request failed"));

        let err = LedgerError::ConfirmationTimeout { waited_secs: 60 };
        assert!(err.to_string().contains("Timeout"));

        let err = LedgerError::BlockhashExpired { last_valid_block_height: 1_000 };
        assert!(err.to_string().contains("1000"));
    }
}
