use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::settings::SolanaSection;
use crate::config::ConfigError;
use crate::ports::{LedgerError, LedgerPort, TokenAmount, VoteAccount};

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
    confirm_timeout: Duration,
    poll_interval: Duration,
}

fn rpc_err<E: std::fmt::Display>(e: E) -> LedgerError {
    LedgerError::RpcError(e.to_string())
}

/// A blockhash stops being accepted once the chain is past its last valid height
fn blockhash_expired(block_height: u64, last_valid_block_height: u64) -> bool {
    block_height > last_valid_block_height
}

impl SolanaClient {
    /// Create a new Solana RPC client with confirmed commitment
    pub fn new(rpc_url: String) -> Self {
        Self::with_options(
            rpc_url,
            CommitmentConfig::confirmed(),
            Duration::from_secs(60),
            Duration::from_millis(500),
        )
    }

    pub fn with_options(
        rpc_url: String,
        commitment: CommitmentConfig,
        confirm_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self::from_rpc_client(
            RpcClient::new_with_commitment(rpc_url, commitment),
            confirm_timeout,
            poll_interval,
        )
    }

    fn from_rpc_client(client: RpcClient, confirm_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            client: Arc::new(client),
            confirm_timeout,
            poll_interval,
        }
    }

    pub fn from_settings(rpc_url: String, section: &SolanaSection) -> Result<Self, ConfigError> {
        Ok(Self::with_options(
            rpc_url,
            section.commitment_config()?,
            section.confirm_timeout(),
            section.poll_interval(),
        ))
    }

    /// Spawn blocking to make sync RPC call async-compatible
    async fn run_blocking<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&RpcClient) -> Result<T, LedgerError> + Send + 'static,
        T: Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || f(&client))
            .await
            .map_err(|e| LedgerError::RpcError(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl LedgerPort for SolanaClient {
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let pubkey = *pubkey;
        self.run_blocking(move |client| {
            client
                .get_account_with_commitment(&pubkey, client.commitment())
                .map(|response| response.value.map(|account| account.data))
                .map_err(rpc_err)
        })
        .await
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, LedgerError> {
        let pubkey = *pubkey;
        self.run_blocking(move |client| client.get_balance(&pubkey).map_err(rpc_err))
            .await
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAmount>, LedgerError> {
        let pubkey = *token_account;
        self.run_blocking(move |client| {
            // The balance RPC errors on missing accounts; check existence first so
            // "no account" stays distinguishable from a transport failure.
            let exists = client
                .get_account_with_commitment(&pubkey, client.commitment())
                .map_err(rpc_err)?
                .value
                .is_some();
            if !exists {
                return Ok(None);
            }

            let balance = client.get_token_account_balance(&pubkey).map_err(rpc_err)?;
            let amount = balance
                .amount
                .parse::<u64>()
                .map_err(|e| LedgerError::RpcError(format!("Parse error: {}", e)))?;

            Ok(Some(TokenAmount {
                amount,
                decimals: balance.decimals,
            }))
        })
        .await
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), LedgerError> {
        self.run_blocking(|client| {
            client
                .get_latest_blockhash_with_commitment(client.commitment())
                .map_err(rpc_err)
        })
        .await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, LedgerError> {
        self.run_blocking(move |client| {
            client
                .get_minimum_balance_for_rent_exemption(data_len)
                .map_err(rpc_err)
        })
        .await
    }

    async fn get_vote_accounts(&self) -> Result<Vec<VoteAccount>, LedgerError> {
        self.run_blocking(|client| {
            let status = client.get_vote_accounts().map_err(rpc_err)?;
            Ok(status
                .current
                .into_iter()
                .filter_map(|info| {
                    Pubkey::from_str(&info.vote_pubkey)
                        .ok()
                        .map(|vote_pubkey| VoteAccount {
                            vote_pubkey,
                            activated_stake: info.activated_stake,
                        })
                })
                .collect())
        })
        .await
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        let tx = transaction.clone();
        self.run_blocking(move |client| {
            client
                .send_transaction(&tx)
                .map_err(|e| LedgerError::TransactionError(e.to_string()))
        })
        .await
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), LedgerError> {
        let signature = *signature;
        let started = Instant::now();

        loop {
            let status = self
                .run_blocking(move |client| client.get_signature_status(&signature).map_err(rpc_err))
                .await?;

            match status {
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => {
                    return Err(LedgerError::TransactionFailed {
                        signature: signature.to_string(),
                        reason: e.to_string(),
                    })
                }
                None => {
                    let height = self
                        .run_blocking(|client| client.get_block_height().map_err(rpc_err))
                        .await?;
                    if blockhash_expired(height, last_valid_block_height) {
                        return Err(LedgerError::BlockhashExpired { last_valid_block_height });
                    }
                }
            }

            if started.elapsed() >= self.confirm_timeout {
                return Err(LedgerError::ConfirmationTimeout {
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
