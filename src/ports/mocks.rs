//! Recording mocks for the ports, shared by unit and integration tests.
//!
//! Each mock records every call by name so tests can assert how many network
//! round-trips an operation made. Built for unit tests and behind the
//! `test-utils` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use base64::Engine;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    system_instruction,
    transaction::VersionedTransaction,
};

use crate::domain::PriceFeed;
use super::models::{
    QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo, SwapRequest, SwapResponse,
};
use super::ledger::{LedgerError, LedgerPort, TokenAmount, VoteAccount};
use super::oracle::{OracleError, PriceOraclePort};
use super::router::{ExecutionError, SwapRouterPort};

/// Rent-exempt minimum of a 200 byte stake account on mainnet
pub const STAKE_RENT_EXEMPT_LAMPORTS: u64 = 2_282_880;

/// Last valid block height handed out with every mock blockhash
pub const MOCK_LAST_VALID_BLOCK_HEIGHT: u64 = 250_000_150;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock ledger with configurable accounts and failure injection
pub struct MockLedger {
    calls: Mutex<Vec<String>>,
    sent: Mutex<Vec<VersionedTransaction>>,
    confirm_heights: Mutex<Vec<u64>>,
    accounts: HashMap<Pubkey, Vec<u8>>,
    token_balances: HashMap<Pubkey, TokenAmount>,
    vote_accounts: Vec<VoteAccount>,
    lamports: u64,
    rent_exempt_minimum: u64,
    fail_reads: bool,
    fail_send: bool,
    fail_confirm: bool,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            confirm_heights: Mutex::new(Vec::new()),
            accounts: HashMap::new(),
            token_balances: HashMap::new(),
            vote_accounts: Vec::new(),
            lamports: 0,
            rent_exempt_minimum: STAKE_RENT_EXEMPT_LAMPORTS,
            fail_reads: false,
            fail_send: false,
            fail_confirm: false,
        }
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, pubkey: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.insert(pubkey, data);
        self
    }

    pub fn with_token_balance(mut self, token_account: Pubkey, amount: TokenAmount) -> Self {
        self.token_balances.insert(token_account, amount);
        self
    }

    pub fn with_vote_account(mut self, vote_pubkey: Pubkey, activated_stake: u64) -> Self {
        self.vote_accounts.push(VoteAccount { vote_pubkey, activated_stake });
        self
    }

    pub fn with_lamports(mut self, lamports: u64) -> Self {
        self.lamports = lamports;
        self
    }

    /// Every read call fails with an RPC error
    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn failing_send(mut self) -> Self {
        self.fail_send = true;
        self
    }

    pub fn failing_confirm(mut self) -> Self {
        self.fail_confirm = true;
        self
    }

    /// Names of all calls in order
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        lock(&self.calls).iter().filter(|c| c.as_str() == name).count()
    }

    /// Transactions passed to `send_transaction`
    pub fn sent_transactions(&self) -> Vec<VersionedTransaction> {
        lock(&self.sent).clone()
    }

    /// `last_valid_block_height` of each `confirm_transaction` call
    pub fn confirm_heights(&self) -> Vec<u64> {
        lock(&self.confirm_heights).clone()
    }

    fn record(&self, name: &str) {
        lock(&self.calls).push(name.to_string());
    }

    fn read<T>(&self, name: &str, value: T) -> Result<T, LedgerError> {
        self.record(name);
        if self.fail_reads {
            return Err(LedgerError::RpcError(format!("{} unavailable", name)));
        }
        Ok(value)
    }
}

#[async_trait]
impl LedgerPort for MockLedger {
    async fn get_account_data(&self, pubkey: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        self.read("get_account_data", self.accounts.get(pubkey).cloned())
    }

    async fn get_balance(&self, _pubkey: &Pubkey) -> Result<u64, LedgerError> {
        self.read("get_balance", self.lamports)
    }

    async fn get_token_account_balance(
        &self,
        token_account: &Pubkey,
    ) -> Result<Option<TokenAmount>, LedgerError> {
        self.read(
            "get_token_account_balance",
            self.token_balances.get(token_account).copied(),
        )
    }

    async fn get_latest_blockhash(&self) -> Result<(Hash, u64), LedgerError> {
        self.read(
            "get_latest_blockhash",
            (Hash::new_unique(), MOCK_LAST_VALID_BLOCK_HEIGHT),
        )
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _data_len: usize,
    ) -> Result<u64, LedgerError> {
        self.read("get_minimum_balance_for_rent_exemption", self.rent_exempt_minimum)
    }

    async fn get_vote_accounts(&self) -> Result<Vec<VoteAccount>, LedgerError> {
        self.read("get_vote_accounts", self.vote_accounts.clone())
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, LedgerError> {
        self.record("send_transaction");
        if self.fail_send {
            return Err(LedgerError::TransactionError("node is behind".to_string()));
        }
        lock(&self.sent).push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        last_valid_block_height: u64,
    ) -> Result<(), LedgerError> {
        self.record("confirm_transaction");
        lock(&self.confirm_heights).push(last_valid_block_height);
        if self.fail_confirm {
            return Err(LedgerError::ConfirmationTimeout { waited_secs: 60 });
        }
        Ok(())
    }
}

/// Mock oracle serving fixed feeds
#[derive(Default)]
pub struct MockOracle {
    calls: Mutex<Vec<Pubkey>>,
    feeds: HashMap<Pubkey, PriceFeed>,
    failure: Option<OracleError>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, address: Pubkey, feed: PriceFeed) -> Self {
        self.feeds.insert(address, feed);
        self
    }

    pub fn failing(mut self, error: OracleError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Feed addresses queried, in order
    pub fn calls(&self) -> Vec<Pubkey> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl PriceOraclePort for MockOracle {
    async fn get_price_feed(&self, feed: &Pubkey) -> Result<Option<PriceFeed>, OracleError> {
        lock(&self.calls).push(*feed);
        if let Some(ref error) = self.failure {
            return Err(error.clone());
        }
        Ok(self.feeds.get(feed).copied())
    }
}

/// Mock routing service. An unset response makes the call fail.
#[derive(Default)]
pub struct MockRouter {
    calls: Mutex<Vec<String>>,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    quote: Option<QuoteResponse>,
    swap: Option<SwapResponse>,
}

impl MockRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, quote: QuoteResponse) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_swap(mut self, swap: SwapResponse) -> Self {
        self.swap = Some(swap);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        lock(&self.quote_requests).clone()
    }
}

#[async_trait]
impl SwapRouterPort for MockRouter {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        lock(&self.calls).push("quote".to_string());
        lock(&self.quote_requests).push(request.clone());
        self.quote
            .clone()
            .ok_or_else(|| ExecutionError::ApiError("API error 503: unavailable".to_string()))
    }

    async fn get_swap_transaction(
        &self,
        _request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError> {
        lock(&self.calls).push("swap".to_string());
        self.swap
            .clone()
            .ok_or_else(|| ExecutionError::ApiError("API error 503: unavailable".to_string()))
    }
}

/// Single-hop quote as the routing service would return it
pub fn sample_quote(input_mint: &str, output_mint: &str, in_amount: u64, out_amount: u64) -> QuoteResponse {
    QuoteResponse {
        input_mint: input_mint.to_string(),
        output_mint: output_mint.to_string(),
        in_amount: in_amount.to_string(),
        out_amount: out_amount.to_string(),
        other_amount_threshold: (out_amount - out_amount / 200).to_string(),
        swap_mode: "ExactIn".to_string(),
        slippage_bps: 50,
        price_impact_pct: "0.01".to_string(),
        route_plan: vec![RoutePlanStep {
            swap_info: SwapInfo {
                amm_key: "pool123".to_string(),
                label: "Raydium".to_string(),
                input_mint: input_mint.to_string(),
                output_mint: output_mint.to_string(),
                in_amount: in_amount.to_string(),
                out_amount: out_amount.to_string(),
                fee_amount: None,
                fee_mint: None,
            },
            percent: 100,
        }],
        context_slot: None,
        time_taken: None,
        extra: HashMap::new(),
    }
}

/// Unsigned swap transaction paid by `payer`, encoded like the swap endpoint
pub fn unsigned_swap_response(payer: &Pubkey) -> SwapResponse {
    let instruction = system_instruction::transfer(payer, &Pubkey::new_unique(), 1);
    let message = Message::new_with_blockhash(&[instruction], Some(payer), &Hash::new_unique());
    let transaction = VersionedTransaction {
        signatures: vec![Signature::default(); message.header.num_required_signatures as usize],
        message: VersionedMessage::Legacy(message),
    };
    let bytes = bincode::serialize(&transaction).unwrap_or_default();

    SwapResponse {
        swap_transaction: base64::engine::general_purpose::STANDARD.encode(bytes),
        last_valid_block_height: 300_000_000,
        prioritization_fee_lamports: 0,
    }
}
