//! Aurora Engine
//!
//! The façade the agent talks to: price lookups, balances, and the trade,
//! stake and lend operations. Each operation is one sequential chain of
//! port calls with at most one submission and one confirmation wait.
//!
//! Two layers are exposed. `try_*` methods return tagged `EngineError`s.
//! The plain methods (`balance`, `trade`, `stake`, `lend`, `fetch_price`)
//! log a single warning on failure and return a sentinel instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, VersionedTransaction},
};
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::Mint;
use tokio::sync::Mutex;

use crate::adapters::jupiter::{JupiterClient, JupiterConfig};
use crate::adapters::pyth::PythOracle;
use crate::adapters::solana::{SolanaClient, WalletManager};
use crate::config::{ConfigError, Credentials, Settings};
use crate::domain::known_programs::{known_decimals, parse_pubkey};
use crate::domain::{
    associated_token_address, lending_pool, price_feed_address, to_base_units, to_ui_amount,
    AmountError, SOL_MINT,
};
use crate::ports::{
    ExecutionError, LedgerPort, PriceOraclePort, QuoteRequest, SwapRequest, SwapRouterPort,
};
use super::error::EngineError;
use super::instructions::{lend_deposit_instruction, stake_account_size, stake_instructions};

const SOL_DECIMALS: u8 = 9;

/// Tunables of the engine, normally taken from settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Fixed slippage tolerance for every quote
    pub slippage_bps: u16,
    pub priority_fee_lamports: Option<u64>,
    /// Validator to delegate to; `None` picks the largest by activated stake
    pub vote_account: Option<Pubkey>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            slippage_bps: 50,
            priority_fee_lamports: None,
            vote_account: None,
        }
    }
}

impl EngineOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            slippage_bps: settings.jupiter.slippage_bps,
            priority_fee_lamports: settings.jupiter.priority_fee_lamports,
            vote_account: settings.stake.get_vote_account()?,
        })
    }
}

/// Result of a confirmed stake operation
#[derive(Debug, Clone)]
pub struct StakeReceipt {
    pub signature: Signature,
    /// Newly created stake account
    pub stake_account: Pubkey,
    pub vote_account: Pubkey,
    /// Total lamports moved into the stake account (rent + stake)
    pub lamports: u64,
    pub confirmed_at: DateTime<Utc>,
}

pub struct AuroraEngine {
    ledger: Arc<dyn LedgerPort>,
    oracle: Arc<dyn PriceOraclePort>,
    router: Arc<dyn SwapRouterPort>,
    wallet: WalletManager,
    options: EngineOptions,
    // Held across send + confirm so one wallet never has two submissions in flight
    submit_lock: Mutex<()>,
}

impl AuroraEngine {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        oracle: Arc<dyn PriceOraclePort>,
        router: Arc<dyn SwapRouterPort>,
        wallet: WalletManager,
        options: EngineOptions,
    ) -> Self {
        Self {
            ledger,
            oracle,
            router,
            wallet,
            options,
            submit_lock: Mutex::new(()),
        }
    }

    /// Build the engine against live Solana RPC, Pyth and Jupiter.
    ///
    /// No network call is made here.
    pub fn connect(credentials: &Credentials, settings: &Settings) -> Result<Self, EngineError> {
        let wallet = WalletManager::from_secret(&credentials.wallet_secret)?;
        let options = EngineOptions::from_settings(settings)?;

        let ledger: Arc<dyn LedgerPort> = Arc::new(SolanaClient::from_settings(
            credentials.rpc_url.clone(),
            &settings.solana,
        )?);
        let oracle = Arc::new(PythOracle::new(Arc::clone(&ledger)));
        let router = Arc::new(JupiterClient::with_config(JupiterConfig::from(&settings.jupiter))?);

        tracing::info!(
            "Engine ready: wallet={} slippage_bps={}",
            wallet.public_key(),
            options.slippage_bps
        );

        Ok(Self::new(ledger, oracle, router, wallet, options))
    }

    pub fn wallet_pubkey(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ---- Prices ----

    /// Aggregate oracle price of a listed pair. `None` when the feed has no
    /// trading price.
    pub async fn try_fetch_price(&self, symbol: &str) -> Result<Option<f64>, EngineError> {
        let address = price_feed_address(symbol)
            .ok_or_else(|| EngineError::UnknownSymbol(symbol.to_string()))?;
        let feed = parse_address(address)?;

        let price = self
            .oracle
            .get_price_feed(&feed)
            .await?
            .and_then(|feed| feed.trading_price());

        tracing::debug!("Price {}: {:?}", symbol, price);
        Ok(price)
    }

    /// Like `try_fetch_price`, but only an unknown symbol is an error.
    /// Oracle failures are logged and reported as `None`.
    pub async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>, EngineError> {
        match self.try_fetch_price(symbol).await {
            Err(e @ EngineError::UnknownSymbol(_)) => Err(e),
            Err(e) => {
                log_failure("fetch_price", &e);
                Ok(None)
            }
            Ok(price) => Ok(price),
        }
    }

    // ---- Balances ----

    /// Balance of the wallet's associated token account for `mint`.
    /// `None` when the token account does not exist.
    pub async fn try_token_balance(&self, mint: &str) -> Result<Option<f64>, EngineError> {
        let mint_key = parse_mint(mint)?;
        let token_account = associated_token_address(&self.wallet.pubkey(), &mint_key)
            .ok_or_else(|| EngineError::InvalidInput(format!("no token account address for {}", mint)))?;

        let balance = self.ledger.get_token_account_balance(&token_account).await?;
        Ok(balance.map(|b| b.ui_amount()))
    }

    /// Token balance, `0.0` when there is no token account or on any error
    pub async fn balance(&self, mint: &str) -> f64 {
        match self.try_token_balance(mint).await {
            Ok(balance) => balance.unwrap_or(0.0),
            Err(e) => {
                log_failure("balance", &e);
                0.0
            }
        }
    }

    /// Native SOL balance of the wallet
    pub async fn try_native_balance(&self) -> Result<f64, EngineError> {
        let lamports = self.ledger.get_balance(&self.wallet.pubkey()).await?;
        Ok(to_ui_amount(lamports, SOL_DECIMALS))
    }

    // ---- Trade ----

    /// Swap `amount` of `from_mint` into `to_mint` along the route the
    /// routing service returns.
    pub async fn try_trade(
        &self,
        from_mint: &str,
        to_mint: &str,
        amount: f64,
    ) -> Result<Signature, EngineError> {
        check_amount(amount)?;
        let from_key = parse_mint(from_mint)?;
        parse_mint(to_mint)?;
        if from_mint == to_mint {
            return Err(EngineError::InvalidInput(format!(
                "input and output mint are both {}",
                from_mint
            )));
        }

        let decimals = self.mint_decimals(from_mint, &from_key).await?;
        let base_amount = to_base_units(amount, decimals)?;

        let request = QuoteRequest::new(
            from_mint.to_string(),
            to_mint.to_string(),
            base_amount,
            self.options.slippage_bps,
        );
        let quote = self.router.get_quote(&request).await?;
        if quote.route_plan.is_empty() {
            return Err(ExecutionError::NoRoute {
                input_mint: from_mint.to_string(),
                output_mint: to_mint.to_string(),
            }
            .into());
        }

        tracing::info!(
            "Quote {} -> {}: in={} out={} min_out={} impact={}% via {}",
            from_mint,
            to_mint,
            quote.in_amount,
            quote.output_amount(),
            quote.min_output_amount(),
            quote.price_impact(),
            quote.route_labels()
        );

        let quote_value = serde_json::to_value(&quote)
            .map_err(|e| ExecutionError::InvalidParameters(format!("quote encoding: {}", e)))?;
        let swap_request = SwapRequest::new(self.wallet.public_key(), quote_value)
            .with_priority_fee(self.options.priority_fee_lamports);

        let swap = self.router.get_swap_transaction(&swap_request).await?;
        let transaction = self.wallet.sign_versioned(swap.decode_transaction()?)?;

        self.submit_and_confirm(&transaction, swap.last_valid_block_height)
            .await
    }

    pub async fn trade(&self, from_mint: &str, to_mint: &str, amount: f64) -> bool {
        match self.try_trade(from_mint, to_mint, amount).await {
            Ok(signature) => {
                tracing::info!("Trade confirmed: {}", signature);
                true
            }
            Err(e) => {
                log_failure("trade", &e);
                false
            }
        }
    }

    // ---- Stake ----

    /// Create a new stake account holding `amount` SOL and delegate it.
    /// A lockup duration is not supported; only `0` is accepted.
    pub async fn try_stake(&self, amount: f64, duration_days: u32) -> Result<StakeReceipt, EngineError> {
        reject_duration(duration_days)?;
        let lamports = to_base_units(amount, SOL_DECIMALS)?;

        let vote_account = self.resolve_vote_account().await?;
        let rent = self
            .ledger
            .get_minimum_balance_for_rent_exemption(stake_account_size())
            .await?;
        let total = rent.checked_add(lamports).ok_or(AmountError::Overflow {
            amount,
            decimals: SOL_DECIMALS,
        })?;

        let payer = self.wallet.pubkey();
        let stake_keypair = Keypair::new();
        let instructions = stake_instructions(&payer, &stake_keypair.pubkey(), &vote_account, total);

        let (blockhash, last_valid_block_height) = self.ledger.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&instructions, Some(&payer));
        transaction.message.recent_blockhash = blockhash;
        self.wallet.sign_with(&mut transaction, &[&stake_keypair])?;

        tracing::info!(
            "Staking {} lamports (rent {}) to {} via {}",
            lamports,
            rent,
            vote_account,
            stake_keypair.pubkey()
        );

        let signature = self
            .submit_and_confirm(&VersionedTransaction::from(transaction), last_valid_block_height)
            .await?;

        Ok(StakeReceipt {
            signature,
            stake_account: stake_keypair.pubkey(),
            vote_account,
            lamports: total,
            confirmed_at: Utc::now(),
        })
    }

    pub async fn stake(&self, amount: f64, duration_days: u32) -> bool {
        match self.try_stake(amount, duration_days).await {
            Ok(receipt) => {
                tracing::info!(
                    "Stake confirmed: {} (account {})",
                    receipt.signature,
                    receipt.stake_account
                );
                true
            }
            Err(e) => {
                log_failure("stake", &e);
                false
            }
        }
    }

    // ---- Lend ----

    /// Deposit `amount` of `token_mint` into its lending pool reserve
    pub async fn try_lend(
        &self,
        token_mint: &str,
        amount: f64,
        duration_days: u32,
    ) -> Result<Signature, EngineError> {
        let pool = lending_pool(token_mint)
            .ok_or_else(|| EngineError::UnknownLendingToken(token_mint.to_string()))?;
        reject_duration(duration_days)?;
        check_amount(amount)?;

        let mint_key = parse_mint(token_mint)?;
        let decimals = self.mint_decimals(token_mint, &mint_key).await?;
        let base_amount = to_base_units(amount, decimals)?;

        let payer = self.wallet.pubkey();
        let instruction = lend_deposit_instruction(pool, &payer, base_amount)?;

        let (blockhash, last_valid_block_height) = self.ledger.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(&[instruction], Some(&payer));
        transaction.message.recent_blockhash = blockhash;
        self.wallet.sign_with(&mut transaction, &[])?;

        tracing::info!("Lending {} base units of {} to {}", base_amount, token_mint, pool.reserve);

        self.submit_and_confirm(&VersionedTransaction::from(transaction), last_valid_block_height)
            .await
    }

    pub async fn lend(&self, token_mint: &str, amount: f64, duration_days: u32) -> bool {
        match self.try_lend(token_mint, amount, duration_days).await {
            Ok(signature) => {
                tracing::info!("Lend confirmed: {}", signature);
                true
            }
            Err(e) => {
                log_failure("lend", &e);
                false
            }
        }
    }

    // ---- Internals ----

    /// Submit once, then wait once for confirmation while the blockhash is valid
    async fn submit_and_confirm(
        &self,
        transaction: &VersionedTransaction,
        last_valid_block_height: u64,
    ) -> Result<Signature, EngineError> {
        let _guard = self.submit_lock.lock().await;

        let signature = self
            .ledger
            .send_transaction(transaction)
            .await
            .map_err(EngineError::Ledger)?;
        tracing::info!("Transaction sent: {}", signature);

        self.ledger
            .confirm_transaction(&signature, last_valid_block_height)
            .await
            .map_err(|e| EngineError::Unconfirmed {
                signature: signature.to_string(),
                reason: e.to_string(),
            })?;

        Ok(signature)
    }

    async fn resolve_vote_account(&self) -> Result<Pubkey, EngineError> {
        if let Some(vote) = self.options.vote_account {
            return Ok(vote);
        }

        self.ledger
            .get_vote_accounts()
            .await?
            .into_iter()
            .max_by_key(|account| account.activated_stake)
            .map(|account| account.vote_pubkey)
            .ok_or(EngineError::NoValidator)
    }

    /// Decimals from the static table, else from the on-chain mint account
    async fn mint_decimals(&self, mint: &str, mint_key: &Pubkey) -> Result<u8, EngineError> {
        if let Some(decimals) = known_decimals(mint) {
            return Ok(decimals);
        }

        let data = self
            .ledger
            .get_account_data(mint_key)
            .await?
            .ok_or_else(|| EngineError::InvalidInput(format!("mint account {} not found", mint)))?;
        let base = data
            .get(..Mint::LEN)
            .ok_or_else(|| EngineError::InvalidInput(format!("{} is not a token mint", mint)))?;
        let state = Mint::unpack(base)
            .map_err(|e| EngineError::InvalidInput(format!("{} is not a token mint: {}", mint, e)))?;

        Ok(state.decimals)
    }
}

fn log_failure(operation: &str, err: &EngineError) {
    tracing::warn!("{} failed ({}): {}", operation, err.kind(), err);
}

fn reject_duration(duration_days: u32) -> Result<(), EngineError> {
    if duration_days != 0 {
        return Err(EngineError::Unsupported(format!(
            "lockup duration of {} days",
            duration_days
        )));
    }
    Ok(())
}

fn check_amount(amount: f64) -> Result<(), EngineError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AmountError::NotPositive(amount).into());
    }
    Ok(())
}

fn parse_mint(mint: &str) -> Result<Pubkey, EngineError> {
    parse_pubkey(mint).ok_or_else(|| EngineError::InvalidInput(format!("invalid mint address: {}", mint)))
}

fn parse_address(address: &str) -> Result<Pubkey, EngineError> {
    parse_pubkey(address).ok_or_else(|| EngineError::InvalidInput(format!("invalid address: {}", address)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ErrorKind;
    use crate::domain::{PriceFeed, PriceStatus, USDC_MINT};
    use crate::ports::mocks::{
        sample_quote, unsigned_swap_response, MockLedger, MockOracle, MockRouter,
        MOCK_LAST_VALID_BLOCK_HEIGHT, STAKE_RENT_EXEMPT_LAMPORTS,
    };
    use crate::ports::{OracleError, TokenAmount};
    use solana_sdk::system_instruction::SystemInstruction;
    use spl_token::solana_program::program_option::COption;

    const SOL_FEED: &str = "H6ARHf6YXhGYeQfUzQNGk6rDNnLBQKrenN712K4AQJEG";

    struct Harness {
        ledger: Arc<MockLedger>,
        oracle: Arc<MockOracle>,
        router: Arc<MockRouter>,
        engine: AuroraEngine,
    }

    fn harness_with(
        wallet: WalletManager,
        ledger: MockLedger,
        oracle: MockOracle,
        router: MockRouter,
        options: EngineOptions,
    ) -> Harness {
        let ledger = Arc::new(ledger);
        let oracle = Arc::new(oracle);
        let router = Arc::new(router);
        let engine = AuroraEngine::new(
            ledger.clone(),
            oracle.clone(),
            router.clone(),
            wallet,
            options,
        );
        Harness { ledger, oracle, router, engine }
    }

    fn harness(ledger: MockLedger, oracle: MockOracle, router: MockRouter) -> Harness {
        harness_with(
            WalletManager::new_random(),
            ledger,
            oracle,
            router,
            EngineOptions::default(),
        )
    }

    fn trading_feed(price: i64, expo: i32) -> PriceFeed {
        PriceFeed {
            price,
            conf: 1_000,
            expo,
            status: PriceStatus::Trading,
            publish_slot: 1,
        }
    }

    fn swap_harness(ledger: MockLedger) -> Harness {
        let wallet = WalletManager::new_random();
        let router = MockRouter::new()
            .with_quote(sample_quote(SOL_MINT, USDC_MINT, 1_500_000_000, 213_000_000))
            .with_swap(unsigned_swap_response(&wallet.pubkey()));
        harness_with(wallet, ledger, MockOracle::new(), router, EngineOptions::default())
    }

    #[tokio::test]
    async fn test_unknown_symbol_makes_no_oracle_call() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        let result = h.engine.fetch_price("DOGE/USD").await;
        assert!(matches!(result, Err(EngineError::UnknownSymbol(_))));
        assert!(h.oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_price_single_query() {
        let feed = parse_pubkey(SOL_FEED).unwrap();
        let oracle = MockOracle::new().with_feed(feed, trading_feed(14_250_000_000, -8));
        let h = harness(MockLedger::new(), oracle, MockRouter::new());

        let price = h.engine.fetch_price("SOL/USD").await.unwrap().unwrap();
        approx::assert_relative_eq!(price, 142.5, epsilon = 1e-9);
        assert_eq!(h.oracle.calls(), vec![feed]);
    }

    #[tokio::test]
    async fn test_fetch_price_accepts_alias() {
        let feed = parse_pubkey(SOL_FEED).unwrap();
        let oracle = MockOracle::new().with_feed(feed, trading_feed(150, 0));
        let h = harness(MockLedger::new(), oracle, MockRouter::new());

        assert_eq!(h.engine.fetch_price("sol_usd").await.unwrap(), Some(150.0));
    }

    #[tokio::test]
    async fn test_fetch_price_absent_feed() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        assert_eq!(h.engine.fetch_price("BTC/USD").await.unwrap(), None);
        assert_eq!(h.oracle.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_price_halted_feed() {
        let feed = parse_pubkey(SOL_FEED).unwrap();
        let mut halted = trading_feed(150, 0);
        halted.status = PriceStatus::Halted;
        let oracle = MockOracle::new().with_feed(feed, halted);
        let h = harness(MockLedger::new(), oracle, MockRouter::new());

        assert_eq!(h.engine.fetch_price("SOL/USD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_oracle_failure_collapses_to_none() {
        let oracle = MockOracle::new().failing(OracleError::Transport("timeout".into()));
        let h = harness(MockLedger::new(), oracle, MockRouter::new());

        assert_eq!(h.engine.fetch_price("SOL/USD").await.unwrap(), None);

        let err = h.engine.try_fetch_price("SOL/USD").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_balance_without_token_account() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        assert_eq!(h.engine.balance(SOL_MINT).await, 0.0);
        assert_eq!(h.engine.try_token_balance(SOL_MINT).await.unwrap(), None);
        assert_eq!(h.ledger.call_count("get_token_account_balance"), 2);
    }

    #[tokio::test]
    async fn test_balance_reads_associated_account() {
        let wallet = WalletManager::new_random();
        let mint = parse_pubkey(USDC_MINT).unwrap();
        let ata = associated_token_address(&wallet.pubkey(), &mint).unwrap();
        let ledger = MockLedger::new()
            .with_token_balance(ata, TokenAmount { amount: 12_345_678, decimals: 6 });
        let h = harness_with(
            wallet,
            ledger,
            MockOracle::new(),
            MockRouter::new(),
            EngineOptions::default(),
        );

        approx::assert_relative_eq!(h.engine.balance(USDC_MINT).await, 12.345678);
        assert_eq!(h.engine.try_token_balance(USDC_MINT).await.unwrap(), Some(12.345678));
    }

    #[tokio::test]
    async fn test_balance_failure_is_zero() {
        let h = harness(MockLedger::new().failing_reads(), MockOracle::new(), MockRouter::new());

        assert_eq!(h.engine.balance(USDC_MINT).await, 0.0);
        assert_eq!(h.engine.balance("not-a-mint").await, 0.0);
    }

    #[tokio::test]
    async fn test_native_balance() {
        let h = harness(
            MockLedger::new().with_lamports(2_500_000_000),
            MockOracle::new(),
            MockRouter::new(),
        );

        assert_eq!(h.engine.try_native_balance().await.unwrap(), 2.5);
    }

    #[tokio::test]
    async fn test_trade_submits_once() {
        let h = swap_harness(MockLedger::new());

        assert!(h.engine.trade(SOL_MINT, USDC_MINT, 1.5).await);
        assert_eq!(h.router.calls(), vec!["quote", "swap"]);
        assert_eq!(h.ledger.call_count("send_transaction"), 1);
        assert_eq!(h.ledger.call_count("confirm_transaction"), 1);
        // Confirmation is bounded by the swap transaction's own blockhash
        assert_eq!(h.ledger.confirm_heights(), vec![300_000_000]);
        assert_eq!(h.ledger.call_count("get_latest_blockhash"), 0);

        let request = &h.router.quote_requests()[0];
        assert_eq!(request.amount, 1_500_000_000);
        assert_eq!(request.slippage_bps, 50);

        let sent = h.ledger.sent_transactions();
        assert_ne!(sent[0].signatures[0], Signature::default());
        assert!(sent[0].verify_with_results().iter().all(|ok| *ok));
    }

    #[tokio::test]
    async fn test_trade_empty_route() {
        let wallet = WalletManager::new_random();
        let mut quote = sample_quote(SOL_MINT, USDC_MINT, 1_000_000_000, 1);
        quote.route_plan.clear();
        let router = MockRouter::new()
            .with_quote(quote)
            .with_swap(unsigned_swap_response(&wallet.pubkey()));
        let h = harness_with(wallet, MockLedger::new(), MockOracle::new(), router, EngineOptions::default());

        let err = h.engine.try_trade(SOL_MINT, USDC_MINT, 1.0).await.unwrap_err();
        assert!(matches!(err, EngineError::Routing(ExecutionError::NoRoute { .. })));
        assert_eq!(h.router.calls(), vec!["quote"]);
        assert_eq!(h.ledger.call_count("send_transaction"), 0);
    }

    #[tokio::test]
    async fn test_trade_quote_failure() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        assert!(!h.engine.trade(SOL_MINT, USDC_MINT, 1.0).await);
        assert_eq!(h.ledger.call_count("send_transaction"), 0);
        assert_eq!(h.ledger.call_count("confirm_transaction"), 0);
    }

    #[tokio::test]
    async fn test_trade_unconfirmed() {
        let h = swap_harness(MockLedger::new().failing_confirm());

        let err = h.engine.try_trade(SOL_MINT, USDC_MINT, 1.5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unconfirmed);
        assert_eq!(h.ledger.call_count("send_transaction"), 1);
        assert_eq!(h.ledger.call_count("confirm_transaction"), 1);
    }

    #[tokio::test]
    async fn test_trade_send_failure_does_not_retry() {
        let h = swap_harness(MockLedger::new().failing_send());

        assert!(!h.engine.trade(SOL_MINT, USDC_MINT, 1.5).await);
        assert_eq!(h.ledger.call_count("send_transaction"), 1);
        assert_eq!(h.ledger.call_count("confirm_transaction"), 0);
    }

    #[tokio::test]
    async fn test_trade_rejects_bad_input_without_network() {
        let h = swap_harness(MockLedger::new());

        for amount in [0.0, -1.0, f64::NAN] {
            let err = h.engine.try_trade(SOL_MINT, USDC_MINT, amount).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        let err = h.engine.try_trade(SOL_MINT, SOL_MINT, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = h.engine.try_trade("garbage", USDC_MINT, 1.0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(h.router.calls().is_empty());
        assert!(h.ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn test_trade_reads_unknown_mint_decimals() {
        let wallet = WalletManager::new_random();
        let mint = Pubkey::new_unique();
        let mut data = vec![0u8; Mint::LEN];
        Mint {
            mint_authority: COption::None,
            supply: 1_000_000,
            decimals: 5,
            is_initialized: true,
            freeze_authority: COption::None,
        }
        .pack_into_slice(&mut data);

        let router = MockRouter::new()
            .with_quote(sample_quote(&mint.to_string(), USDC_MINT, 250_000, 1_000))
            .with_swap(unsigned_swap_response(&wallet.pubkey()));
        let h = harness_with(
            wallet,
            MockLedger::new().with_account(mint, data),
            MockOracle::new(),
            router,
            EngineOptions::default(),
        );

        assert!(h.engine.trade(&mint.to_string(), USDC_MINT, 2.5).await);
        assert_eq!(h.router.quote_requests()[0].amount, 250_000);
    }

    #[tokio::test]
    async fn test_stake_delegates_to_largest_validator() {
        let small = Pubkey::new_unique();
        let large = Pubkey::new_unique();
        let ledger = MockLedger::new()
            .with_vote_account(small, 10)
            .with_vote_account(large, 1_000);
        let h = harness(ledger, MockOracle::new(), MockRouter::new());

        let receipt = h.engine.try_stake(1.0, 0).await.unwrap();
        assert_eq!(receipt.vote_account, large);
        assert_eq!(receipt.lamports, STAKE_RENT_EXEMPT_LAMPORTS + 1_000_000_000);
        assert_eq!(h.ledger.call_count("send_transaction"), 1);
        assert_eq!(h.ledger.confirm_heights(), vec![MOCK_LAST_VALID_BLOCK_HEIGHT]);

        let sent = h.ledger.sent_transactions();
        assert_eq!(sent[0].signatures.len(), 2);
        assert!(sent[0].verify_with_results().iter().all(|ok| *ok));

        let create = &sent[0].message.instructions()[0];
        match bincode::deserialize::<SystemInstruction>(&create.data).unwrap() {
            SystemInstruction::CreateAccount { lamports, space, .. } => {
                assert_eq!(lamports, receipt.lamports);
                assert_eq!(space, 200);
            }
            other => panic!("unexpected instruction {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stake_uses_configured_validator() {
        let vote = Pubkey::new_unique();
        let options = EngineOptions {
            vote_account: Some(vote),
            ..EngineOptions::default()
        };
        let h = harness_with(
            WalletManager::new_random(),
            MockLedger::new(),
            MockOracle::new(),
            MockRouter::new(),
            options,
        );

        assert!(h.engine.stake(0.5, 0).await);
        assert_eq!(h.ledger.call_count("get_vote_accounts"), 0);
    }

    #[tokio::test]
    async fn test_stake_rejects_duration() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        let err = h.engine.try_stake(1.0, 30).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(!h.engine.stake(1.0, 30).await);
        assert!(h.ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stake_without_validators() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        let err = h.engine.try_stake(1.0, 0).await.unwrap_err();
        assert!(matches!(err, EngineError::NoValidator));
        assert_eq!(h.ledger.call_count("send_transaction"), 0);
    }

    #[tokio::test]
    async fn test_lend_unknown_token_makes_no_calls() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        assert!(!h.engine.lend("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 100.0, 0).await);
        assert!(h.ledger.calls().is_empty());
        assert!(h.router.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lend_builds_deposit() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        let signature = h.engine.try_lend(USDC_MINT, 25.5, 0).await.unwrap();
        assert_ne!(signature, Signature::default());
        assert_eq!(h.ledger.call_count("send_transaction"), 1);
        assert_eq!(h.ledger.confirm_heights(), vec![MOCK_LAST_VALID_BLOCK_HEIGHT]);

        let sent = h.ledger.sent_transactions();
        let ix = &sent[0].message.instructions()[0];
        let mut expected = vec![4u8];
        expected.extend_from_slice(&25_500_000u64.to_le_bytes());
        assert_eq!(ix.data, expected);
        assert_eq!(sent[0].signatures.len(), 1);
    }

    #[tokio::test]
    async fn test_lend_rejects_duration() {
        let h = harness(MockLedger::new(), MockOracle::new(), MockRouter::new());

        let err = h.engine.try_lend(USDC_MINT, 1.0, 7).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(h.ledger.calls().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_trades_each_submit_once() {
        let h = swap_harness(MockLedger::new());

        let (a, b) = tokio::join!(
            h.engine.trade(SOL_MINT, USDC_MINT, 1.5),
            h.engine.trade(SOL_MINT, USDC_MINT, 1.5)
        );
        assert!(a && b);
        assert_eq!(h.ledger.call_count("send_transaction"), 2);
        assert_eq!(h.ledger.call_count("confirm_transaction"), 2);
    }

    #[test]
    fn test_options_from_settings() {
        let mut settings = Settings::default();
        settings.jupiter.slippage_bps = 100;
        settings.jupiter.priority_fee_lamports = Some(10_000);

        let options = EngineOptions::from_settings(&settings).unwrap();
        assert_eq!(options.slippage_bps, 100);
        assert_eq!(options.priority_fee_lamports, Some(10_000));
    }
}
