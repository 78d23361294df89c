//! End-to-end tests of the engine façade and the `aurora` binary.
//!
//! Network-facing ports are replaced by the recording mocks, except where a
//! test checks that no network call is made at all.

use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;

use aurora::adapters::pyth::PythOracle;
use aurora::adapters::solana::WalletManager;
use aurora::application::{AuroraEngine, EngineError, EngineOptions, ErrorKind};
use aurora::config::{ConfigError, Credentials, Settings, REQUIRED_VARS};
use aurora::domain::known_programs::parse_pubkey;
use aurora::domain::price_account::encode_price_account;
use aurora::domain::{PriceFeed, PriceStatus, SOL_MINT, USDC_MINT};
use aurora::ports::mocks::{MockLedger, MockOracle, MockRouter};
use aurora::ports::LedgerPort;

const SOL_FEED: &str = "H6ARHf6YXhGYeQfUzQNGk6rDNnLBQKrenN712K4AQJEG";
const UNREACHABLE_RPC: &str = "http://127.0.0.1:9";

fn full_env(wallet: &WalletManager) -> HashMap<&'static str, String> {
    HashMap::from([
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("BLOCKCHAIN_RPC_URL", UNREACHABLE_RPC.to_string()),
        ("WALLET_PRIVATE_KEY", wallet.to_base58()),
    ])
}

fn connected_engine() -> AuroraEngine {
    let wallet = WalletManager::new_random();
    let env = full_env(&wallet);
    let credentials = Credentials::from_lookup(|key| env.get(key).cloned()).unwrap();
    AuroraEngine::connect(&credentials, &Settings::default()).unwrap()
}

#[test]
fn test_missing_vars_reported_exactly() {
    let wallet = WalletManager::new_random();
    let env = full_env(&wallet);

    for skip in REQUIRED_VARS {
        let result = Credentials::from_lookup(|key| {
            if key == skip {
                None
            } else {
                env.get(key).cloned()
            }
        });
        match result {
            Err(ConfigError::MissingEnvVars(missing)) => assert_eq!(missing, vec![skip.to_string()]),
            other => panic!("expected missing {}, got {:?}", skip, other.map(|_| ())),
        }
    }

    let err = Credentials::from_lookup(|_| None).unwrap_err();
    assert_eq!(err.missing_vars(), REQUIRED_VARS.map(String::from).as_slice());
}

#[tokio::test]
async fn test_construct_then_balance_without_account() {
    let ledger = Arc::new(MockLedger::new());
    let engine = AuroraEngine::new(
        ledger.clone(),
        Arc::new(MockOracle::new()),
        Arc::new(MockRouter::new()),
        WalletManager::new_random(),
        EngineOptions::default(),
    );

    assert_eq!(engine.try_token_balance(SOL_MINT).await.unwrap(), None);
    assert_eq!(engine.balance(SOL_MINT).await, 0.0);
    assert_eq!(ledger.call_count("get_token_account_balance"), 2);
}

#[tokio::test]
async fn test_unknown_symbol_fails_before_network() {
    let engine = connected_engine();

    let err = engine.fetch_price("DOGE/USD").await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownSymbol(ref s) if s == "DOGE/USD"));
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn test_connect_rejects_bad_wallet_secret() {
    let credentials = Credentials::from_lookup(|key| match key {
        "WALLET_PRIVATE_KEY" => Some("not-a-key".to_string()),
        _ => Some("value".to_string()),
    })
    .unwrap();

    let err = match AuroraEngine::connect(&credentials, &Settings::default()) {
        Err(e) => e,
        Ok(_) => panic!("connect accepted an invalid wallet secret"),
    };
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_sol_price_through_pyth_adapter() {
    let feed = PriceFeed {
        price: 14_250_000_000,
        conf: 7_000_000,
        expo: -8,
        status: PriceStatus::Trading,
        publish_slot: 300_000_000,
    };
    let ledger = Arc::new(
        MockLedger::new().with_account(parse_pubkey(SOL_FEED).unwrap(), encode_price_account(&feed)),
    );
    let oracle = Arc::new(PythOracle::new(ledger.clone() as Arc<dyn LedgerPort>));
    let engine = AuroraEngine::new(
        ledger.clone(),
        oracle,
        Arc::new(MockRouter::new()),
        WalletManager::new_random(),
        EngineOptions::default(),
    );

    let price = engine.fetch_price("SOL/USD").await.unwrap().unwrap();
    assert!(price.is_finite() && price > 0.0);
    approx::assert_relative_eq!(price, 142.5, epsilon = 1e-9);
    assert_eq!(ledger.call_count("get_account_data"), 1);
}

#[tokio::test]
async fn test_failures_return_false() {
    let ledger = Arc::new(MockLedger::new().failing_reads().failing_send());
    let router = Arc::new(MockRouter::new());
    let engine = AuroraEngine::new(
        ledger.clone(),
        Arc::new(MockOracle::new()),
        router.clone(),
        WalletManager::new_random(),
        EngineOptions::default(),
    );

    assert!(!engine.trade(SOL_MINT, USDC_MINT, 1.0).await);
    assert!(!engine.stake(1.0, 0).await);
    assert!(!engine.lend(USDC_MINT, 1.0, 0).await);

    assert!(router.calls().iter().all(|c| c == "quote"));
    assert_eq!(ledger.call_count("send_transaction"), 0);
    assert_eq!(ledger.call_count("confirm_transaction"), 0);
}

#[tokio::test]
async fn test_lend_unlisted_token_makes_no_calls() {
    let ledger = Arc::new(MockLedger::new());
    let oracle = Arc::new(MockOracle::new());
    let router = Arc::new(MockRouter::new());
    let engine = AuroraEngine::new(
        ledger.clone(),
        oracle.clone(),
        router.clone(),
        WalletManager::new_random(),
        EngineOptions::default(),
    );

    assert!(!engine.lend("DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", 5.0, 0).await);
    assert!(ledger.calls().is_empty());
    assert!(oracle.calls().is_empty());
    assert!(router.calls().is_empty());
}

fn aurora_command(dir: &tempfile::TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_aurora"));
    command.env_clear().current_dir(dir.path());
    command
}

#[test]
fn test_binary_reports_missing_config() {
    let dir = tempfile::tempdir().unwrap();

    let output = aurora_command(&dir).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: "));
    assert!(stderr.contains("OPENAI_API_KEY, BLOCKCHAIN_RPC_URL, WALLET_PRIVATE_KEY"));
}

#[test]
fn test_binary_ready() {
    let dir = tempfile::tempdir().unwrap();
    let wallet = WalletManager::new_random();

    let output = aurora_command(&dir).envs(full_env(&wallet)).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Agent Aurora ready for operation"
    );
}

#[test]
fn test_binary_rejects_missing_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let wallet = WalletManager::new_random();

    let output = aurora_command(&dir)
        .envs(full_env(&wallet))
        .args(["--config", "absent.toml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load settings"));
}
