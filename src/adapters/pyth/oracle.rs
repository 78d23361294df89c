use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use crate::domain::{parse_price_account, PriceFeed};
use crate::ports::{LedgerPort, OracleError, PriceOraclePort};

/// Price oracle backed by on-chain Pyth price accounts
#[derive(Clone)]
pub struct PythOracle {
    ledger: Arc<dyn LedgerPort>,
}

impl PythOracle {
    pub fn new(ledger: Arc<dyn LedgerPort>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl PriceOraclePort for PythOracle {
    async fn get_price_feed(&self, feed: &Pubkey) -> Result<Option<PriceFeed>, OracleError> {
        let data = self
            .ledger
            .get_account_data(feed)
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let Some(data) = data else {
            tracing::debug!("Price account {} not found", feed);
            return Ok(None);
        };

        let parsed = parse_price_account(&data)
            .map_err(|e| OracleError::Malformed(format!("{}: {}", feed, e)))?;

        tracing::debug!(
            "Price feed {}: price={} expo={} status={:?} slot={}",
            feed, parsed.price, parsed.expo, parsed.status, parsed.publish_slot
        );
        Ok(Some(parsed))
    }
}
