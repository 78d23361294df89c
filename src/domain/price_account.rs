//! Pyth Price Account
//!
//! Decodes the aggregate price out of a Pyth v2 on-chain price account.
//! Only the fields the façade reads are decoded; the layout is little-endian:
//!
//! | offset | field                 |
//! |--------|-----------------------|
//! | 0      | magic `0xa1b2c3d4`    |
//! | 8      | account type (3)      |
//! | 20     | exponent (i32)        |
//! | 208    | aggregate price (i64) |
//! | 216    | aggregate conf (u64)  |
//! | 224    | aggregate status (u32)|
//! | 232    | publish slot (u64)    |

use thiserror::Error;

pub const PYTH_MAGIC: u32 = 0xa1b2c3d4;
pub const PRICE_ACCOUNT_TYPE: u32 = 3;

const MAGIC_OFFSET: usize = 0;
const ACCOUNT_TYPE_OFFSET: usize = 8;
const EXPO_OFFSET: usize = 20;
const AGG_PRICE_OFFSET: usize = 208;
const AGG_CONF_OFFSET: usize = 216;
const AGG_STATUS_OFFSET: usize = 224;
const AGG_PUB_SLOT_OFFSET: usize = 232;

/// Minimum bytes needed to decode the aggregate price
pub const MIN_PRICE_ACCOUNT_LEN: usize = 240;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceAccountError {
    #[error("Price account too short: {0} bytes")]
    TooShort(usize),
    #[error("Not a Pyth account (magic {0:#x})")]
    BadMagic(u32),
    #[error("Not a price account (type {0})")]
    WrongAccountType(u32),
}

/// Publishing status of the aggregate price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceStatus {
    Unknown,
    Trading,
    Halted,
    Auction,
    Ignored,
}

impl From<u32> for PriceStatus {
    fn from(value: u32) -> Self {
        match value {
            1 => PriceStatus::Trading,
            2 => PriceStatus::Halted,
            3 => PriceStatus::Auction,
            4 => PriceStatus::Ignored,
            _ => PriceStatus::Unknown,
        }
    }
}

/// Decoded aggregate price of a feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFeed {
    /// Raw aggregate price, scaled by `10^expo`
    pub price: i64,
    /// Raw confidence interval, scaled by `10^expo`
    pub conf: u64,
    pub expo: i32,
    pub status: PriceStatus,
    pub publish_slot: u64,
}

impl PriceFeed {
    /// Aggregate price as a float
    pub fn aggregate_price(&self) -> f64 {
        self.price as f64 * 10f64.powi(self.expo)
    }

    /// Confidence interval as a float
    pub fn confidence(&self) -> f64 {
        self.conf as f64 * 10f64.powi(self.expo)
    }

    pub fn is_trading(&self) -> bool {
        self.status == PriceStatus::Trading
    }

    /// Aggregate price, only while the feed is trading
    pub fn trading_price(&self) -> Option<f64> {
        if !self.is_trading() {
            return None;
        }
        let price = self.aggregate_price();
        price.is_finite().then_some(price)
    }
}

/// Decode a price account
pub fn parse_price_account(data: &[u8]) -> Result<PriceFeed, PriceAccountError> {
    if data.len() < MIN_PRICE_ACCOUNT_LEN {
        return Err(PriceAccountError::TooShort(data.len()));
    }

    let magic = read_u32(data, MAGIC_OFFSET);
    if magic != PYTH_MAGIC {
        return Err(PriceAccountError::BadMagic(magic));
    }

    let account_type = read_u32(data, ACCOUNT_TYPE_OFFSET);
    if account_type != PRICE_ACCOUNT_TYPE {
        return Err(PriceAccountError::WrongAccountType(account_type));
    }

    Ok(PriceFeed {
        price: read_i64(data, AGG_PRICE_OFFSET),
        conf: read_u64(data, AGG_CONF_OFFSET),
        expo: read_u32(data, EXPO_OFFSET) as i32,
        status: PriceStatus::from(read_u32(data, AGG_STATUS_OFFSET)),
        publish_slot: read_u64(data, AGG_PUB_SLOT_OFFSET),
    })
}

// Callers check the length first.
fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn read_i64(data: &[u8], offset: usize) -> i64 {
    read_u64(data, offset) as i64
}

/// Encode a minimal price account. Used by tests and mocks.
pub fn encode_price_account(feed: &PriceFeed) -> Vec<u8> {
    let mut data = vec![0u8; MIN_PRICE_ACCOUNT_LEN];
    let status = match feed.status {
        PriceStatus::Unknown => 0u32,
        PriceStatus::Trading => 1,
        PriceStatus::Halted => 2,
        PriceStatus::Auction => 3,
        PriceStatus::Ignored => 4,
    };
    data[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(&PYTH_MAGIC.to_le_bytes());
    data[ACCOUNT_TYPE_OFFSET..ACCOUNT_TYPE_OFFSET + 4]
        .copy_from_slice(&PRICE_ACCOUNT_TYPE.to_le_bytes());
    data[EXPO_OFFSET..EXPO_OFFSET + 4].copy_from_slice(&feed.expo.to_le_bytes());
    data[AGG_PRICE_OFFSET..AGG_PRICE_OFFSET + 8].copy_from_slice(&feed.price.to_le_bytes());
    data[AGG_CONF_OFFSET..AGG_CONF_OFFSET + 8].copy_from_slice(&feed.conf.to_le_bytes());
    data[AGG_STATUS_OFFSET..AGG_STATUS_OFFSET + 4].copy_from_slice(&status.to_le_bytes());
    data[AGG_PUB_SLOT_OFFSET..AGG_PUB_SLOT_OFFSET + 8]
        .copy_from_slice(&feed.publish_slot.to_le_bytes());
    data
}
