//! Domain Layer - Static tables and pure data handling
//!
//! No network access happens here. All external interactions go through the
//! ports layer.
//!
//! - `known_programs`: Token mints, price feeds, lending pools, program ids
//! - `price_account`: Pyth price account decoding
//! - `amounts`: UI amount to base unit conversion

pub mod known_programs;
pub mod price_account;
pub mod amounts;

pub use known_programs::{
    associated_token_address, lending_pool, price_feed_address, resolve_mint, LendingPool,
    LENDING_POOLS, PRICE_FEEDS, SOL_MINT, USDC_MINT,
};
pub use price_account::{parse_price_account, PriceAccountError, PriceFeed, PriceStatus};
pub use amounts::{to_base_units, to_ui_amount, AmountError};
