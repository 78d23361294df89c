//! Known Addresses
//!
//! Constant tables for token mints, Pyth price feeds, lending pools and the
//! Solana programs the façade builds instructions for. All tables are
//! read-only and looked up by helper functions below.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Native SOL mint (wrapped SOL)
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// USD Coin mint
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// SPL Token Program
pub const SPL_TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Associated Token Account Program
pub const ATA_PROGRAM: &str = "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL";

/// Solend (SPL token-lending) main pool program
pub const SOLEND_PROGRAM: &str = "So1endDq2YkqhipRh3WViPa8hdiSpxWy6z3Z6tMCpAo";

/// Opcode of the token-lending DepositReserveLiquidity instruction
pub const LEND_DEPOSIT_OPCODE: u8 = 4;

/// Pyth mainnet price feed accounts, keyed by pair symbol
pub const PRICE_FEEDS: &[(&str, &str)] = &[
    // SOL/USD
    ("SOL/USD", "H6ARHf6YXhGYeQfUzQNGk6rDNnLBQKrenN712K4AQJEG"),
    // USDC/USD
    ("USDC/USD", "Gnt27xtC473ZT2Mw5u8wZ68Z3gULkSTb5DuxJy7eJotD"),
    // BTC/USD
    ("BTC/USD", "GVXRSBjFk6e6J3NbVPXohDJetcTjaeeuykUpbQF8UoMU"),
];

/// Token symbols the CLI accepts in place of a mint address
pub const TOKEN_SYMBOLS: &[(&str, &str, u8)] = &[
    ("SOL", SOL_MINT, 9),
    ("USDC", USDC_MINT, 6),
];

/// A lending pool a token can be deposited into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendingPool {
    /// Mint of the token the pool accepts
    pub token_mint: &'static str,
    /// Lending program owning the reserve
    pub program_id: &'static str,
    /// Reserve account receiving the deposit
    pub reserve: &'static str,
}

/// Lending pools, keyed by token mint
pub const LENDING_POOLS: &[LendingPool] = &[
    // Solend main pool USDC reserve
    LendingPool {
        token_mint: USDC_MINT,
        program_id: SOLEND_PROGRAM,
        reserve: "BgxfHJDzm44T7XG68MYKx7YisTjZu73tVovyZSjJMpmw",
    },
    // Solend main pool SOL reserve
    LendingPool {
        token_mint: SOL_MINT,
        program_id: SOLEND_PROGRAM,
        reserve: "8PbodeaosQP19SjYFx855UMqWxH2HynZLdBXmsrbac36",
    },
];

/// Feed address for a pair symbol.
///
/// Matching is case-insensitive and accepts `_` in place of `/`
/// (`sol_usd` finds `SOL/USD`).
pub fn price_feed_address(symbol: &str) -> Option<&'static str> {
    let normalized = symbol.trim().to_ascii_uppercase().replace('_', "/");
    PRICE_FEEDS
        .iter()
        .find(|(pair, _)| *pair == normalized)
        .map(|(_, address)| *address)
}

/// Lending pool for a token mint
pub fn lending_pool(token_mint: &str) -> Option<&'static LendingPool> {
    LENDING_POOLS.iter().find(|pool| pool.token_mint == token_mint)
}

/// Decimals of a mint in the static symbol table
pub fn known_decimals(mint: &str) -> Option<u8> {
    TOKEN_SYMBOLS
        .iter()
        .find(|(_, m, _)| *m == mint)
        .map(|(_, _, decimals)| *decimals)
}

/// Resolve a CLI token argument: a known symbol or a mint address
pub fn resolve_mint(token: &str) -> String {
    let upper = token.trim().to_ascii_uppercase();
    TOKEN_SYMBOLS
        .iter()
        .find(|(symbol, _, _)| *symbol == upper)
        .map(|(_, mint, _)| mint.to_string())
        .unwrap_or_else(|| token.trim().to_string())
}

/// Parse a table constant; constants are checked by tests below
pub fn parse_pubkey(address: &str) -> Option<Pubkey> {
    Pubkey::from_str(address).ok()
}

/// Associated token account of `owner` for `mint` under the SPL token program
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Option<Pubkey> {
    let token_program = parse_pubkey(SPL_TOKEN_PROGRAM)?;
    let ata_program = parse_pubkey(ATA_PROGRAM)?;
    let (address, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ata_program,
    );
    Some(address)
}
