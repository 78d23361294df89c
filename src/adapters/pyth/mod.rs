//! Pyth Oracle Adapter
//!
//! Reads Pyth v2 price accounts through the ledger port and decodes the
//! aggregate price.

mod oracle;

pub use oracle::PythOracle;
