//! Application Layer - The agent-facing engine
//!
//! Wires the ports together into the price, balance, trade, stake and lend
//! operations.

pub mod engine;
pub mod error;
pub mod instructions;

pub use engine::{AuroraEngine, EngineOptions, StakeReceipt};
pub use error::{EngineError, ErrorKind};
