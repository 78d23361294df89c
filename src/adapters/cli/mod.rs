//! CLI Adapter
//!
//! Command-line interface for the Aurora agent.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    execute, BalanceCmd, CliApp, Command, LendCmd, PriceCmd, StakeCmd, TradeCmd,
};
