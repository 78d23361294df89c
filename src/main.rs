//! Aurora - Solana agent operations CLI

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use aurora::adapters::cli::{self, CliApp};

#[tokio::main]
async fn main() -> ExitCode {
    let app = CliApp::parse();

    if let Err(e) = init_logging(app.verbose, app.debug) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match cli::execute(app).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `--debug` and `--verbose` win over `RUST_LOG`; default is warn
fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
