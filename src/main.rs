//! ACID Ledger CLI
//!
//! Seeds a ledger, replays a CSV file of transfers through it, and prints the
//! final balances as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transfers.csv > balances.csv
//! cargo run -- --seed seed.csv --isolation delegated transfers.csv
//! cargo run -- --strategy async --max-concurrent 8 --lock-timeout-ms 200 transfers.csv
//! RUST_LOG=debug cargo run -- --inject-fault after-debit transfers.csv
//! ```
//!
//! Balances go to stdout; logs go to stderr (`RUST_LOG`, default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success (individual transfers may still have rolled back)
//! - 1: Fatal error (file not found, unreadable seed, output failure)

use acid_ledger::cli::{self, CliArgs, StrategyType};
use acid_ledger::core::TransferEngine;
use acid_ledger::io::read_seed_file;
use acid_ledger::strategy;
use acid_ledger::LedgerError;
use rust_decimal::Decimal;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), LedgerError> {
    let engine = TransferEngine::new(args.to_engine_config());

    match &args.seed_file {
        Some(path) => engine.seed(read_seed_file(path)?)?,
        None => engine.seed([
            ("Alice", Decimal::new(500, 0)),
            ("Bob", Decimal::new(300, 0)),
        ])?,
    }

    let strategy = {
        let config = if matches!(args.strategy, StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let engine = Arc::new(engine);
    let mut output = std::io::stdout();
    let summary = strategy.process(Arc::clone(&engine), &args.transfers_file, &mut output)?;

    tracing::info!(
        isolation = %engine.strategy(),
        total = %engine.total_balance(),
        "{}",
        summary
    );
    Ok(())
}
