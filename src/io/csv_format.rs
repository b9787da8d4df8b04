//! CSV format handling for seed files, transfer files and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CsvSeedRecord` and `CsvTransferRecord` structures for deserialization
//! - Conversion from CSV records to domain types
//! - Balance output serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Formats
//!
//! ```text
//! seed file        transfer file       balances output
//! account,balance  from,to,amount      account,balance
//! Alice,500        Alice,Bob,100       Alice,400.0000
//! Bob,300          Alice,Bob,600       Bob,400.0000
//! ```

use crate::types::{Account, AccountName, LedgerError, TransferRecord};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Seed file row
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvSeedRecord {
    pub account: String,
    pub balance: String,
}

/// Transfer file row
///
/// The amount is kept as text so that a bad amount is reported as a
/// conversion error with the offending value, not as a serde failure.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvTransferRecord {
    pub from: String,
    pub to: String,
    pub amount: Option<String>,
}

fn parse_amount(raw: Option<&str>, what: &str) -> Result<Decimal, LedgerError> {
    match raw.map(str::trim) {
        Some(text) if !text.is_empty() => Decimal::from_str(text)
            .map_err(|_| LedgerError::parse_error(None, format!("Invalid {} '{}'", what, text))),
        _ => Err(LedgerError::parse_error(None, format!("Missing {}", what))),
    }
}

/// Convert a CsvTransferRecord to a TransferRecord
///
/// Only the amount is checked here. Account names are passed through
/// untouched (beyond trimming) so that the engine reports bad names as
/// validation failures.
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// * `Ok(TransferRecord)` - Successfully converted record
/// * `Err(LedgerError::ParseError)` - Amount missing or not a decimal
pub fn convert_transfer_record(csv_record: CsvTransferRecord) -> Result<TransferRecord, LedgerError> {
    let amount = parse_amount(csv_record.amount.as_deref(), "amount")?;

    Ok(TransferRecord {
        from: csv_record.from.trim().to_string(),
        to: csv_record.to.trim().to_string(),
        amount,
    })
}

/// Convert a CsvSeedRecord to an `(account, balance)` pair
///
/// Negative balances and duplicate names are left for `TransferEngine::seed`
/// to reject.
pub fn convert_seed_record(csv_record: CsvSeedRecord) -> Result<(AccountName, Decimal), LedgerError> {
    let balance = parse_amount(Some(&csv_record.balance), "balance")?;

    Ok((csv_record.account.trim().to_string(), balance))
}

/// Write account balances to CSV format
///
/// Writes accounts with columns `account,balance`, sorted by account name
/// for deterministic output, balances with four decimal places.
///
/// # Arguments
///
/// * `accounts` - Slice of accounts to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(LedgerError::IoError)` if a write error occurred
pub fn write_balances_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["account", "balance"])
        .map_err(|e| io_error("Failed to write CSV header", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.name.cmp(&b.name));

    for account in sorted_accounts {
        writer
            .write_record([account.name.clone(), format!("{:.4}", account.balance)])
            .map_err(|e| io_error("Failed to write balance record", e))?;
    }

    writer.flush()?;

    Ok(())
}

fn io_error(context: &str, error: csv::Error) -> LedgerError {
    LedgerError::IoError {
        message: format!("{}: {}", context, error),
    }
}
