//! Synchronous CSV readers
//!
//! Provides a streaming iterator over transfer records and an eager reader
//! for seed files. Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! `SyncReader` uses csv::Reader to read and deserialize transfer rows one at
//! a time, so memory use stays constant regardless of file size. Seed files
//! are small and must be applied as a whole, so `read_seed_file` loads them
//! eagerly and fails on the first bad row.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual transfer row errors are yielded as `Err` items; iteration
//!   continues with the next row
//! - Line numbers are included in parse errors for debugging

use crate::io::csv_format::{
    convert_seed_record, convert_transfer_record, CsvSeedRecord, CsvTransferRecord,
};
use crate::types::{AccountName, LedgerError, TransferRecord};
use csv::{ReaderBuilder, Trim};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

fn open(path: &Path) -> Result<csv::Reader<File>, LedgerError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LedgerError::file_not_found(path.display().to_string()),
        _ => LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), e),
        },
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Attach the file line number to an error produced while converting a row
fn at_line(error: LedgerError, line: u64) -> LedgerError {
    match error {
        LedgerError::ParseError { line: None, message } => LedgerError::parse_error(Some(line), message),
        other => other,
    }
}

/// Synchronous transfer file reader
///
/// Provides an iterator interface over transfer records.
///
/// # Examples
///
/// ```no_run
/// use acid_ledger::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("transfers.csv")).unwrap();
/// let records: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} records", records.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl SyncReader {
    /// Open a transfer file for streaming iteration
    ///
    /// The CSV reader trims whitespace from all fields and allows rows with a
    /// missing amount column (reported per row rather than aborting).
    ///
    /// # Errors
    ///
    /// * `FileNotFound` if nothing exists at `path`
    /// * `IoError` if the file exists but cannot be opened
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        Ok(Self {
            reader: open(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TransferRecord, LedgerError>;

    /// Get the next transfer record
    ///
    /// # Returns
    ///
    /// * `Some(Ok(TransferRecord))` - Successfully parsed record
    /// * `Some(Err(LedgerError::ParseError))` - Row could not be parsed
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvTransferRecord>();
        let next = deserializer.next()?;
        self.line_num += 1;

        Some(match next {
            Ok(csv_record) => {
                convert_transfer_record(csv_record).map_err(|e| at_line(e, self.line_num))
            }
            Err(e) => Err(LedgerError::parse_error(Some(self.line_num), e.to_string())),
        })
    }
}

/// Read a whole seed file into `(account, balance)` pairs
///
/// # Errors
///
/// * `FileNotFound` / `IoError` if the file cannot be opened
/// * `ParseError` with the line number of the first bad row
pub fn read_seed_file(path: &Path) -> Result<Vec<(AccountName, Decimal)>, LedgerError> {
    let mut reader = open(path)?;
    let mut accounts = Vec::new();

    for (index, row) in reader.deserialize::<CsvSeedRecord>().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line = index as u64 + 2;
        let csv_record = row.map_err(|e| LedgerError::parse_error(Some(line), e.to_string()))?;
        accounts.push(convert_seed_record(csv_record).map_err(|e| at_line(e, line))?);
    }

    tracing::debug!(path = %path.display(), accounts = accounts.len(), "seed file read");
    Ok(accounts)
}
