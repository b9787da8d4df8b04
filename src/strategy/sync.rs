//! Synchronous processing strategy
//!
//! Replays a transfer file one record at a time on the calling thread.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Transfer execution to `TransferEngine`
//! - CSV output to `csv_format::write_balances_csv`
//!
//! Transfers are applied in file order, so the final balances are fully
//! determined by the input. Memory use is O(accounts), not O(records).

use crate::core::TransferEngine;
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use acid_ledger::core::TransferEngine;
/// use acid_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let engine = Arc::new(TransferEngine::default());
/// let mut output = std::io::stdout();
///
/// SyncProcessingStrategy
///     .process(engine, Path::new("transfers.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        engine: Arc<TransferEngine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingSummary, LedgerError> {
        let reader = SyncReader::new(input_path)?;
        let mut summary = ProcessingSummary::default();

        for result in reader {
            match result {
                Ok(record) => {
                    let outcome = engine.transfer(&record.from, &record.to, record.amount);
                    summary.record(&outcome);
                }
                Err(e) => {
                    summary.malformed += 1;
                    tracing::warn!(error = %e, "skipping transfer record");
                }
            }
        }

        write_balances_csv(&engine.accounts(), output)?;

        Ok(summary)
    }
}
