//! Asynchronous batch processing strategy
//!
//! Replays a transfer file with many transfers in flight at once, which is
//! how the ledger's isolation guarantees get exercised under real contention.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent)
//!     ├── AsyncReader (batch CSV reading)
//!     └── per batch: spawn_blocking(TransferEngine::transfer) × N
//!                    bounded by buffer_unordered(max_concurrent)
//! ```
//!
//! # Ordering
//!
//! Batches are processed one after another, but transfers inside a batch
//! run concurrently and complete in any order. Inputs whose result depends
//! on the relative order of two transfers in the same batch are therefore
//! nondeterministic; the ledger still guarantees every committed transfer
//! was applied atomically and the total is conserved.
//!
//! Transfers block (lock waits, processing delay), so they run on tokio's
//! blocking pool rather than on the async worker threads.

use crate::core::TransferEngine;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{ProcessingStrategy, ProcessingSummary};
use crate::types::{LedgerError, TransferOutcome};
use futures::stream::{self, StreamExt};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinError;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of transfer records read per batch
    pub batch_size: usize,
    /// Maximum number of transfers in flight at once
    pub max_concurrent: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size,
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent = if max_concurrent == 0 {
            tracing::warn!(
                "Invalid max_concurrent ({}), using default ({})",
                max_concurrent,
                default.max_concurrent
            );
            default.max_concurrent
        } else {
            max_concurrent
        };

        Self {
            batch_size,
            max_concurrent,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    async fn run(
        &self,
        engine: Arc<TransferEngine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingSummary, LedgerError> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LedgerError::file_not_found(input_path.display().to_string()),
                _ => LedgerError::IoError {
                    message: format!("Failed to open file '{}': {}", input_path.display(), e),
                },
            })?;

        // csv-async reads through futures::io, tokio files need the compat layer
        let mut reader = AsyncReader::new(file.compat());
        let mut summary = ProcessingSummary::default();

        loop {
            let batch = reader.read_batch(self.config.batch_size).await;
            if batch.is_empty() {
                break;
            }
            tracing::debug!(records = batch.len(), "processing batch");

            let results: Vec<_> = stream::iter(batch)
                .map(|record| {
                    let engine = Arc::clone(&engine);
                    tokio::task::spawn_blocking(move || {
                        engine.transfer(&record.from, &record.to, record.amount)
                    })
                })
                .buffer_unordered(self.config.max_concurrent)
                .collect()
                .await;

            for result in results {
                tally(&mut summary, result);
            }
        }

        summary.malformed = reader.malformed();
        write_balances_csv(&engine.accounts(), output)?;

        Ok(summary)
    }
}

/// Count one finished transfer task, including tasks that panicked
fn tally(summary: &mut ProcessingSummary, result: Result<TransferOutcome, JoinError>) {
    match result {
        Ok(outcome) => summary.record(&outcome),
        Err(e) => {
            tracing::error!(error = %e, "transfer task failed");
            summary.record_failure();
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay the file on a dedicated multi-threaded tokio runtime
    ///
    /// # Errors
    ///
    /// Fatal errors (runtime creation, file not found, output I/O) are
    /// returned immediately. Individual transfer failures are counted in the
    /// summary and processing continues.
    fn process(
        &self,
        engine: Arc<TransferEngine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingSummary, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent)
            .max_blocking_threads(self.config.max_concurrent)
            .build()
            .map_err(|e| LedgerError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(self.run(engine, input_path, output))
    }
}
