//! Processing strategies for replaying transfer files
//!
//! This module defines the Strategy pattern for the complete replay pipeline:
//! read transfer records from a CSV file, submit each to a `TransferEngine`,
//! and write the final balances. Implementations (sequential, concurrent
//! batches) are selected at runtime.

use crate::cli::StrategyType;
use crate::core::TransferEngine;
use crate::types::{LedgerError, TransferOutcome};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Counts of what happened to the records of one input file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Transfers that committed
    pub committed: usize,
    /// Transfers that rolled back, for any reason
    pub rolled_back: usize,
    /// Subset of `rolled_back` whose reason is retryable (conflict, timeout)
    pub retryable: usize,
    /// Transfers submitted whose task died before reporting an outcome
    pub failed: usize,
    /// Rows that could not be parsed and never reached the engine
    pub malformed: usize,
}

impl ProcessingSummary {
    /// Tally one transfer outcome
    pub fn record(&mut self, outcome: &TransferOutcome) {
        match outcome.reason() {
            None => self.committed += 1,
            Some(reason) => {
                self.rolled_back += 1;
                if reason.is_retryable() {
                    self.retryable += 1;
                }
            }
        }
    }

    /// Tally a transfer whose outcome was lost
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of transfers submitted to the engine
    pub fn submitted(&self) -> usize {
        self.committed + self.rolled_back + self.failed
    }
}

impl fmt::Display for ProcessingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} committed, {} rolled back ({} retryable), {} failed, {} malformed",
            self.committed, self.rolled_back, self.retryable, self.failed, self.malformed
        )
    }
}

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay transfers from `input_path` through `engine` and write balances
    ///
    /// # Arguments
    ///
    /// * `engine` - A seeded engine; shared so strategies can fan out
    /// * `input_path` - Path to the transfer CSV file
    /// * `output` - Writer receiving the final balances as CSV
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions: the input file cannot be
    /// opened, or output cannot be written. Rolled back transfers and
    /// malformed rows are logged, counted in the summary, and processing
    /// continues with the next record.
    fn process(
        &self,
        engine: Arc<TransferEngine>,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingSummary, LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config.unwrap_or_default())),
    }
}
