//! Asynchronous transfer file reader
//!
//! Provides batch reading over transfer records for the async processing
//! strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures `AsyncRead`, so tokio files are adapted with `tokio-util` compat
//! - Batch reading, so the caller can fan each batch out to worker tasks
//!
//! ```text
//! CSV file → AsyncReader → Batches of TransferRecords
//!                 ↓
//!          csv_format module
//!   (CsvTransferRecord, convert_transfer_record)
//! ```
//!
//! Rows that fail to parse are logged and skipped; the number skipped is
//! available from `malformed()`.

use crate::io::csv_format::{convert_transfer_record, CsvTransferRecord};
use crate::types::TransferRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
    malformed: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
            malformed: 0,
        }
    }

    /// Read a batch of transfer records
    ///
    /// Reads up to `batch_size` valid records. Invalid rows are logged and
    /// skipped without counting toward the batch size.
    ///
    /// # Returns
    ///
    /// A vector of successfully converted records. Returns an empty vector
    /// when the end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransferRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvTransferRecord>();

        while batch.len() < batch_size {
            let next = match records.next().await {
                Some(next) => next,
                None => break,
            };
            self.line_num += 1;

            match next {
                Ok(csv_record) => match convert_transfer_record(csv_record) {
                    Ok(record) => batch.push(record),
                    Err(e) => {
                        self.malformed += 1;
                        tracing::warn!(line = self.line_num, error = %e, "skipping transfer record");
                    }
                },
                Err(e) => {
                    self.malformed += 1;
                    tracing::warn!(line = self.line_num, error = %e, "skipping unparseable row");
                }
            }
        }

        batch
    }

    /// Rows skipped so far because they could not be parsed
    pub fn malformed(&self) -> usize {
        self.malformed
    }
}
