//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `sync_reader` - Synchronous transfer iterator and seed file reader
//! - `async_reader` - Asynchronous transfer reader with batch interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{
    convert_seed_record, convert_transfer_record, write_balances_csv, CsvSeedRecord,
    CsvTransferRecord,
};
pub use sync_reader::{read_seed_file, SyncReader};
