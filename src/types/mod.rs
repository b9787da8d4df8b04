//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account state and identifiers
//! - `transfer`: Transfer requests and records, outcomes and fault points
//! - `error`: Error types for the ledger

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountName};
pub use error::LedgerError;
pub use transfer::{FaultPoint, TransferOutcome, TransferRecord, TransferRequest};
