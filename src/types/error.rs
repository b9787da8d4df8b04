//! Error types for the ACID ledger
//!
//! This module defines every failure that can occur while seeding the ledger,
//! running a transfer, or reading and writing CSV files.
//!
//! # Error Categories
//!
//! - **Request Errors**: malformed transfer requests, never touch the ledger
//! - **Business Rule Errors**: unknown accounts, insufficient funds, overflow
//! - **Isolation Errors**: delegated-store conflicts, lock timeouts (retryable)
//! - **Fault Injection**: deliberately forced failures used to exercise rollback
//! - **File I/O Errors**: file not found, CSV parse failures, etc.

use super::transfer::FaultPoint;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
///
/// Transfer-path variants are never returned as `Err` from a transfer; they
/// are carried inside `TransferOutcome::RolledBack` so that the caller always
/// receives a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed transfer request or seed data
    #[error("Invalid request: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The named account was never seeded
    #[error("Account '{name}' not found")]
    AccountNotFound {
        /// The unknown account name
        name: String,
    },

    /// The debited account cannot cover the transfer
    #[error("Insufficient funds in '{account}': available {available}, requested {requested}")]
    InsufficientFunds {
        /// Debited account
        account: String,
        /// Balance at snapshot time
        available: Decimal,
        /// Requested transfer amount
        requested: Decimal,
    },

    /// A failure forced by a fault injection hook
    #[error("Injected fault {point}")]
    InjectedFault {
        /// Where in the transfer the fault fired
        point: FaultPoint,
    },

    /// The delegated store detected a concurrent write to the same account
    ///
    /// Only produced by the delegated isolation strategy. Safe to retry.
    #[error("Commit conflict on account '{account}': modified by a concurrent transaction")]
    Conflict {
        /// The account whose version changed underneath the transaction
        account: String,
    },

    /// The exclusive lock could not be acquired within the configured wait
    ///
    /// Safe to retry.
    #[error("Timed out after {waited_ms}ms waiting for the ledger lock")]
    LockTimeout {
        /// How long the transaction waited
        waited_ms: u64,
    },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account '{account}'")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account being updated
        account: String,
    },

    /// The ledger may only be seeded once
    #[error("Ledger has already been seeded")]
    AlreadySeeded,

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation {
            message: message.into(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(name: &str) -> Self {
        LedgerError::AccountNotFound {
            name: name.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            available,
            requested,
        }
    }

    /// Create an InjectedFault error
    pub fn injected_fault(point: FaultPoint) -> Self {
        LedgerError::InjectedFault { point }
    }

    /// Create a Conflict error
    pub fn conflict(account: &str) -> Self {
        LedgerError::Conflict {
            account: account.to_string(),
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(waited_ms: u64) -> Self {
        LedgerError::LockTimeout { waited_ms }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    /// Create a ParseError
    pub fn parse_error(line: Option<u64>, message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        LedgerError::FileNotFound { path: path.into() }
    }

    /// Whether the failure came from contention rather than the request itself
    ///
    /// A caller may resubmit a transfer rolled back for a retryable reason;
    /// business-rule and validation failures will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Conflict { .. } | LedgerError::LockTimeout { .. }
        )
    }
}
