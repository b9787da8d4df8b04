//! ACID Ledger Library
//! # Overview
//!
//! This library provides an in-process transactional ledger that moves funds
//! between named accounts with atomicity, consistency, isolation and
//! durability guarantees under concurrent access, plus a CSV-driven replay
//! pipeline with both sync and async strategies.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, TransferRequest, LedgerError, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::ledger`] - Authoritative balances, no isolation policy
//!   - [`core::isolation`] - Exclusive-lock and delegated-isolation controllers
//!   - [`core::transaction`] - One transfer as an all-or-nothing unit
//!   - [`core::engine`] - The `seed` / `transfer` / `balance` facade
//! - [`io`] - CSV readers and the balances writer
//! - [`strategy`] - Sequential and concurrent replay of transfer files
//! - [`cli`] - CLI arguments parsing
//!
//! # Transfer Lifecycle
//!
//! 1. The request is validated (non-empty names, distinct accounts, positive
//!    amount)
//! 2. An isolation scope is acquired from the configured controller
//! 3. Both balances are read and the debited account is checked for funds
//! 4. The debit and the credit are written
//! 5. The scope commits, or the pre-transfer balances are restored and the
//!    scope is released
//!
//! The outcome is always a value: `TransferOutcome::Committed` or
//! `TransferOutcome::RolledBack { reason }`.
//!
//! # Example
//!
//! ```
//! use acid_ledger::{EngineConfig, TransferEngine};
//! use rust_decimal::Decimal;
//!
//! let engine = TransferEngine::new(EngineConfig::default());
//! engine
//!     .seed([("Alice", Decimal::new(500, 0)), ("Bob", Decimal::new(300, 0))])
//!     .unwrap();
//!
//! assert!(engine.transfer("Alice", "Bob", Decimal::new(100, 0)).is_committed());
//! assert!(!engine.transfer("Alice", "Bob", Decimal::new(600, 0)).is_committed());
//! assert_eq!(engine.balance("Alice").unwrap(), Decimal::new(400, 0));
//! assert_eq!(engine.balance("Bob").unwrap(), Decimal::new(400, 0));
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{
    ConcurrencyController, EngineConfig, IsolationLevel, IsolationStrategy, Ledger,
    TransferEngine,
};
pub use io::write_balances_csv;
pub use types::{
    Account, AccountName, FaultPoint, LedgerError, TransferOutcome, TransferRecord,
    TransferRequest,
};
