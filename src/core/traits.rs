//! Core traits for isolation control
//!
//! This module defines the seam between the transfer algorithm and the
//! concurrency policy. A `TransferTransaction` only ever talks to an
//! `IsolationScope`; which controller produced that scope decides how
//! concurrent transfers are kept apart.

use crate::types::{Account, LedgerError};
use rust_decimal::Decimal;
use std::fmt;

/// The concurrency-control strategies a controller can implement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationStrategy {
    /// One process-wide lock around the whole ledger (serializable)
    ExclusiveLock,

    /// Per-transaction scope delegated to a transactional store
    DelegatedIsolation,
}

impl fmt::Display for IsolationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsolationStrategy::ExclusiveLock => write!(f, "exclusive-lock"),
            IsolationStrategy::DelegatedIsolation => write!(f, "delegated-isolation"),
        }
    }
}

/// A window of isolated access to the ledger
///
/// Scopes are released exactly once: either through `commit`, through
/// `rollback`, or by being dropped (which behaves like `rollback`).
pub trait IsolationScope {
    /// Read the balance of an account as seen by this scope
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts and `Conflict` when the
    /// scope can no longer serve a consistent read.
    fn balance(&mut self, name: &str) -> Result<Decimal, LedgerError>;

    /// Read the full account state (balance and version) as seen by this
    /// scope
    fn account(&mut self, name: &str) -> Result<Account, LedgerError>;

    /// Write the balance of an account within this scope
    fn set_balance(&mut self, name: &str, balance: Decimal) -> Result<(), LedgerError>;

    /// Put an account back to a state previously read through `account`
    ///
    /// Undoes this scope's writes to that account without counting as a new
    /// modification.
    fn restore(&mut self, account: &Account) -> Result<(), LedgerError>;

    /// Make every write of this scope durable and visible, then release it
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a concurrent transaction committed first. The
    /// scope's writes are discarded in that case.
    fn commit(self: Box<Self>) -> Result<(), LedgerError>;

    /// Release the scope without publishing anything it has not already
    /// written through
    fn rollback(self: Box<Self>);
}

/// Hands out isolation scopes to transactions
///
/// Both strategies honor the same contract: no two transactions may observe
/// or produce an interleaved mutation of the same account pair, and once a
/// scope's `commit` returns, its writes are visible to every later scope.
pub trait ConcurrencyController: Send + Sync {
    /// Which strategy this controller implements
    fn strategy(&self) -> IsolationStrategy;

    /// Open an isolation scope for one transaction
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if the scope cannot be obtained within the
    /// configured wait.
    fn acquire(&self) -> Result<Box<dyn IsolationScope + '_>, LedgerError>;
}
