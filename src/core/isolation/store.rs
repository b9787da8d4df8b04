//! Transactional store used by the delegated isolation strategy
//!
//! The delegated controller does not isolate transfers itself; it opens a
//! transaction on a `TransactionalStore` at a named isolation level and lets
//! the store detect anomalies. `VersionedStore` is the in-process store the
//! crate ships, built over the `Ledger`.
//!
//! # Semantics
//!
//! - Reads are cached per transaction, so reading the same account twice
//!   always returns the same value (repeatable read).
//! - Writes are buffered and only reach the ledger at commit.
//! - Commit takes a store-wide commit lock and compares the current version
//!   of each validated account with the version the transaction observed.
//!   Any mismatch means another transaction committed first; the loser gets
//!   `Conflict` and its writes are discarded (first committer wins).
//! - At `RepeatableRead` only written accounts are validated, so two
//!   transactions writing disjoint accounts can both commit even if each
//!   read the other's account (write skew). `Serializable` validates every
//!   account read as well and rejects that schedule.

use crate::core::ledger::Ledger;
use crate::types::{Account, LedgerError};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Isolation level requested from a transactional store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    /// Stable reads, write-write conflicts detected; write skew possible
    #[default]
    RepeatableRead,

    /// Read set validated too; no write skew
    Serializable,
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsolationLevel::RepeatableRead => write!(f, "repeatable-read"),
            IsolationLevel::Serializable => write!(f, "serializable"),
        }
    }
}

/// A store able to run isolated transactions
pub trait TransactionalStore: Send + Sync {
    /// Begin a transaction at the given isolation level
    fn begin(&self, level: IsolationLevel) -> Box<dyn StoreTransaction + '_>;
}

/// An open transaction on a `TransactionalStore`
pub trait StoreTransaction {
    /// Read an account balance
    fn read(&mut self, name: &str) -> Result<Decimal, LedgerError>;

    /// Read an account with the version this transaction observed for it
    fn read_account(&mut self, name: &str) -> Result<Account, LedgerError>;

    /// Buffer a balance write
    fn write(&mut self, name: &str, balance: Decimal) -> Result<(), LedgerError>;

    /// Validate and publish buffered writes
    fn commit(self: Box<Self>) -> Result<(), LedgerError>;

    /// Discard buffered writes
    fn rollback(self: Box<Self>);
}

/// In-process versioned store over a `Ledger`
#[derive(Debug)]
pub struct VersionedStore {
    ledger: Arc<Ledger>,
    /// Serializes validation and publication of commits
    commit_lock: Mutex<()>,
}

impl VersionedStore {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            commit_lock: Mutex::new(()),
        }
    }

    /// The ledger this store publishes to
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }
}

impl TransactionalStore for VersionedStore {
    fn begin(&self, level: IsolationLevel) -> Box<dyn StoreTransaction + '_> {
        Box::new(VersionedTransaction {
            store: self,
            level,
            reads: HashMap::new(),
            writes: HashMap::new(),
        })
    }
}

/// Balance and version observed by a transaction
#[derive(Debug, Clone, Copy)]
struct Observed {
    balance: Decimal,
    version: u64,
}

struct VersionedTransaction<'a> {
    store: &'a VersionedStore,
    level: IsolationLevel,
    reads: HashMap<String, Observed>,
    writes: HashMap<String, Decimal>,
}

impl VersionedTransaction<'_> {
    /// Observe an account, caching the first observation
    fn observe(&mut self, name: &str) -> Result<Observed, LedgerError> {
        if let Some(observed) = self.reads.get(name) {
            return Ok(*observed);
        }

        let account = self
            .store
            .ledger
            .account(name)
            .ok_or_else(|| LedgerError::account_not_found(name))?;
        let observed = Observed {
            balance: account.balance,
            version: account.version,
        };
        self.reads.insert(name.to_string(), observed);
        Ok(observed)
    }

    /// Check that `name` still has the version this transaction observed
    fn validate(&self, name: &str, observed: Observed) -> Result<(), LedgerError> {
        let current = self
            .store
            .ledger
            .account(name)
            .ok_or_else(|| LedgerError::account_not_found(name))?;

        if current.version != observed.version {
            tracing::debug!(
                account = name,
                observed = observed.version,
                current = current.version,
                "write conflict detected"
            );
            return Err(LedgerError::conflict(name));
        }
        Ok(())
    }
}

impl StoreTransaction for VersionedTransaction<'_> {
    fn read(&mut self, name: &str) -> Result<Decimal, LedgerError> {
        if let Some(balance) = self.writes.get(name) {
            return Ok(*balance);
        }
        self.observe(name).map(|observed| observed.balance)
    }

    fn read_account(&mut self, name: &str) -> Result<Account, LedgerError> {
        let observed = self.observe(name)?;
        let balance = self.writes.get(name).copied().unwrap_or(observed.balance);
        Ok(Account {
            name: name.to_string(),
            balance,
            version: observed.version,
        })
    }

    fn write(&mut self, name: &str, balance: Decimal) -> Result<(), LedgerError> {
        // Blind writes still need a version to validate against
        self.observe(name)?;
        self.writes.insert(name.to_string(), balance);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        if self.writes.is_empty() && self.level == IsolationLevel::RepeatableRead {
            return Ok(());
        }

        let _commit = self.store.commit_lock.lock();

        // Sorted for a deterministic conflict report
        let mut validated: Vec<&String> = match self.level {
            IsolationLevel::RepeatableRead => self.writes.keys().collect(),
            IsolationLevel::Serializable => self.reads.keys().collect(),
        };
        validated.sort();

        for name in validated {
            if let Some(observed) = self.reads.get(name) {
                self.validate(name, *observed)?;
            }
        }

        for (name, balance) in &self.writes {
            self.store.ledger.set_balance(name, *balance);
        }

        Ok(())
    }

    fn rollback(self: Box<Self>) {}
}
