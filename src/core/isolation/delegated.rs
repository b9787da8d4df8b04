//! Delegated isolation
//!
//! Each scope is a transaction on a `TransactionalStore` opened at the
//! configured isolation level. Anomaly detection belongs to the store; this
//! controller only maps the store's verdict onto the scope protocol.
//! Conflicts are surfaced to the caller and never retried here.

use super::store::{IsolationLevel, StoreTransaction, TransactionalStore};
use crate::core::traits::{ConcurrencyController, IsolationScope, IsolationStrategy};
use crate::types::{Account, LedgerError};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Controller delegating isolation to a transactional store
#[derive(Debug)]
pub struct DelegatedIsolationController<S> {
    store: Arc<S>,
    level: IsolationLevel,
}

impl<S: TransactionalStore> DelegatedIsolationController<S> {
    pub fn new(store: Arc<S>, level: IsolationLevel) -> Self {
        Self { store, level }
    }

    /// The isolation level every scope is opened at
    pub fn level(&self) -> IsolationLevel {
        self.level
    }
}

impl<S: TransactionalStore> ConcurrencyController for DelegatedIsolationController<S> {
    fn strategy(&self) -> IsolationStrategy {
        IsolationStrategy::DelegatedIsolation
    }

    fn acquire(&self) -> Result<Box<dyn IsolationScope + '_>, LedgerError> {
        tracing::debug!(level = %self.level, "store transaction begun");

        Ok(Box::new(DelegatedScope {
            txn: self.store.begin(self.level),
        }))
    }
}

/// Scope wrapping one open store transaction
///
/// Dropping the scope drops the store transaction, which discards its
/// buffered writes.
struct DelegatedScope<'a> {
    txn: Box<dyn StoreTransaction + 'a>,
}

impl IsolationScope for DelegatedScope<'_> {
    fn balance(&mut self, name: &str) -> Result<Decimal, LedgerError> {
        self.txn.read(name)
    }

    fn account(&mut self, name: &str) -> Result<Account, LedgerError> {
        self.txn.read_account(name)
    }

    fn set_balance(&mut self, name: &str, balance: Decimal) -> Result<(), LedgerError> {
        self.txn.write(name, balance)
    }

    // Buffered writes never reach the ledger before commit, so putting the
    // original balance back into the buffer is enough
    fn restore(&mut self, account: &Account) -> Result<(), LedgerError> {
        self.txn.write(&account.name, account.balance)
    }

    fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let result = self.txn.commit();
        match &result {
            Ok(()) => tracing::debug!("store transaction committed"),
            Err(e) => tracing::debug!(error = %e, "store transaction rejected at commit"),
        }
        result
    }

    fn rollback(self: Box<Self>) {
        self.txn.rollback();
        tracing::debug!("store transaction rolled back");
    }
}
