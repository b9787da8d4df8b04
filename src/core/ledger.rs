//! Ledger storage module
//!
//! This module provides the `Ledger` struct, the authoritative mapping from
//! account name to account state.
//!
//! # Design
//!
//! The ledger is a pure storage primitive. It uses `DashMap` so that it can be
//! shared between threads without data races, but it enforces no isolation
//! policy of its own: two transfers writing through a bare `Ledger` can
//! interleave freely. Isolation is owned entirely by the concurrency
//! controllers in `core::isolation`, and every mutation must happen inside a
//! scope acquired from one of them.
//!
//! Unknown accounts are reported as `None` rather than as a zero balance, so
//! that "not found" and "empty" stay distinguishable.

use crate::types::{Account, AccountName};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Authoritative account store
#[derive(Debug, Default)]
pub struct Ledger {
    /// Map of account names to account states
    accounts: DashMap<AccountName, Account>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Get the balance of an account, or `None` if it does not exist
    pub fn balance(&self, name: &str) -> Option<Decimal> {
        self.accounts.get(name).map(|account| account.balance)
    }

    /// Get a copy of the full account state (balance and version)
    pub fn account(&self, name: &str) -> Option<Account> {
        self.accounts.get(name).map(|account| account.value().clone())
    }

    /// Overwrite the balance of an account
    ///
    /// Inserts the account at version 0 if it does not exist yet, otherwise
    /// replaces the balance and bumps the version counter. No validation is
    /// performed; callers must hold an isolation scope.
    pub fn set_balance(&self, name: &str, balance: Decimal) {
        self.accounts
            .entry(name.to_string())
            .and_modify(|account| {
                account.balance = balance;
                account.version += 1;
            })
            .or_insert_with(|| Account::new(name, balance));
    }

    /// Reinstate a previously captured account state, version included
    ///
    /// Used to undo writes made under the exclusive lock, so the undo does
    /// not register as a modification.
    pub fn restore(&self, account: Account) {
        self.accounts.insert(account.name.clone(), account);
    }

    /// Check whether an account exists
    pub fn account_exists(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Get all accounts sorted by name
    ///
    /// The returned vector is a point-in-time copy. When taken outside an
    /// isolation scope it may reflect a transfer that is still in flight, so
    /// it is only suitable for reporting.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        accounts
    }

    /// Sum of all balances
    pub fn total(&self) -> Decimal {
        self.accounts
            .iter()
            .map(|entry| entry.value().balance)
            .sum()
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
