//! Account-related types for the ACID ledger
//!
//! This module defines the Account structure stored by the ledger.

use rust_decimal::Decimal;

/// Account identifier
///
/// Accounts are addressed by a unique, non-empty name.
pub type AccountName = String;

/// Account state
///
/// Holds the balance of a named account together with a modification
/// counter used by the delegated isolation store to detect concurrent writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The unique account name
    pub name: AccountName,

    /// Current balance
    ///
    /// Never negative at any externally observable point.
    pub balance: Decimal,

    /// Number of writes applied to this account since it was seeded
    pub version: u64,
}

impl Account {
    /// Create a new account at version 0
    pub fn new(name: impl Into<AccountName>, balance: Decimal) -> Self {
        Account {
            name: name.into(),
            balance,
            version: 0,
        }
    }
}
