//! Transfer-related types for the ACID ledger
//!
//! This module defines the transfer request value object, the outcome
//! returned to callers, and the fault points used to exercise rollback.

use super::account::AccountName;
use super::error::LedgerError;
use rust_decimal::Decimal;
use std::fmt;

/// A validated request to move `amount` from one account to another
///
/// Instances can only be obtained through [`TransferRequest::new`], so every
/// request that reaches a transaction already satisfies:
/// - both account names are non-empty
/// - `from != to`
/// - `amount > 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    from: AccountName,
    to: AccountName,
    amount: Decimal,
}

impl TransferRequest {
    /// Build a request, rejecting malformed input with a `Validation` error
    pub fn new(
        from: impl Into<AccountName>,
        to: impl Into<AccountName>,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        let from = from.into();
        let to = to.into();

        if from.trim().is_empty() {
            return Err(LedgerError::validation("source account name is empty"));
        }
        if to.trim().is_empty() {
            return Err(LedgerError::validation("destination account name is empty"));
        }
        if from == to {
            return Err(LedgerError::validation(format!(
                "cannot transfer from '{}' to itself",
                from
            )));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::validation(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(TransferRequest { from, to, amount })
    }

    /// Account debited by this transfer
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Account credited by this transfer
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Amount moved
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl fmt::Display for TransferRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.amount)
    }
}

/// A transfer as read from an input file, not yet validated
///
/// Readers only guarantee that the amount parsed as a decimal. Business
/// validation happens when the record is submitted to the engine, so a
/// malformed request is reported as a rolled back transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: AccountName,
    pub to: AccountName,
    pub amount: Decimal,
}

/// Result of a single transfer
///
/// There is no partial-success variant: either both writes are visible or
/// neither is.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    /// Both writes were applied and the isolation scope committed
    Committed {
        /// Balance of the debited account after the transfer
        from_balance: Decimal,
        /// Balance of the credited account after the transfer
        to_balance: Decimal,
    },

    /// The ledger was left exactly as it was before the transfer
    RolledBack {
        /// Why the transfer was rolled back
        reason: LedgerError,
    },
}

impl TransferOutcome {
    /// Create a rolled back outcome
    pub fn rolled_back(reason: LedgerError) -> Self {
        TransferOutcome::RolledBack { reason }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, TransferOutcome::Committed { .. })
    }

    /// The rollback reason, if the transfer did not commit
    pub fn reason(&self) -> Option<&LedgerError> {
        match self {
            TransferOutcome::Committed { .. } => None,
            TransferOutcome::RolledBack { reason } => Some(reason),
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Committed {
                from_balance,
                to_balance,
            } => write!(
                f,
                "committed (from balance {}, to balance {})",
                from_balance, to_balance
            ),
            TransferOutcome::RolledBack { reason } => write!(f, "rolled back: {}", reason),
        }
    }
}

/// Points inside a transfer where a failure can be forced
///
/// Used by tests and the CLI debug flag to drive the rollback path after the
/// ledger has already been partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// After the debit has been written, before the credit
    AfterDebit,

    /// After both writes, before the isolation scope commits
    BeforeCommit,
}

impl fmt::Display for FaultPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultPoint::AfterDebit => write!(f, "after debit"),
            FaultPoint::BeforeCommit => write!(f, "before commit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_valid_request_exposes_fields() {
        let request = TransferRequest::new("Alice", "Bob", Decimal::new(100, 0)).unwrap();

        assert_eq!(request.from(), "Alice");
        assert_eq!(request.to(), "Bob");
        assert_eq!(request.amount(), Decimal::new(100, 0));
        assert_eq!(request.to_string(), "Alice -> Bob (100)");
    }

    #[rstest]
    #[case::empty_from("", "Bob", Decimal::new(10, 0))]
    #[case::blank_to("Alice", "   ", Decimal::new(10, 0))]
    #[case::same_account("Alice", "Alice", Decimal::new(10, 0))]
    #[case::zero_amount("Alice", "Bob", Decimal::ZERO)]
    #[case::negative_amount("Alice", "Bob", Decimal::new(-5, 0))]
    fn test_invalid_requests_are_rejected(
        #[case] from: &str,
        #[case] to: &str,
        #[case] amount: Decimal,
    ) {
        let result = TransferRequest::new(from, to, amount);

        assert!(matches!(result, Err(LedgerError::Validation { .. })));
    }

    #[test]
    fn test_outcome_accessors() {
        let committed = TransferOutcome::Committed {
            from_balance: Decimal::new(400, 0),
            to_balance: Decimal::new(400, 0),
        };
        assert!(committed.is_committed());
        assert!(committed.reason().is_none());

        let rolled_back = TransferOutcome::rolled_back(LedgerError::account_not_found("Carol"));
        assert!(!rolled_back.is_committed());
        assert_eq!(
            rolled_back.reason(),
            Some(&LedgerError::account_not_found("Carol"))
        );
        assert_eq!(
            rolled_back.to_string(),
            "rolled back: Account 'Carol' not found"
        );
    }
}
