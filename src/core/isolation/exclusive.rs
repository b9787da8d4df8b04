//! Exclusive-lock isolation
//!
//! A single process-wide mutex guards the whole ledger. Every transfer runs
//! alone inside it, which makes the externally observable effect of N
//! concurrent transfers equal to some sequential ordering of them.
//!
//! The mutex is a `parking_lot::FairMutex`: on release the lock is handed
//! directly to the longest waiter, so no waiter can be starved. With exactly
//! one lock in the system there is no lock ordering to get wrong.

use crate::core::ledger::Ledger;
use crate::core::traits::{ConcurrencyController, IsolationScope, IsolationStrategy};
use crate::types::{Account, LedgerError};
use parking_lot::{FairMutex, FairMutexGuard};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// Controller serializing all transfers behind one fair mutex
#[derive(Debug)]
pub struct ExclusiveLockController {
    ledger: Arc<Ledger>,
    lock: FairMutex<()>,
    /// Upper bound on the wait in `acquire`; `None` waits indefinitely
    timeout: Option<Duration>,
}

impl ExclusiveLockController {
    /// Create a controller over `ledger` that waits indefinitely for the lock
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            lock: FairMutex::new(()),
            timeout: None,
        }
    }

    /// Create a controller that gives up after `timeout`
    pub fn with_timeout(ledger: Arc<Ledger>, timeout: Duration) -> Self {
        Self {
            ledger,
            lock: FairMutex::new(()),
            timeout: Some(timeout),
        }
    }
}

impl ConcurrencyController for ExclusiveLockController {
    fn strategy(&self) -> IsolationStrategy {
        IsolationStrategy::ExclusiveLock
    }

    fn acquire(&self) -> Result<Box<dyn IsolationScope + '_>, LedgerError> {
        let guard = match self.timeout {
            Some(timeout) => self.lock.try_lock_for(timeout).ok_or_else(|| {
                let timeout_ms = millis(timeout);
                tracing::debug!(timeout_ms, "ledger lock wait timed out");
                LedgerError::lock_timeout(timeout_ms)
            })?,
            None => self.lock.lock(),
        };

        tracing::debug!("ledger lock acquired");

        Ok(Box::new(ExclusiveScope {
            ledger: &self.ledger,
            _guard: guard,
        }))
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Scope holding the ledger lock
///
/// Reads and writes go straight to the ledger; the lock is released when the
/// guard drops, whichever way the scope ends.
struct ExclusiveScope<'a> {
    ledger: &'a Ledger,
    _guard: FairMutexGuard<'a, ()>,
}

impl IsolationScope for ExclusiveScope<'_> {
    fn balance(&mut self, name: &str) -> Result<Decimal, LedgerError> {
        self.ledger
            .balance(name)
            .ok_or_else(|| LedgerError::account_not_found(name))
    }

    fn account(&mut self, name: &str) -> Result<Account, LedgerError> {
        self.ledger
            .account(name)
            .ok_or_else(|| LedgerError::account_not_found(name))
    }

    fn set_balance(&mut self, name: &str, balance: Decimal) -> Result<(), LedgerError> {
        self.ledger.set_balance(name, balance);
        Ok(())
    }

    fn restore(&mut self, account: &Account) -> Result<(), LedgerError> {
        self.ledger.restore(account.clone());
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        tracing::debug!("ledger lock released after commit");
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        tracing::debug!("ledger lock released after rollback");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn seeded_ledger() -> Arc<Ledger> {
        let ledger = Arc::new(Ledger::new());
        ledger.set_balance("Alice", Decimal::new(500, 0));
        ledger.set_balance("Bob", Decimal::new(300, 0));
        ledger
    }

    #[test]
    fn test_strategy_is_exclusive_lock() {
        let controller = ExclusiveLockController::new(seeded_ledger());
        assert_eq!(controller.strategy(), IsolationStrategy::ExclusiveLock);
    }

    #[test]
    fn test_scope_reads_and_writes_ledger() {
        let ledger = seeded_ledger();
        let controller = ExclusiveLockController::new(Arc::clone(&ledger));

        let mut scope = controller.acquire().unwrap();
        assert_eq!(scope.balance("Alice").unwrap(), Decimal::new(500, 0));
        scope.set_balance("Alice", Decimal::new(450, 0)).unwrap();
        scope.commit().unwrap();

        assert_eq!(ledger.balance("Alice"), Some(Decimal::new(450, 0)));
    }

    #[test]
    fn test_restore_reinstates_balance_and_version() {
        let ledger = seeded_ledger();
        let controller = ExclusiveLockController::new(Arc::clone(&ledger));

        let mut scope = controller.acquire().unwrap();
        let original = scope.account("Alice").unwrap();
        scope.set_balance("Alice", Decimal::new(1, 0)).unwrap();
        scope.set_balance("Alice", Decimal::new(2, 0)).unwrap();
        scope.restore(&original).unwrap();
        scope.rollback();

        assert_eq!(ledger.account("Alice"), Some(original));
    }

    #[test]
    fn test_millis_saturates_instead_of_truncating() {
        assert_eq!(millis(Duration::from_millis(250)), 250);
        assert_eq!(millis(Duration::from_secs(u64::MAX)), u64::MAX);
    }

    #[test]
    fn test_scope_reports_unknown_account() {
        let controller = ExclusiveLockController::new(seeded_ledger());

        let mut scope = controller.acquire().unwrap();
        let result = scope.balance("Carol");

        assert_eq!(result, Err(LedgerError::account_not_found("Carol")));
    }

    #[test]
    fn test_lock_is_released_on_commit_rollback_and_drop() {
        let controller =
            ExclusiveLockController::with_timeout(seeded_ledger(), Duration::from_millis(50));

        controller.acquire().unwrap().commit().unwrap();
        controller.acquire().unwrap().rollback();
        drop(controller.acquire().unwrap());

        assert!(controller.acquire().is_ok());
    }

    #[test]
    fn test_acquire_times_out_while_lock_is_held() {
        let controller =
            ExclusiveLockController::with_timeout(seeded_ledger(), Duration::from_millis(20));

        let held = controller.acquire().unwrap();

        let result = thread::scope(|s| s.spawn(|| controller.acquire().err()).join().unwrap());
        assert_eq!(result, Some(LedgerError::lock_timeout(20)));

        held.rollback();
    }

    #[test]
    fn test_waiter_proceeds_once_lock_is_released() {
        let ledger = seeded_ledger();
        let controller = ExclusiveLockController::new(Arc::clone(&ledger));

        let mut held = controller.acquire().unwrap();

        thread::scope(|s| {
            let waiter = s.spawn(|| {
                let mut scope = controller.acquire().unwrap();
                let balance = scope.balance("Bob").unwrap();
                scope.commit().unwrap();
                balance
            });

            thread::sleep(Duration::from_millis(20));
            held.set_balance("Bob", Decimal::new(350, 0)).unwrap();
            held.commit().unwrap();

            // The waiter only ever sees the committed value
            assert_eq!(waiter.join().unwrap(), Decimal::new(350, 0));
        });
    }
}
