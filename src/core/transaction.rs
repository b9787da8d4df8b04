//! Transfer transaction
//!
//! This module provides `TransferTransaction`, which executes one transfer as
//! an all-or-nothing unit:
//!
//! 1. acquire an isolation scope from the controller
//! 2. read both accounts (the snapshot)
//! 3. check the debited account can cover the amount
//! 4. debit, then credit
//! 5. commit, or restore the snapshot and release the scope
//!
//! Every failure is converted into `TransferOutcome::RolledBack`; nothing is
//! propagated to the caller as an `Err`. Once the scope is released no
//! observer can see the debit without the credit.

use crate::core::traits::{ConcurrencyController, IsolationScope};
use crate::types::{Account, FaultPoint, LedgerError, TransferOutcome, TransferRequest};
use rust_decimal::Decimal;
use std::thread;
use std::time::Duration;

/// Pre-mutation account states, used only to restore state on rollback
///
/// Versions are captured along with balances so a rollback leaves the
/// ledger exactly as it found it.
#[derive(Debug, Clone)]
struct Snapshot {
    from: Account,
    to: Account,
}

/// One transfer, bound to the controller that will isolate it
pub struct TransferTransaction<'a> {
    controller: &'a dyn ConcurrencyController,
    request: TransferRequest,
    fault: Option<FaultPoint>,
    processing_delay: Option<Duration>,
}

impl<'a> TransferTransaction<'a> {
    pub fn new(controller: &'a dyn ConcurrencyController, request: TransferRequest) -> Self {
        Self {
            controller,
            request,
            fault: None,
            processing_delay: None,
        }
    }

    /// Force a failure at `point` to exercise the rollback path
    pub fn with_fault(mut self, point: FaultPoint) -> Self {
        self.fault = Some(point);
        self
    }

    /// Sleep inside the isolation scope after the funds check
    ///
    /// Widens the window in which concurrent transfers contend, which makes
    /// isolation behavior observable in demos and tests.
    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = Some(delay);
        self
    }

    /// Run the transfer to completion
    pub fn execute(self) -> TransferOutcome {
        let mut scope = match self.controller.acquire() {
            Ok(scope) => scope,
            Err(reason) => return TransferOutcome::rolled_back(reason),
        };

        let mut snapshot = None;
        match self.apply(&mut *scope, &mut snapshot) {
            Ok((from_balance, to_balance)) => match scope.commit() {
                Ok(()) => TransferOutcome::Committed {
                    from_balance,
                    to_balance,
                },
                Err(reason) => TransferOutcome::rolled_back(reason),
            },
            Err(reason) => {
                if let Some(snapshot) = snapshot {
                    self.restore(&mut *scope, snapshot);
                }
                scope.rollback();
                TransferOutcome::rolled_back(reason)
            }
        }
    }

    /// Steps 2 to 4: snapshot, check, mutate
    ///
    /// `snapshot` is filled in just before the first write, so the caller
    /// restores accounts only when something was actually written.
    fn apply<S>(
        &self,
        scope: &mut S,
        snapshot: &mut Option<Snapshot>,
    ) -> Result<(Decimal, Decimal), LedgerError>
    where
        S: IsolationScope + ?Sized,
    {
        let from = self.request.from();
        let to = self.request.to();
        let amount = self.request.amount();

        let from_account = scope.account(from)?;
        let to_account = scope.account(to)?;
        let from_balance = from_account.balance;
        let to_balance = to_account.balance;

        if from_balance < amount {
            return Err(LedgerError::insufficient_funds(from, from_balance, amount));
        }

        if let Some(delay) = self.processing_delay {
            thread::sleep(delay);
        }

        // Both results are computed before the first write so that an
        // overflow can never leave a half-applied transfer behind
        let new_from = from_balance - amount;
        let new_to = to_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("credit", to))?;

        *snapshot = Some(Snapshot {
            from: from_account,
            to: to_account,
        });
        scope.set_balance(from, new_from)?;
        self.check_fault(FaultPoint::AfterDebit)?;

        scope.set_balance(to, new_to)?;
        self.check_fault(FaultPoint::BeforeCommit)?;

        Ok((new_from, new_to))
    }

    fn check_fault(&self, point: FaultPoint) -> Result<(), LedgerError> {
        if self.fault == Some(point) {
            return Err(LedgerError::injected_fault(point));
        }
        Ok(())
    }

    /// Reinstate the snapshot accounts through the scope
    fn restore<S>(&self, scope: &mut S, snapshot: Snapshot)
    where
        S: IsolationScope + ?Sized,
    {
        for account in [&snapshot.from, &snapshot.to] {
            if let Err(e) = scope.restore(account) {
                tracing::error!(account = %account.name, error = %e, "failed to restore snapshot account");
            }
        }
    }
}
