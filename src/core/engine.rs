//! Transfer engine
//!
//! This module provides the `TransferEngine`, the single entry point callers
//! use to work with the ledger. It owns the `Ledger` and the configured
//! concurrency controller, and exposes three operations:
//!
//! - `seed` - bulk-initialize the ledger once at startup
//! - `transfer` - move funds between two accounts atomically
//! - `balance` - read-only balance query
//!
//! Transfers never return `Err`: every failure, including malformed input,
//! comes back as `TransferOutcome::RolledBack` so the caller always receives
//! a value and the process keeps serving subsequent transfers.

use crate::core::config::EngineConfig;
use crate::core::isolation::{DelegatedIsolationController, ExclusiveLockController, VersionedStore};
use crate::core::ledger::Ledger;
use crate::core::traits::{ConcurrencyController, IsolationStrategy};
use crate::core::transaction::TransferTransaction;
use crate::types::{Account, FaultPoint, LedgerError, TransferOutcome, TransferRequest};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Transfer processing engine
///
/// `TransferEngine` is `Send + Sync`; share it across threads with `Arc`.
pub struct TransferEngine {
    ledger: Arc<Ledger>,
    controller: Box<dyn ConcurrencyController>,
    config: EngineConfig,
    seeded: AtomicBool,
}

impl TransferEngine {
    /// Create an engine with an empty ledger
    ///
    /// The controller is chosen from `config.strategy`. For the delegated
    /// strategy a `VersionedStore` over the same ledger is created.
    pub fn new(config: EngineConfig) -> Self {
        let ledger = Arc::new(Ledger::new());

        let controller: Box<dyn ConcurrencyController> = match config.strategy {
            IsolationStrategy::ExclusiveLock => match config.lock_timeout {
                Some(timeout) => Box::new(ExclusiveLockController::with_timeout(
                    Arc::clone(&ledger),
                    timeout,
                )),
                None => Box::new(ExclusiveLockController::new(Arc::clone(&ledger))),
            },
            IsolationStrategy::DelegatedIsolation => Box::new(DelegatedIsolationController::new(
                Arc::new(VersionedStore::new(Arc::clone(&ledger))),
                config.isolation_level,
            )),
        };

        tracing::debug!(
            strategy = %config.strategy,
            level = %config.isolation_level,
            "transfer engine created"
        );

        TransferEngine {
            ledger,
            controller,
            config,
            seeded: AtomicBool::new(false),
        }
    }

    /// Bulk-initialize the ledger
    ///
    /// Must be called exactly once, before any transfer.
    ///
    /// # Errors
    ///
    /// - `AlreadySeeded` on a second call
    /// - `Validation` for an empty or duplicate account name, or a negative
    ///   balance; nothing is inserted in that case
    pub fn seed<I, K>(&self, initial: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: Into<String>,
    {
        let accounts: Vec<(String, Decimal)> = initial
            .into_iter()
            .map(|(name, balance)| (name.into(), balance))
            .collect();

        let mut names = HashSet::with_capacity(accounts.len());
        for (name, balance) in &accounts {
            if name.trim().is_empty() {
                return Err(LedgerError::validation("seed account name is empty"));
            }
            if !names.insert(name.as_str()) {
                return Err(LedgerError::validation(format!(
                    "duplicate seed account '{}'",
                    name
                )));
            }
            if *balance < Decimal::ZERO {
                return Err(LedgerError::validation(format!(
                    "seed balance for '{}' is negative: {}",
                    name, balance
                )));
            }
        }

        if self
            .seeded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(LedgerError::AlreadySeeded);
        }

        for (name, balance) in &accounts {
            self.ledger.set_balance(name, *balance);
        }

        tracing::info!(accounts = accounts.len(), total = %self.ledger.total(), "ledger seeded");
        Ok(())
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&self, from: &str, to: &str, amount: Decimal) -> TransferOutcome {
        match Self::request(from, to, amount) {
            Ok(request) => self.execute(request),
            Err(rejected) => rejected,
        }
    }

    /// Execute an already validated request with the configured hooks
    pub fn execute(&self, request: TransferRequest) -> TransferOutcome {
        self.run(request, self.config.fault)
    }

    /// Execute a transfer with a fault forced at `point`
    ///
    /// Debug hook used to demonstrate that a failure between the two writes
    /// leaves the ledger untouched.
    pub fn transfer_with_fault(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
        point: FaultPoint,
    ) -> TransferOutcome {
        match Self::request(from, to, amount) {
            Ok(request) => self.run(request, Some(point)),
            Err(rejected) => rejected,
        }
    }

    /// Validate raw transfer input, turning a rejection into its outcome
    fn request(from: &str, to: &str, amount: Decimal) -> Result<TransferRequest, TransferOutcome> {
        TransferRequest::new(from, to, amount).map_err(|reason| {
            tracing::warn!(from, to, %amount, %reason, "transfer rejected");
            TransferOutcome::rolled_back(reason)
        })
    }

    fn run(&self, request: TransferRequest, fault: Option<FaultPoint>) -> TransferOutcome {
        let mut transaction = TransferTransaction::new(self.controller.as_ref(), request.clone());
        if let Some(point) = fault {
            transaction = transaction.with_fault(point);
        }
        if let Some(delay) = self.config.processing_delay {
            transaction = transaction.with_processing_delay(delay);
        }

        let outcome = transaction.execute();
        match &outcome {
            TransferOutcome::Committed {
                from_balance,
                to_balance,
            } => tracing::info!(
                transfer = %request,
                %from_balance,
                %to_balance,
                "transfer committed"
            ),
            TransferOutcome::RolledBack { reason } => tracing::warn!(
                transfer = %request,
                %reason,
                retryable = reason.is_retryable(),
                "transfer rolled back"
            ),
        }
        outcome
    }

    /// Balance of an account
    ///
    /// Reads outside any isolation scope; the value is suitable for display
    /// but must not drive a mutation decision.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account was never seeded.
    pub fn balance(&self, name: &str) -> Result<Decimal, LedgerError> {
        self.ledger
            .balance(name)
            .ok_or_else(|| LedgerError::account_not_found(name))
    }

    /// All accounts sorted by name (reporting only)
    pub fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts()
    }

    /// Sum of all balances (reporting only)
    pub fn total_balance(&self) -> Decimal {
        self.ledger.total()
    }

    /// The isolation strategy transfers run under
    pub fn strategy(&self) -> IsolationStrategy {
        self.controller.strategy()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for TransferEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
