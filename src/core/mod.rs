//! Core ledger logic
//!
//! This module contains the transactional components:
//! - `ledger` - Authoritative account balances, no isolation policy
//! - `traits` - Controller and scope abstractions
//! - `isolation` - Exclusive-lock and delegated-isolation controllers
//! - `transaction` - One transfer as an all-or-nothing unit
//! - `config` - Engine configuration
//! - `engine` - Facade exposing seed, transfer and balance

pub mod config;
pub mod engine;
pub mod isolation;
pub mod ledger;
pub mod traits;
pub mod transaction;

pub use config::EngineConfig;
pub use engine::TransferEngine;
pub use isolation::{
    DelegatedIsolationController, ExclusiveLockController, IsolationLevel, StoreTransaction,
    TransactionalStore, VersionedStore,
};
pub use ledger::Ledger;
pub use traits::{ConcurrencyController, IsolationScope, IsolationStrategy};
pub use transaction::TransferTransaction;
