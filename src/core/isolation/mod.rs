//! Concurrency controllers
//!
//! This module provides the two interchangeable isolation strategies:
//!
//! - **ExclusiveLockController**: one fair mutex around the whole ledger
//! - **DelegatedIsolationController**: per-transaction scopes opened on a
//!   `TransactionalStore` (the crate ships `VersionedStore`)
//!
//! # Guarantees
//!
//! | Strategy              | Serializable | Blocks on            | Failure surfaced |
//! |-----------------------|--------------|----------------------|------------------|
//! | exclusive lock        | yes          | lock acquisition     | `LockTimeout`    |
//! | delegated (RR)        | no (skew)    | store commit lock    | `Conflict`       |
//! | delegated (SERIAL)    | yes          | store commit lock    | `Conflict`       |

pub mod delegated;
pub mod exclusive;
pub mod store;

pub use delegated::DelegatedIsolationController;
pub use exclusive::ExclusiveLockController;
pub use store::{IsolationLevel, StoreTransaction, TransactionalStore, VersionedStore};
