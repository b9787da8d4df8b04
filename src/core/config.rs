//! Engine configuration
//!
//! Selects the isolation strategy and the debug hooks a `TransferEngine` is
//! built with. The CLI fills this in from its arguments; tests and embedders
//! construct it directly.

use crate::core::isolation::IsolationLevel;
use crate::core::traits::IsolationStrategy;
use crate::types::FaultPoint;
use std::time::Duration;

/// Configuration for a `TransferEngine`
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Which concurrency controller isolates transfers
    pub strategy: IsolationStrategy,

    /// Isolation level used by the delegated strategy (ignored otherwise)
    pub isolation_level: IsolationLevel,

    /// Maximum wait for the exclusive lock; `None` waits indefinitely
    pub lock_timeout: Option<Duration>,

    /// Fault injected into every transfer (debug only)
    pub fault: Option<FaultPoint>,

    /// Delay spent inside the isolation scope of every transfer (debug only)
    pub processing_delay: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: IsolationStrategy::ExclusiveLock,
            isolation_level: IsolationLevel::RepeatableRead,
            lock_timeout: None,
            fault: None,
            processing_delay: None,
        }
    }
}

impl EngineConfig {
    /// Default configuration for the given strategy
    pub fn new(strategy: IsolationStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn with_isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = level;
        self
    }

    /// Bound the wait for the exclusive lock
    ///
    /// A zero timeout is treated as no timeout, with a warning.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            tracing::warn!("Invalid lock timeout (0ms), waiting indefinitely instead");
            self.lock_timeout = None;
        } else {
            self.lock_timeout = Some(timeout);
        }
        self
    }

    pub fn with_fault(mut self, point: FaultPoint) -> Self {
        self.fault = Some(point);
        self
    }

    pub fn with_processing_delay(mut self, delay: Duration) -> Self {
        self.processing_delay = Some(delay);
        self
    }
}
