use crate::core::{EngineConfig, IsolationLevel, IsolationStrategy};
use crate::strategy::BatchConfig;
use crate::types::FaultPoint;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Replay transfers through an ACID ledger and print the final balances
#[derive(Parser, Debug)]
#[command(name = "acid-ledger")]
#[command(
    about = "Replay transfers through an ACID ledger and print the final balances",
    long_about = None
)]
pub struct CliArgs {
    /// Transfer CSV file with columns from,to,amount
    #[arg(value_name = "TRANSFERS", help = "Path to the transfer CSV file")]
    pub transfers_file: PathBuf,

    /// Seed CSV file with columns account,balance
    #[arg(
        long = "seed",
        value_name = "FILE",
        help = "Seed CSV file (default: Alice=500, Bob=300)"
    )]
    pub seed_file: Option<PathBuf>,

    #[arg(
        long = "isolation",
        value_name = "ISOLATION",
        default_value = "exclusive",
        help = "Concurrency control: 'exclusive' lock or 'delegated' store transactions"
    )]
    pub isolation: IsolationType,

    #[arg(
        long = "isolation-level",
        value_name = "LEVEL",
        default_value = "repeatable-read",
        help = "Store isolation level for the delegated strategy"
    )]
    pub isolation_level: LevelType,

    #[arg(
        long = "lock-timeout-ms",
        value_name = "MS",
        help = "Give up waiting for the exclusive lock after this many milliseconds"
    )]
    pub lock_timeout_ms: Option<u64>,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' in file order or 'async' concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfers per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfers per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of transfers in flight (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of transfers in flight (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    #[arg(
        long = "inject-fault",
        value_name = "POINT",
        help = "Fail every transfer at this point to exercise rollback (debug)"
    )]
    pub inject_fault: Option<FaultType>,

    #[arg(
        long = "processing-delay-ms",
        value_name = "MS",
        help = "Sleep inside each transfer's isolation scope (debug)"
    )]
    pub processing_delay_ms: Option<u64>,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available concurrency controllers
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IsolationType {
    Exclusive,
    Delegated,
}

/// Isolation levels for the delegated controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LevelType {
    RepeatableRead,
    Serializable,
}

/// Fault injection points
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FaultType {
    AfterDebit,
    BeforeCommit,
}

impl From<IsolationType> for IsolationStrategy {
    fn from(value: IsolationType) -> Self {
        match value {
            IsolationType::Exclusive => IsolationStrategy::ExclusiveLock,
            IsolationType::Delegated => IsolationStrategy::DelegatedIsolation,
        }
    }
}

impl From<LevelType> for IsolationLevel {
    fn from(value: LevelType) -> Self {
        match value {
            LevelType::RepeatableRead => IsolationLevel::RepeatableRead,
            LevelType::Serializable => IsolationLevel::Serializable,
        }
    }
}

impl From<FaultType> for FaultPoint {
    fn from(value: FaultType) -> Self {
        match value {
            FaultType::AfterDebit => FaultPoint::AfterDebit,
            FaultType::BeforeCommit => FaultPoint::BeforeCommit,
        }
    }
}

impl CliArgs {
    /// Create an EngineConfig from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::new(self.isolation.into())
            .with_isolation_level(self.isolation_level.into());

        if let Some(ms) = self.lock_timeout_ms {
            config = config.with_lock_timeout(Duration::from_millis(ms));
        }
        if let Some(fault) = self.inject_fault {
            config = config.with_fault(fault.into());
        }
        if let Some(ms) = self.processing_delay_ms {
            config = config.with_processing_delay(Duration::from_millis(ms));
        }

        config
    }

    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values fall back with a
    /// warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }
}
