//! Concurrency integration tests
//!
//! Drive a shared `TransferEngine` from many threads and check the ledger
//! invariants that must hold under every isolation strategy: the total is
//! conserved, no balance goes negative, and concurrent transfers behave as
//! if they ran one after another.

use acid_ledger::core::{EngineConfig, IsolationLevel, IsolationStrategy, TransferEngine};
use acid_ledger::{LedgerError, TransferOutcome};
use rstest::rstest;
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn config(strategy: IsolationStrategy, level: IsolationLevel) -> EngineConfig {
    EngineConfig::new(strategy).with_isolation_level(level)
}

fn engine_with(config: EngineConfig, accounts: &[(&str, i64)]) -> Arc<TransferEngine> {
    let engine = TransferEngine::new(config);
    engine
        .seed(
            accounts
                .iter()
                .map(|(name, balance)| (*name, Decimal::new(*balance, 0))),
        )
        .unwrap();
    Arc::new(engine)
}

/// Run each `(from, to, amount)` on its own thread, released together
fn run_concurrently(
    engine: &Arc<TransferEngine>,
    transfers: &[(&'static str, &'static str, i64)],
) -> Vec<TransferOutcome> {
    let barrier = Arc::new(Barrier::new(transfers.len()));

    let handles: Vec<_> = transfers
        .iter()
        .map(|&(from, to, amount)| {
            let engine = Arc::clone(engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                engine.transfer(from, to, Decimal::new(amount, 0))
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect()
}

#[rstest]
#[case::exclusive(IsolationStrategy::ExclusiveLock, IsolationLevel::RepeatableRead)]
#[case::delegated_repeatable_read(IsolationStrategy::DelegatedIsolation, IsolationLevel::RepeatableRead)]
#[case::delegated_serializable(IsolationStrategy::DelegatedIsolation, IsolationLevel::Serializable)]
fn test_overdraw_race_has_one_winner(
    #[case] strategy: IsolationStrategy,
    #[case] level: IsolationLevel,
    #[values(None, Some(5))] delay_ms: Option<u64>,
) {
    for _ in 0..25 {
        let mut config = config(strategy, level);
        if let Some(ms) = delay_ms {
            config = config.with_processing_delay(Duration::from_millis(ms));
        }
        let engine = engine_with(config, &[("Alice", 500), ("Bob", 300)]);

        let outcomes = run_concurrently(&engine, &[("Alice", "Bob", 100), ("Alice", "Bob", 600)]);

        assert!(outcomes[0].is_committed(), "{}", outcomes[0]);
        assert!(matches!(
            outcomes[1].reason(),
            Some(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(engine.balance("Alice").unwrap(), Decimal::new(400, 0));
        assert_eq!(engine.balance("Bob").unwrap(), Decimal::new(400, 0));
    }
}

#[rstest]
#[case::exclusive(IsolationStrategy::ExclusiveLock, IsolationLevel::RepeatableRead)]
#[case::delegated_repeatable_read(IsolationStrategy::DelegatedIsolation, IsolationLevel::RepeatableRead)]
#[case::delegated_serializable(IsolationStrategy::DelegatedIsolation, IsolationLevel::Serializable)]
fn test_random_traffic_conserves_total(
    #[case] strategy: IsolationStrategy,
    #[case] level: IsolationLevel,
) {
    const NAMES: [&str; 4] = ["Alice", "Bob", "Carol", "Dave"];
    let engine = engine_with(
        config(strategy, level),
        &[("Alice", 500), ("Bob", 300), ("Carol", 100), ("Dave", 0)],
    );
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8u64)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut outcomes = Vec::new();
                // Small LCG so every worker has its own deterministic stream
                let mut state = worker.wrapping_mul(6364136223846793005).wrapping_add(1);
                for _ in 0..200 {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let from = NAMES[(state >> 33) as usize % NAMES.len()];
                    let to = NAMES[(state >> 41) as usize % NAMES.len()];
                    let amount = Decimal::new(((state >> 50) % 150) as i64 + 1, 0);
                    outcomes.push(engine.transfer(from, to, amount));
                }
                outcomes
            })
        })
        .collect();

    let outcomes: Vec<TransferOutcome> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(engine.total_balance(), Decimal::new(900, 0));
    for account in engine.accounts() {
        assert!(account.balance >= Decimal::ZERO, "{} went negative", account.name);
    }
    for outcome in &outcomes {
        match outcome.reason() {
            None
            | Some(LedgerError::InsufficientFunds { .. })
            | Some(LedgerError::Validation { .. }) => {}
            Some(LedgerError::Conflict { .. }) => {
                assert_eq!(strategy, IsolationStrategy::DelegatedIsolation)
            }
            Some(other) => panic!("unexpected rollback reason: {}", other),
        }
    }
    assert!(outcomes.iter().any(TransferOutcome::is_committed));
}

#[rstest]
#[case::exclusive(IsolationStrategy::ExclusiveLock)]
#[case::delegated(IsolationStrategy::DelegatedIsolation)]
fn test_no_lost_updates_with_retry(#[case] strategy: IsolationStrategy) {
    let engine = engine_with(
        config(strategy, IsolationLevel::RepeatableRead),
        &[("Alice", 500), ("Bob", 300)],
    );
    let barrier = Arc::new(Barrier::new(10));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10 {
                    // Retryable rollbacks are resubmitted until they commit
                    loop {
                        let outcome = engine.transfer("Alice", "Bob", Decimal::ONE);
                        match outcome.reason() {
                            None => break,
                            Some(reason) if reason.is_retryable() => continue,
                            Some(reason) => panic!("unexpected rollback: {}", reason),
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.balance("Alice").unwrap(), Decimal::new(400, 0));
    assert_eq!(engine.balance("Bob").unwrap(), Decimal::new(400, 0));
}

#[test]
fn test_lock_timeout_rolls_back_waiting_transfer() {
    let config = EngineConfig::new(IsolationStrategy::ExclusiveLock)
        .with_lock_timeout(Duration::from_millis(10))
        .with_processing_delay(Duration::from_millis(300));
    let engine = engine_with(config, &[("Alice", 500), ("Bob", 300)]);

    let outcomes = run_concurrently(&engine, &[("Alice", "Bob", 100), ("Bob", "Alice", 50)]);

    let committed = outcomes.iter().filter(|o| o.is_committed()).count();
    let timed_out: Vec<_> = outcomes
        .iter()
        .filter_map(TransferOutcome::reason)
        .collect();

    assert_eq!(committed, 1);
    assert_eq!(timed_out, vec![&LedgerError::lock_timeout(10)]);
    assert!(timed_out[0].is_retryable());
    assert_eq!(engine.total_balance(), Decimal::new(800, 0));
}

#[test]
fn test_balance_reads_during_transfers_never_fail() {
    let engine = engine_with(
        EngineConfig::new(IsolationStrategy::ExclusiveLock),
        &[("Alice", 500), ("Bob", 300)],
    );
    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for _ in 0..500 {
                engine.transfer("Alice", "Bob", Decimal::ONE);
                engine.transfer("Bob", "Alice", Decimal::ONE);
            }
        })
    };

    for _ in 0..500 {
        assert!(engine.balance("Alice").is_ok());
        assert!(engine.balance("Bob").is_ok());
    }
    writer.join().unwrap();

    assert_eq!(engine.balance("Alice").unwrap(), Decimal::new(500, 0));
    assert_eq!(engine.balance("Bob").unwrap(), Decimal::new(300, 0));
}
