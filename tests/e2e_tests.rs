//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Seeds a fresh engine from seed.csv in a fixture directory
//! 2. Replays transfers.csv through the selected processing strategy
//! 3. Compares the balances written to output with expected.csv
//!
//! Fixtures live in tests/fixtures/ and cover the happy path, business-rule
//! rollbacks, malformed input, and decimal precision. Every fixture is built
//! so that its final balances do not depend on the order in which transfers
//! run, which lets the async strategy use the same expectations.

#[cfg(test)]
mod tests {
    use acid_ledger::cli::StrategyType;
    use acid_ledger::core::{EngineConfig, IsolationLevel, IsolationStrategy, TransferEngine};
    use acid_ledger::io::read_seed_file;
    use acid_ledger::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::process::Command;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    /// Processing strategy and isolation combinations with deterministic results
    ///
    /// Async replay under delegated isolation can roll back transfers that
    /// touch the same account with a retryable conflict, so it is covered by
    /// the concurrency tests instead.
    #[derive(Debug, Clone, Copy)]
    enum Mode {
        SyncExclusive,
        SyncDelegated,
        SyncSerializable,
        AsyncExclusive,
    }

    impl Mode {
        fn strategy(self) -> StrategyType {
            match self {
                Mode::AsyncExclusive => StrategyType::Async,
                _ => StrategyType::Sync,
            }
        }

        fn engine_config(self) -> EngineConfig {
            match self {
                Mode::SyncExclusive | Mode::AsyncExclusive => {
                    EngineConfig::new(IsolationStrategy::ExclusiveLock)
                }
                Mode::SyncDelegated => EngineConfig::new(IsolationStrategy::DelegatedIsolation),
                Mode::SyncSerializable => EngineConfig::new(IsolationStrategy::DelegatedIsolation)
                    .with_isolation_level(IsolationLevel::Serializable),
            }
        }
    }

    /// Run a fixture and compare the output with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if a fixture file cannot be read or the output does not match.
    fn run_test_fixture(fixture_name: &str, mode: Mode) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let seed_path = format!("{}/seed.csv", fixture_dir);
        let transfers_path = format!("{}/transfers.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        for path in [&seed_path, &transfers_path, &expected_path] {
            assert!(Path::new(path).exists(), "Fixture file not found: {}", path);
        }

        let engine = TransferEngine::new(mode.engine_config());
        let initial = read_seed_file(Path::new(&seed_path))
            .unwrap_or_else(|e| panic!("Failed to read seed file: {}", e));
        engine
            .seed(initial)
            .unwrap_or_else(|e| panic!("Failed to seed ledger: {}", e));
        let engine = Arc::new(engine);
        let total_before = engine.total_balance();

        let config = matches!(mode.strategy(), StrategyType::Async).then(|| BatchConfig::new(2, 4));
        let strategy = create_strategy(mode.strategy(), config);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");
        strategy
            .process(
                Arc::clone(&engine),
                Path::new(&transfers_path),
                &mut temp_output,
            )
            .unwrap_or_else(|e| panic!("Failed to process transfers: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (mode: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, mode, actual_output, expected_output
        );
        assert_eq!(engine.total_balance(), total_before, "total not conserved");
    }

    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_funds")]
    #[case("unknown_account")]
    #[case("concurrent_pair")]
    #[case("malformed_data")]
    #[case("invalid_requests")]
    #[case("precision")]
    #[case("drain_to_zero")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(
            Mode::SyncExclusive,
            Mode::SyncDelegated,
            Mode::SyncSerializable,
            Mode::AsyncExclusive
        )]
        mode: Mode,
    ) {
        run_test_fixture(fixture, mode);
    }

    #[test]
    fn test_binary_uses_default_seed_and_prints_balances() {
        let output = Command::new(env!("CARGO_BIN_EXE_acid-ledger"))
            .arg("tests/fixtures/concurrent_pair/transfers.csv")
            .output()
            .expect("Failed to run binary");

        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "account,balance\nAlice,400.0000\nBob,400.0000\n"
        );
    }

    #[rstest]
    #[case::fault_after_debit("after-debit")]
    #[case::fault_before_commit("before-commit")]
    fn test_binary_injected_fault_leaves_seed_untouched(#[case] point: &str) {
        let output = Command::new(env!("CARGO_BIN_EXE_acid-ledger"))
            .args(["--seed", "tests/fixtures/happy_path/seed.csv"])
            .args(["--inject-fault", point])
            .arg("tests/fixtures/happy_path/transfers.csv")
            .output()
            .expect("Failed to run binary");

        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "account,balance\nAlice,500.0000\nBob,300.0000\nCarol,0.0000\n"
        );
    }

    #[test]
    fn test_binary_exits_with_error_on_missing_file() {
        let output = Command::new(env!("CARGO_BIN_EXE_acid-ledger"))
            .arg("tests/fixtures/does_not_exist.csv")
            .output()
            .expect("Failed to run binary");

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
    }
}
