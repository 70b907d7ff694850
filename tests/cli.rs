//! Binary-level tests for argument handling and exit codes

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// Helper function to create a test command
fn create_test_cmd() -> Command {
    let mut cmd = Command::cargo_bin("npc").unwrap();
    for var in [
        "TEST_PROTOCOLS",
        "TEST_DURATION_SECONDS",
        "TEST_ITERATIONS",
        "ITERATION_DELAY_SECONDS",
        "UDP_BITRATE",
        "LATENCY_DURATION_SECONDS",
        "LATENCY_INTERVAL_SECONDS",
        "MAX_LATENCY_MS",
        "MAX_PACKET_LOSS_PERCENT",
        "MIN_THROUGHPUT_MBPS",
        "LOG_LEVEL",
        "LOG_FORMAT",
        "ENABLE_COLOR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_options() {
    create_test_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--protocols"))
        .stdout(predicate::str::contains("--latency-interval"))
        .stdout(predicate::str::contains("--min-throughput"));
}

#[test]
fn test_version() {
    create_test_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_iterations_is_config_error() {
    create_test_cmd()
        .args(["--iterations", "0", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"));
}

#[test]
fn test_unknown_protocol_is_rejected_by_parser() {
    create_test_cmd()
        .args(["--protocols", "tcp,sctp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sctp"));
}

#[test]
fn test_zero_duration_is_rejected() {
    create_test_cmd()
        .args(["--duration", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greater than 0"));
}

#[test]
fn test_bitrate_with_tcp_from_environment_is_config_error() {
    create_test_cmd()
        .env("TEST_PROTOCOLS", "tcp")
        .args(["--udp-bitrate", "20M", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[CONFIG]"))
        .stderr(predicate::str::contains("UDP bitrate"));
}

#[test]
fn test_conflicting_log_flags() {
    create_test_cmd()
        .args(["--debug", "--log-level", "info", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--debug"));
}

#[test]
fn test_missing_env_file() {
    create_test_cmd()
        .args(["--env-file", "/nonexistent/campaign.env", "--no-color"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Environment file not found"));
}

#[test]
fn test_invalid_value_in_env_file() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join("campaign.env");
    fs::write(&env_path, "TEST_PROTOCOLS=tcp,quic\n").unwrap();

    create_test_cmd()
        .arg("--env-file")
        .arg(&env_path)
        .arg("--no-color")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("quic"));
}

#[test]
fn test_env_help() {
    create_test_cmd()
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TEST_PROTOCOLS"))
        .stdout(predicate::str::contains("Configuration Priority"));
}

#[test]
fn test_write_env_example() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("example.env");

    create_test_cmd()
        .arg("--write-env-example")
        .arg(&path)
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("# MIN_THROUGHPUT_MBPS=10"));
}
