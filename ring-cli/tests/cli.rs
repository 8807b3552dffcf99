//! Smoke tests for the tokenring binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn tokenring() -> Command {
    Command::cargo_bin("tokenring").unwrap()
}

#[test]
fn help_lists_commands() {
    tokenring()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("drop"))
        .stdout(predicate::str::contains("demo"));
}

#[test]
fn version_is_printed() {
    tokenring()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn run_help_points_memory_users_to_demo() {
    tokenring()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ring stays idle"))
        .stdout(predicate::str::contains("demo --memory"));
}

#[test]
fn send_requires_destination() {
    tokenring()
        .args(["send", "--node", "0", "--payload", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dest"));
}

#[test]
fn missing_config_file_fails() {
    tokenring()
        .args(["--config", "/nonexistent/ring.toml", "run", "--memory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn empty_ring_is_rejected() {
    tokenring()
        .args(["run", "--memory", "-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ring size must be greater than zero"));
}

#[test]
fn invalid_initiator_in_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[ring]\nsize = 2\ninitiator = 5").unwrap();

    tokenring()
        .arg("--config")
        .arg(file.path())
        .args(["demo", "--memory", "--rounds", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("initiator 5 is outside a ring of 2 nodes"));
}
