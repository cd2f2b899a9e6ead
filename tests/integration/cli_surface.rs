//! Integration tests for the command-line surface
//!
//! Help text, version output, and argument validation. These run the binary
//! without a project directory since clap handles them before any command
//! executes.

use predicates::prelude::*;

/// Top-level help lists both subcommands
#[test]
fn test_top_level_help() {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_gantry"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate IDE workspaces from declarative manifests",
        ))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("graph"));
}

/// Generate help documents the focus and cache flags
#[test]
fn test_generate_help() {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_gantry"));
    cmd.arg("generate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--profile"))
        .stdout(predicate::str::contains("--ignore-cache"))
        .stdout(predicate::str::contains("--no-open"))
        .stdout(predicate::str::contains("--output-path"));
}

/// Graph help documents the export flags
#[test]
fn test_graph_help() {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_gantry"));
    cmd.arg("graph")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--output-path"));
}

/// Version flag reports the binary name
#[test]
fn test_version_reports_binary_name() {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_gantry"));
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gantry"));
}

/// Running without a subcommand is a usage error, not a crash
#[test]
fn test_missing_subcommand_is_usage_error() {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_gantry"));
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}
