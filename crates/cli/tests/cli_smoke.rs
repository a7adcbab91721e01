//! CLI smoke tests for stratum.
//!
//! These tests verify that commands run without panicking and return the
//! documented exit codes.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn stratum_cmd() -> Command {
  cargo_bin_cmd!("stratum")
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  stratum_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"))
    .stdout(predicate::str::contains("push-local"));
}

#[test]
fn version_flag_works() {
  stratum_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn subcommand_help_works() {
  for sub in ["build", "pack", "push-local", "clean", "plan", "list", "info"] {
    stratum_cmd().args([sub, "--help"]).assert().success();
  }
}

// =============================================================================
// Argument errors
// =============================================================================

#[test]
fn unknown_action_is_rejected() {
  stratum_cmd()
    .args(["plan", "deploy"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown action 'deploy'"));
}

#[test]
fn missing_config_is_a_config_error() {
  let temp = TempDir::new().unwrap();

  stratum_cmd()
    .current_dir(temp.path())
    .arg("build")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("stratum.toml"));
}

// =============================================================================
// Info
// =============================================================================

#[test]
fn info_works_without_config() {
  let temp = TempDir::new().unwrap();

  stratum_cmd()
    .current_dir(temp.path())
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("Shell"));
}

#[test]
fn info_honours_configured_shell() {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("stratum.toml"), "shell = \"bash\"\n").unwrap();

  let output = stratum_cmd()
    .current_dir(temp.path())
    .args(["--output", "json", "info"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(info["shell"]["program"], "bash");
  assert_eq!(info["shell"]["args"], serde_json::json!(["-c"]));
}
