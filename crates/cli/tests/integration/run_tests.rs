//! Running plans through the CLI against real `sh` commands.
#![cfg(unix)]

use predicates::prelude::*;

use super::common::{LAYERED_DIRS, TestEnv};

#[test]
fn build_runs_prerequisites_first() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["build", "dicom/ballerina"])
    .assert()
    .success()
    .stdout(predicate::str::contains("build finished: 3 step(s)"));

  assert_eq!(
    env.log(),
    vec!["build core/native", "build dicom/native", "build dicom/ballerina"]
  );
}

#[test]
fn push_local_builds_then_publishes_once() {
  let env = TestEnv::layered();

  env.cmd().args(["push-local", "core/ballerina"]).assert().success();

  assert_eq!(
    env.log(),
    vec!["build core/native", "build core/ballerina", "push core/ballerina"]
  );
}

#[test]
fn shared_prerequisite_runs_once_across_targets() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["build", "core/ballerina", "dicom/ballerina"])
    .assert()
    .success();

  let log = env.log();
  assert_eq!(log.iter().filter(|l| *l == "build core/native").count(), 1);
  assert_eq!(log.len(), 4);
}

#[test]
fn failing_step_exit_code_is_propagated() {
  let config = super::common::LAYERED_CONFIG.replace(
    "name = \"native\"\nactions = [\"build\", \"clean\"]",
    "name = \"native\"\nactions = [\"build\", \"clean\"]\ncommands = { build = \"echo native broke >&2; exit 2\" }",
  );
  let env = TestEnv::new(&config, LAYERED_DIRS);

  env
    .cmd()
    .args(["--quiet", "build", "dicom/ballerina"])
    .assert()
    .code(2)
    .stdout(predicate::str::contains("dicom/native (build) failed (exit 2)"))
    .stdout(predicate::str::contains("dicom/ballerina (build) skipped"))
    .stderr(predicate::str::contains("native broke"))
    .stderr(predicate::str::contains("build failed at dicom/native (build) (exit code 2); 1 step(s) skipped"));

  // Completed prerequisites are not rolled back.
  assert_eq!(env.log(), vec!["build core/native"]);
}

#[test]
fn missing_directory_fails_with_exit_one() {
  let env = TestEnv::new(super::common::LAYERED_CONFIG, &["core/native"]);

  env
    .cmd()
    .args(["build", "core/ballerina"])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("core/ballerina (build) failed"));
}

#[test]
fn clean_is_idempotent() {
  let env = TestEnv::layered();
  let output = env.temp.path().join("core/native/target");
  std::fs::create_dir_all(output.join("classes")).unwrap();

  env.cmd().args(["clean", "core/native"]).assert().success();
  assert!(!output.exists());

  env.cmd().args(["clean", "core/native"]).assert().success();
}

#[test]
fn json_output_reports_every_step() {
  let env = TestEnv::layered();

  let output = env
    .cmd()
    .args(["--output", "json", "build", "core"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(result["exit_code"], 0);
  assert_eq!(result["status"]["status"], "succeeded");
  let steps = result["steps"].as_array().unwrap();
  assert_eq!(steps.len(), 2);
  assert!(steps.iter().all(|s| s["status"] == "succeeded"));
  assert!(steps[0]["duration_ms"].is_u64());
}

#[test]
fn empty_selection_succeeds_without_running_anything() {
  let env = TestEnv::new(
    r#"
[[products]]
name = "tools"

[[products.submodules]]
name = "native"
actions = ["build"]
"#,
    &["tools/native"],
  );

  env
    .cmd()
    .args(["pack", "tools"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to pack"));
}
