//! Planning through the CLI: `plan`, `--dry-run`, `list` and planning errors.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_steps_in_dependency_order() {
  let env = TestEnv::layered();

  let output = env.cmd().args(["plan", "build", "dicom/ballerina"]).output().unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  let order: Vec<usize> = ["core/native (build)", "dicom/native (build)", "dicom/ballerina (build)"]
    .iter()
    .map(|step| stdout.find(step).unwrap_or_else(|| panic!("{step} missing from:\n{stdout}")))
    .collect();
  assert!(order.windows(2).all(|w| w[0] < w[1]), "{stdout}");
  assert!(!stdout.contains("core/ballerina"));
}

#[test]
fn plan_json_shows_publish_step_and_commands() {
  let env = TestEnv::layered();

  let output = env
    .cmd()
    .args(["--output", "json", "plan", "push-local", "core/ballerina"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(plan["action"], "push-local");
  let steps = plan["steps"].as_array().unwrap();
  let pairs: Vec<(String, String)> = steps
    .iter()
    .map(|s| (s["submodule"].as_str().unwrap().to_string(), s["action"].as_str().unwrap().to_string()))
    .collect();
  assert_eq!(
    pairs,
    vec![
      ("core/native".to_string(), "build".to_string()),
      ("core/ballerina".to_string(), "build".to_string()),
      ("core/ballerina".to_string(), "pack".to_string()),
    ]
  );
  assert_eq!(steps[2]["publish"], true);
  assert!(steps[2]["command"].as_str().unwrap().starts_with("echo push"));
  assert!(steps[0].get("publish").is_none());
}

#[test]
fn pack_plan_does_not_build_the_target() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["plan", "pack", "core/ballerina"])
    .assert()
    .success()
    .stdout(predicate::str::contains("core/native (build)"))
    .stdout(predicate::str::contains("core/ballerina (pack)"))
    .stdout(predicate::str::contains("core/ballerina (build)").not());
}

#[test]
fn dry_run_dispatches_nothing() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["build", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("4 step(s)"));

  assert!(env.log().is_empty());
}

#[test]
fn product_scope_skips_submodules_without_the_action() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["plan", "pack", "dicom"])
    .assert()
    .success()
    .stdout(predicate::str::contains("dicom/ballerina (pack)"))
    .stdout(predicate::str::contains("dicom/native (pack)").not());
}

#[test]
fn unknown_target_is_a_usage_error() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["build", "core/missing"])
    .assert()
    .code(64)
    .stderr(predicate::str::contains("unknown target 'core/missing'"));

  env.cmd().args(["build", "nowhere"]).assert().code(64);
  assert!(env.log().is_empty());
}

#[test]
fn unsupported_action_is_a_usage_error() {
  let env = TestEnv::layered();

  env
    .cmd()
    .args(["push-local", "core/native"])
    .assert()
    .code(64)
    .stderr(predicate::str::contains("does not support push-local"));
}

#[test]
fn cyclic_configuration_is_a_config_error() {
  let env = TestEnv::new(
    r#"
[[products]]
name = "p"

[[products.submodules]]
name = "a"
actions = ["build"]
prerequisites = ["b"]

[[products.submodules]]
name = "b"
actions = ["build"]
prerequisites = ["a"]
"#,
    &["p/a", "p/b"],
  );

  env
    .cmd()
    .args(["plan", "build"])
    .assert()
    .code(78)
    .stderr(predicate::str::contains("p/a -> p/b -> p/a"));
}

#[test]
fn unknown_config_key_is_a_config_error() {
  let env = TestEnv::new("[[products]]\nname = \"p\"\ncolour = \"blue\"\n", &[]);

  env
    .cmd()
    .arg("list")
    .assert()
    .code(78)
    .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn list_shows_prerequisites_and_dependents() {
  let env = TestEnv::layered();

  let output = env.cmd().args(["--output", "json", "list"]).output().unwrap();
  assert!(output.status.success());

  let products: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let core_native = &products[0]["submodules"][0];
  assert_eq!(core_native["name"], "core/native");
  assert_eq!(core_native["prerequisites"], serde_json::json!([]));
  assert_eq!(core_native["dependents"], serde_json::json!(["core/ballerina", "dicom/native"]));
  assert_eq!(products[1]["submodules"][1]["prerequisites"], serde_json::json!(["dicom/native"]));

  env
    .cmd()
    .arg("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("used by:  core/ballerina, dicom/native"));
}
