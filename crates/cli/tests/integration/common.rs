//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Two products: `core` (native, ballerina) and `dicom` whose native layer
/// depends on `core/native`. Every command appends to `steps.log` at the
/// workspace root.
pub const LAYERED_CONFIG: &str = r#"
[commands]
build = "echo build $(basename $(dirname $PWD))/$(basename $PWD) >> ../../steps.log"
pack = "echo pack $(basename $(dirname $PWD))/$(basename $PWD) >> ../../steps.log"
push_local = "echo push $(basename $(dirname $PWD))/$(basename $PWD) >> ../../steps.log"

[[products]]
name = "core"

[[products.submodules]]
name = "native"
actions = ["build", "pack", "clean"]

[[products.submodules]]
name = "ballerina"
actions = ["build", "pack", "push-local", "clean"]
prerequisites = ["native"]

[[products]]
name = "dicom"

[[products.submodules]]
name = "native"
actions = ["build", "clean"]
prerequisites = ["core/native"]

[[products.submodules]]
name = "ballerina"
actions = ["build", "pack", "push-local", "clean"]
prerequisites = ["native"]
"#;

pub const LAYERED_DIRS: &[&str] = &["core/native", "core/ballerina", "dicom/native", "dicom/ballerina"];

/// Isolated workspace in a temporary directory.
pub struct TestEnv {
  pub temp: TempDir,
  pub config_path: PathBuf,
}

impl TestEnv {
  /// Write `config` as `stratum.toml` and create the given submodule directories.
  pub fn new(config: &str, dirs: &[&str]) -> Self {
    let temp = TempDir::new().unwrap();
    for dir in dirs {
      std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    let config_path = temp.path().join("stratum.toml");
    std::fs::write(&config_path, config).unwrap();
    Self { temp, config_path }
  }

  pub fn layered() -> Self {
    Self::new(LAYERED_CONFIG, LAYERED_DIRS)
  }

  /// A `stratum` command pointed at this workspace's configuration.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("stratum");
    cmd.current_dir(self.temp.path()).arg("--config").arg(&self.config_path);
    cmd
  }

  /// Lines appended to `steps.log` by the dispatched commands.
  pub fn log(&self) -> Vec<String> {
    std::fs::read_to_string(self.temp.path().join("steps.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }
}
