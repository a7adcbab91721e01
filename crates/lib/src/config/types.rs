//! Serde schema of the `stratum.toml` configuration file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::action::Action;
use crate::credentials::{DEFAULT_PASSWORD_ENV, DEFAULT_USERNAME_ENV};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
  /// Shell program overriding the host default (`sh` or `cmd`).
  #[serde(default)]
  pub shell: Option<String>,

  #[serde(default)]
  pub registry: RegistryConfig,

  /// Workspace-wide command lines, overridable per submodule.
  #[serde(default)]
  pub commands: CommandTable,

  #[serde(default)]
  pub products: Vec<ProductConfig>,
}

/// Names of the environment variables holding registry credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
  #[serde(default = "default_username_env")]
  pub username_env: String,
  #[serde(default = "default_password_env")]
  pub password_env: String,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      username_env: default_username_env(),
      password_env: default_password_env(),
    }
  }
}

fn default_username_env() -> String {
  DEFAULT_USERNAME_ENV.to_string()
}

fn default_password_env() -> String {
  DEFAULT_PASSWORD_ENV.to_string()
}

/// Optional command line per action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandTable {
  pub build: Option<String>,
  pub pack: Option<String>,
  #[serde(alias = "push-local")]
  pub push_local: Option<String>,
  pub clean: Option<String>,
}

impl CommandTable {
  pub fn get(&self, action: Action) -> Option<&str> {
    match action {
      Action::Build => self.build.as_deref(),
      Action::Pack => self.pack.as_deref(),
      Action::PushLocal => self.push_local.as_deref(),
      Action::Clean => self.clean.as_deref(),
    }
  }

  /// Entries of `self`, falling back to `defaults` where unset.
  pub fn merged_over(&self, defaults: &CommandTable) -> BTreeMap<Action, String> {
    Action::ALL
      .into_iter()
      .filter_map(|action| {
        self
          .get(action)
          .or_else(|| defaults.get(action))
          .map(|cmd| (action, cmd.to_string()))
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductConfig {
  pub name: String,
  /// Product directory relative to the config file; defaults to `name`.
  #[serde(default)]
  pub dir: Option<PathBuf>,
  #[serde(default)]
  pub submodules: Vec<SubmoduleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmoduleConfig {
  pub name: String,
  /// Submodule directory relative to the product directory; defaults to `name`.
  #[serde(default)]
  pub dir: Option<PathBuf>,
  pub actions: Vec<Action>,
  /// `name` within the same product, or `product/name`.
  #[serde(default)]
  pub prerequisites: Vec<String>,
  /// Directory removed by clean, relative to `dir`.
  #[serde(default)]
  pub output_dir: Option<PathBuf>,
  #[serde(default)]
  pub commands: CommandTable,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
}
