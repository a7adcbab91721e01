//! Registry credentials passed through to dispatched commands.
//!
//! Values are read once from the environment and handed to every command
//! under the same variable names. They are never inspected or logged.

use std::fmt;

use tracing::debug;

pub const DEFAULT_USERNAME_ENV: &str = "REGISTRY_USERNAME";
pub const DEFAULT_PASSWORD_ENV: &str = "REGISTRY_PASSWORD";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
  vars: Vec<(String, String)>,
}

impl Credentials {
  /// Read the named variables; unset or non-UTF-8 variables are omitted.
  pub fn from_env(username_env: &str, password_env: &str) -> Self {
    let vars: Vec<(String, String)> = [username_env, password_env]
      .into_iter()
      .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
      .collect();

    debug!(
      present = ?vars.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
      "loaded registry credentials"
    );

    Self { vars }
  }

  /// Environment pairs to set on each dispatched command.
  pub fn env(&self) -> impl Iterator<Item = (&str, &str)> {
    self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn is_empty(&self) -> bool {
    self.vars.is_empty()
  }
}

impl fmt::Debug for Credentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map()
      .entries(self.vars.iter().map(|(name, _)| (name, "<redacted>")))
      .finish()
  }
}
