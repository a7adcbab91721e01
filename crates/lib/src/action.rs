//! Lifecycle actions a submodule can support.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four lifecycle verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
  Build,
  Pack,
  #[serde(alias = "push_local")]
  PushLocal,
  Clean,
}

impl Action {
  pub const ALL: [Action; 4] = [Action::Build, Action::Pack, Action::PushLocal, Action::Clean];

  /// Returns the kebab-case name used on the command line and in config files.
  pub const fn as_str(&self) -> &'static str {
    match self {
      Action::Build => "build",
      Action::Pack => "pack",
      Action::PushLocal => "push-local",
      Action::Clean => "clean",
    }
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}' (expected one of: build, pack, push-local, clean)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
  type Err = ParseActionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "build" => Ok(Action::Build),
      "pack" => Ok(Action::Pack),
      "push-local" | "push_local" => Ok(Action::PushLocal),
      "clean" => Ok(Action::Clean),
      other => Err(ParseActionError(other.to_string())),
    }
  }
}
