//! Crate-level error and the exit codes reserved for engine errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::plan::PlanError;

/// Exit code for configuration and graph errors (`EX_CONFIG`).
pub const EXIT_CONFIG: i32 = 78;

/// Exit code for unknown targets and unsupported actions (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// Any error raised before a plan starts executing.
#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Plan(#[from] PlanError),
}

impl Error {
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::Config(_) | Error::Graph(_) => EXIT_CONFIG,
      Error::Plan(_) => EXIT_USAGE,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
