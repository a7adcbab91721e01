//! Types for step dispatch and plan execution.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::graph::QualifiedName;
use crate::plan::Step;

/// Exit code reported when the plan was interrupted.
pub const EXIT_ABORTED: i32 = 130;

/// Exit code reported for a failed step that has none of its own
/// (killed by a signal, or never spawned).
pub const EXIT_STEP_NO_CODE: i32 = 1;

/// Errors that prevent a step's command from running at all.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The step references a submodule the graph does not contain.
  #[error("submodule not found: {0}")]
  UnknownSubmodule(QualifiedName),

  /// The submodule's working directory does not exist.
  #[error("working directory does not exist: {}", .0.display())]
  MissingDirectory(PathBuf),

  /// The shell could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// I/O error while waiting on the process.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// Per-step state: `Pending -> Running -> {Succeeded, Failed}`, or
/// `Pending -> Skipped` once an earlier step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
  Pending,
  Running,
  Succeeded,
  Failed { exit_code: Option<i32> },
  Skipped,
  /// Interrupted by cancellation while running.
  Aborted,
}

impl StepStatus {
  pub fn is_terminal(&self) -> bool {
    !matches!(self, StepStatus::Pending | StepStatus::Running)
  }
}

/// Outcome of one planned step.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
  pub step: Step,
  #[serde(flatten)]
  pub status: StepStatus,
  /// The command line that was dispatched, if the step got that far.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub command: Option<String>,
  /// Captured stdout and stderr, interleaved by line.
  #[serde(skip_serializing_if = "String::is_empty")]
  pub output: String,
  #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
  pub duration: Duration,
}

impl StepOutcome {
  pub fn pending(step: Step) -> Self {
    Self {
      step,
      status: StepStatus::Pending,
      command: None,
      output: String::new(),
      duration: Duration::ZERO,
    }
  }
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(duration.as_millis() as u64)
}

/// Aggregate status of a plan execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlanStatus {
  Succeeded,
  /// The first failing step; every later step was skipped.
  Failed { step: Step, exit_code: Option<i32> },
  Aborted,
}

/// Result of executing a whole plan.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
  pub status: PlanStatus,
  pub steps: Vec<StepOutcome>,
}

impl ExecutionResult {
  pub fn is_success(&self) -> bool {
    self.status == PlanStatus::Succeeded
  }

  /// Process exit code for this result: 0 on success, the failing step's
  /// code when it has one.
  pub fn exit_code(&self) -> i32 {
    match &self.status {
      PlanStatus::Succeeded => 0,
      PlanStatus::Failed { exit_code, .. } => match exit_code {
        // A zero code can only come from a step that never ran its command.
        Some(code) if *code != 0 => *code,
        _ => EXIT_STEP_NO_CODE,
      },
      PlanStatus::Aborted => EXIT_ABORTED,
    }
  }

  fn count(&self, predicate: impl Fn(&StepStatus) -> bool) -> usize {
    self.steps.iter().filter(|o| predicate(&o.status)).count()
  }

  pub fn succeeded(&self) -> usize {
    self.count(|s| *s == StepStatus::Succeeded)
  }

  pub fn skipped(&self) -> usize {
    self.count(|s| *s == StepStatus::Skipped)
  }

  pub fn failed(&self) -> usize {
    self.count(|s| matches!(s, StepStatus::Failed { .. }))
  }

  pub fn total_duration(&self) -> Duration {
    self.steps.iter().map(|o| o.duration).sum()
  }
}
