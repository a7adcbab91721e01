//! Plan execution.
//!
//! The [`Orchestrator`] drives an [`ExecutionPlan`] through the
//! [`CommandDispatcher`] strictly in order:
//! - Each step runs only after the previous one succeeded
//! - The first failure marks every remaining step skipped and stops
//! - Completed steps are left in place; nothing is rolled back

pub mod dispatcher;
pub mod types;

use std::future::Future;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::graph::ProductGraph;
use crate::plan::ExecutionPlan;

pub use dispatcher::{CommandDispatcher, CommandOutput, Completion};
pub use types::{
  EXIT_ABORTED, EXIT_STEP_NO_CODE, ExecuteError, ExecutionResult, PlanStatus, StepOutcome, StepStatus,
};

/// Runs plans against a finalized graph, one step at a time.
pub struct Orchestrator<'g> {
  graph: &'g ProductGraph,
  dispatcher: CommandDispatcher,
}

impl<'g> Orchestrator<'g> {
  pub fn new(graph: &'g ProductGraph, dispatcher: CommandDispatcher) -> Self {
    Self { graph, dispatcher }
  }

  /// Execute every step of `plan` in order with fail-fast semantics.
  pub async fn execute(&self, plan: &ExecutionPlan) -> ExecutionResult {
    self.execute_until(plan, std::future::pending()).await
  }

  /// Like [`execute`](Self::execute), but stops when `cancel` resolves.
  ///
  /// The running step's process is killed and recorded `Aborted`, every
  /// later step `Skipped`, and the aggregate status is `Aborted`.
  pub async fn execute_until<F>(&self, plan: &ExecutionPlan, cancel: F) -> ExecutionResult
  where
    F: Future<Output = ()>,
  {
    info!(action = %plan.action, steps = plan.len(), "starting plan execution");

    let mut steps: Vec<StepOutcome> = plan.steps.iter().cloned().map(StepOutcome::pending).collect();
    let mut status = PlanStatus::Succeeded;

    tokio::pin!(cancel);

    for idx in 0..steps.len() {
      let step = steps[idx].step.clone();
      steps[idx].status = StepStatus::Running;
      info!(
        submodule = %step.submodule,
        action = %step.action,
        publish = step.publish,
        position = idx + 1,
        total = plan.len(),
        "running step"
      );

      let started = Instant::now();
      let dispatched = match self.graph.get(&step.submodule) {
        Some(descriptor) => self.dispatcher.run_until(descriptor, &step, cancel.as_mut()).await,
        None => Err(ExecuteError::UnknownSubmodule(step.submodule.clone())),
      };

      let outcome = &mut steps[idx];
      outcome.duration = started.elapsed();

      match dispatched {
        Ok(CommandOutput {
          command,
          completion,
          output,
        }) => {
          outcome.command = Some(command);
          outcome.output = output;
          match completion {
            Completion::Exited { success: true, .. } => {
              info!(submodule = %step.submodule, action = %step.action, "step succeeded");
              outcome.status = StepStatus::Succeeded;
            }
            Completion::Exited { exit_code, .. } => {
              error!(submodule = %step.submodule, action = %step.action, exit_code = ?exit_code, "step failed");
              outcome.status = StepStatus::Failed { exit_code };
              status = PlanStatus::Failed { step, exit_code };
            }
            Completion::Cancelled => {
              warn!(submodule = %step.submodule, action = %step.action, "step aborted");
              outcome.status = StepStatus::Aborted;
              status = PlanStatus::Aborted;
            }
          }
        }
        Err(e) => {
          error!(submodule = %step.submodule, action = %step.action, error = %e, "step could not be dispatched");
          outcome.output = e.to_string();
          outcome.status = StepStatus::Failed { exit_code: None };
          status = PlanStatus::Failed { step, exit_code: None };
        }
      }

      if status != PlanStatus::Succeeded {
        for skipped in &mut steps[idx + 1..] {
          warn!(submodule = %skipped.step.submodule, action = %skipped.step.action, "skipping step after earlier failure");
          skipped.status = StepStatus::Skipped;
        }
        break;
      }
    }

    let result = ExecutionResult { status, steps };

    info!(
      succeeded = result.succeeded(),
      failed = result.failed(),
      skipped = result.skipped(),
      "plan execution complete"
    );

    result
  }
}
