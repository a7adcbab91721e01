//! Implementation of the action verbs: `build`, `pack`, `push-local`, `clean`.
//!
//! Each verb loads the workspace, expands the targets into one plan and runs
//! it to completion or first failure. Ctrl-C kills the running command and
//! aborts the rest of the plan.

use anyhow::{Context as _, Result};
use serde_json::json;
use tracing::debug;

use stratum_lib::Action;
use stratum_lib::execute::{CommandDispatcher, ExecutionResult, Orchestrator, PlanStatus, StepStatus};
use stratum_lib::plan::ExecutionPlan;

use super::plan::print_plan;
use super::{Context, resolve_plan};
use crate::output::{format_duration, print_error, print_info, print_json, print_step_line, print_success, print_warning};

pub fn cmd_run(ctx: &Context, action: Action, targets: &[String], dry_run: bool) -> Result<i32> {
  let workspace = ctx.load()?;
  let plan = resolve_plan(&workspace, action, targets)?;

  if dry_run {
    print_plan(ctx, &workspace, &plan)?;
    return Ok(0);
  }

  // JSON mode reserves stdout for the result document.
  let quiet = ctx.quiet || ctx.format.is_json();
  let dispatcher = CommandDispatcher::new(workspace.shell.clone(), workspace.credentials.clone()).quiet(quiet);
  let orchestrator = Orchestrator::new(&workspace.graph, dispatcher);

  if !ctx.format.is_json() && !plan.is_empty() {
    print_info(&format!("Running {} ({} step(s))", action, plan.len()));
  }

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;
  let result = rt.block_on(orchestrator.execute_until(&plan, interrupted()));

  if ctx.format.is_json() {
    print_json(&json!({
      "action": plan.action,
      "exit_code": result.exit_code(),
      "status": result.status,
      "steps": result.steps,
    }))?;
  } else {
    print_summary(&plan, &result, quiet);
  }

  Ok(result.exit_code())
}

/// Resolves on Ctrl-C. If no handler can be installed it never resolves.
async fn interrupted() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    debug!(error = %e, "ctrl-c handler unavailable");
    std::future::pending::<()>().await;
  }
}

fn print_summary(plan: &ExecutionPlan, result: &ExecutionResult, quiet: bool) {
  if result.steps.is_empty() {
    print_info(&format!("Nothing to {}", plan.action));
    return;
  }

  println!();
  for outcome in &result.steps {
    print_step_line(&outcome.step.to_string(), &outcome.status, outcome.duration);
  }
  println!();

  let total = format_duration(result.total_duration());
  match &result.status {
    PlanStatus::Succeeded => {
      print_success(&format!("{} finished: {} step(s) in {}", plan.action, result.succeeded(), total));
    }
    PlanStatus::Failed { step, exit_code } => {
      // Quiet runs did not echo command output.
      if quiet && let Some(failed) = result.steps.iter().find(|o| matches!(o.status, StepStatus::Failed { .. })) {
        for line in failed.output.lines() {
          eprintln!("  {}", line);
        }
      }
      let code = exit_code.map_or_else(|| "no exit code".to_string(), |c| format!("exit code {c}"));
      print_error(&format!(
        "{} failed at {} ({}); {} step(s) skipped",
        plan.action,
        step,
        code,
        result.skipped()
      ));
    }
    PlanStatus::Aborted => {
      print_warning(&format!("{} aborted; {} step(s) skipped", plan.action, result.skipped()));
    }
  }
}
