//! Implementation of the `stratum plan` command and of `--dry-run`.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use stratum_lib::Action;
use stratum_lib::config::Workspace;
use stratum_lib::execute::CommandDispatcher;
use stratum_lib::graph::QualifiedName;
use stratum_lib::plan::{ExecutionPlan, Step};

use super::{Context, resolve_plan};
use crate::output::{print_info, print_json, symbols};

#[derive(Serialize)]
struct PlanView<'a> {
  action: Action,
  steps: Vec<StepView<'a>>,
}

#[derive(Serialize)]
struct StepView<'a> {
  #[serde(skip)]
  step: &'a Step,
  submodule: &'a QualifiedName,
  action: Action,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  publish: bool,
  dir: &'a Path,
  command: String,
}

pub fn cmd_plan(ctx: &Context, action: Action, targets: &[String]) -> Result<()> {
  let workspace = ctx.load()?;
  let plan = resolve_plan(&workspace, action, targets)?;
  print_plan(ctx, &workspace, &plan)
}

/// Print `plan` with the command line each step would dispatch.
pub fn print_plan(ctx: &Context, workspace: &Workspace, plan: &ExecutionPlan) -> Result<()> {
  let dispatcher = CommandDispatcher::new(workspace.shell.clone(), workspace.credentials.clone());
  let steps: Vec<StepView<'_>> = plan
    .steps
    .iter()
    .filter_map(|step| {
      let descriptor = workspace.graph.get(&step.submodule)?;
      Some(StepView {
        step,
        submodule: &step.submodule,
        action: step.action,
        publish: step.publish,
        dir: &descriptor.dir,
        command: dispatcher.command_line(descriptor, step),
      })
    })
    .collect();

  if ctx.format.is_json() {
    return print_json(&PlanView {
      action: plan.action,
      steps,
    });
  }

  if steps.is_empty() {
    print_info(&format!("Nothing to {}", plan.action));
    return Ok(());
  }

  print_info(&format!("Plan for {} ({} step(s)):", plan.action, steps.len()));
  for (idx, view) in steps.iter().enumerate() {
    println!(
      "  {:>2}. {} {} {}",
      idx + 1,
      view.step,
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      view.command.if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }

  Ok(())
}
