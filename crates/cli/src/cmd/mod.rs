mod info;
mod list;
mod plan;
mod run;

use std::path::PathBuf;

use anyhow::Result;

use stratum_lib::Action;
use stratum_lib::config::{Workspace, load_workspace};
use stratum_lib::plan::{ExecutionPlan, Target, plan_targets};

use crate::output::OutputFormat;

pub use info::cmd_info;
pub use list::cmd_list;
pub use plan::cmd_plan;
pub use run::cmd_run;

/// Options shared by every command.
pub struct Context {
  pub config: PathBuf,
  pub quiet: bool,
  pub format: OutputFormat,
}

impl Context {
  /// Load the workspace, keeping the engine error so its exit code survives.
  pub fn load(&self) -> Result<Workspace> {
    load_workspace(&self.config).map_err(|e| stratum_lib::Error::from(e).into())
  }
}

/// Parse CLI target arguments and expand them into one plan.
///
/// No arguments selects every submodule.
pub fn resolve_plan(workspace: &Workspace, action: Action, args: &[String]) -> Result<ExecutionPlan> {
  let targets = if args.is_empty() {
    vec![Target::All]
  } else {
    args
      .iter()
      .map(|arg| Target::parse(arg))
      .collect::<Result<Vec<_>, _>>()
      .map_err(stratum_lib::Error::from)?
  };

  Ok(plan_targets(&workspace.graph, action, &targets).map_err(stratum_lib::Error::from)?)
}
