//! Task planning: expand a requested action on a target into an ordered,
//! deduplicated sequence of (submodule, action) steps.

mod types;

use std::collections::HashSet;

use tracing::debug;

use crate::action::Action;
use crate::graph::{ProductGraph, QualifiedName};

pub use types::{ExecutionPlan, PlanError, Step, Target};

/// Compute the execution plan for `action` on a single submodule.
///
/// Prerequisites are expanded post-order in declaration order, so a shared
/// prerequisite lands at the earliest position any dependent demands it.
///
/// - Build: prerequisites' Build, then the target's Build
/// - Pack: prerequisites' Build closure, then the target's Pack
/// - PushLocal: the Build closure including the target, then a publishing Pack of the target
/// - Clean: the target alone
///
/// # Errors
///
/// - `UnknownTarget` if `target` is not in the graph
/// - `UnsupportedAction` if the target does not declare `action`
pub fn plan(graph: &ProductGraph, action: Action, target: &QualifiedName) -> Result<ExecutionPlan, PlanError> {
  let mut planner = Planner::new(graph);
  planner.expand(action, target)?;
  Ok(planner.finish(action))
}

/// Compute one plan covering several targets.
///
/// `All` and `Product` scopes select every submodule that declares `action`,
/// in declaration order; explicit submodule targets must declare it. The
/// per-target expansions are concatenated, keeping the first occurrence of
/// each step.
pub fn plan_targets(graph: &ProductGraph, action: Action, targets: &[Target]) -> Result<ExecutionPlan, PlanError> {
  let mut planner = Planner::new(graph);

  for target in targets {
    match target {
      Target::All => {
        for descriptor in graph.submodules().filter(|d| d.supports(action)) {
          planner.expand(action, &descriptor.name)?;
        }
      }
      Target::Product(product) => {
        let product = graph
          .product(product)
          .ok_or_else(|| PlanError::UnknownTarget(product.clone()))?;
        for name in &product.submodules {
          if graph.get(name).is_some_and(|d| d.supports(action)) {
            planner.expand(action, name)?;
          }
        }
      }
      Target::Submodule(name) => planner.expand(action, name)?,
    }
  }

  Ok(planner.finish(action))
}

struct Planner<'g> {
  graph: &'g ProductGraph,
  steps: Vec<Step>,
  scheduled: HashSet<Step>,
}

impl<'g> Planner<'g> {
  fn new(graph: &'g ProductGraph) -> Self {
    Self {
      graph,
      steps: Vec::new(),
      scheduled: HashSet::new(),
    }
  }

  fn expand(&mut self, action: Action, target: &QualifiedName) -> Result<(), PlanError> {
    let graph = self.graph;
    let descriptor = graph
      .get(target)
      .ok_or_else(|| PlanError::UnknownTarget(target.to_string()))?;

    if !descriptor.supports(action) {
      return Err(PlanError::UnsupportedAction {
        target: target.clone(),
        action,
      });
    }

    match action {
      Action::Build => self.build_closure(target),
      Action::Pack => {
        for prerequisite in &descriptor.prerequisites {
          self.build_closure(prerequisite);
        }
        self.pack(target);
      }
      Action::PushLocal => {
        self.build_closure(target);
        self.push(Step::publishing(target.clone()));
      }
      Action::Clean => self.push(Step::new(target.clone(), Action::Clean)),
    }

    debug!(target = %target, action = %action, steps = self.steps.len(), "expanded target");
    Ok(())
  }

  /// Post-order Build expansion. The graph is acyclic and every prerequisite
  /// supports Build, both checked at finalization.
  fn build_closure(&mut self, name: &QualifiedName) {
    if self.is_built(name) {
      return;
    }
    let step = Step::new(name.clone(), Action::Build);

    let graph = self.graph;
    if let Some(descriptor) = graph.get(name) {
      for prerequisite in &descriptor.prerequisites {
        self.build_closure(prerequisite);
      }
    }
    self.push(step);
  }

  /// A scheduled Build or Pack both leave `name` compiled.
  fn is_built(&self, name: &QualifiedName) -> bool {
    self.scheduled.contains(&Step::new(name.clone(), Action::Build))
      || self.scheduled.contains(&Step::new(name.clone(), Action::Pack))
  }

  /// Schedule a Pack of `name`. An earlier Build of it from another target's
  /// closure becomes the Pack in place, keeping one step per submodule.
  fn pack(&mut self, name: &QualifiedName) {
    let build = Step::new(name.clone(), Action::Build);
    let pack = Step::new(name.clone(), Action::Pack);

    if self.scheduled.remove(&build) {
      if let Some(slot) = self.steps.iter_mut().find(|s| **s == build) {
        *slot = pack.clone();
      }
      self.scheduled.insert(pack);
    } else {
      self.push(pack);
    }
  }

  fn push(&mut self, step: Step) {
    if self.scheduled.insert(step.clone()) {
      self.steps.push(step);
    }
  }

  fn finish(self, action: Action) -> ExecutionPlan {
    ExecutionPlan {
      action,
      steps: self.steps,
    }
  }
}
