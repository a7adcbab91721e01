use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::action::Action;
use crate::graph::QualifiedName;

/// One (submodule, action) pair in a plan.
///
/// `publish` marks the terminal Pack of a push-local request; it is dispatched
/// with the submodule's push-local command, which packs and then publishes to
/// the local repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Step {
  pub submodule: QualifiedName,
  pub action: Action,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub publish: bool,
}

impl Step {
  pub fn new(submodule: QualifiedName, action: Action) -> Self {
    Self {
      submodule,
      action,
      publish: false,
    }
  }

  /// The pack-then-publish step that ends a push-local plan.
  pub fn publishing(submodule: QualifiedName) -> Self {
    Self {
      submodule,
      action: Action::Pack,
      publish: true,
    }
  }

  /// The action whose command line is dispatched for this step.
  pub fn command_action(&self) -> Action {
    if self.publish { Action::PushLocal } else { self.action }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.publish {
      write!(f, "{} ({} + publish)", self.submodule, self.action)
    } else {
      write!(f, "{} ({})", self.submodule, self.action)
    }
  }
}

/// Ordered, deduplicated steps for one requested action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
  /// The action that was requested.
  pub action: Action,
  pub steps: Vec<Step>,
}

impl ExecutionPlan {
  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// The plan as bare (submodule, action) pairs.
  pub fn pairs(&self) -> Vec<(&QualifiedName, Action)> {
    self.steps.iter().map(|s| (&s.submodule, s.action)).collect()
  }
}

/// What a requested action applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  /// Every submodule in every product.
  All,
  /// Every submodule of one product.
  Product(String),
  Submodule(QualifiedName),
}

impl Target {
  /// `product` selects a whole product, `product/submodule` a single submodule.
  pub fn parse(s: &str) -> Result<Self, PlanError> {
    if s.contains('/') {
      QualifiedName::parse(s, None)
        .map(Target::Submodule)
        .map_err(|_| PlanError::UnknownTarget(s.to_string()))
    } else if s.is_empty() {
      Err(PlanError::UnknownTarget(s.to_string()))
    } else {
      Ok(Target::Product(s.to_string()))
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::All => write!(f, "all"),
      Target::Product(product) => write!(f, "{product}"),
      Target::Submodule(name) => write!(f, "{name}"),
    }
  }
}

/// Errors raised while planning, before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("unknown target '{0}'")]
  UnknownTarget(String),

  #[error("{target} does not support {action}")]
  UnsupportedAction { target: QualifiedName, action: Action },
}
