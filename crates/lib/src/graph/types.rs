//! Types describing products, submodules and graph errors.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::action::Action;

/// Globally unique `product/submodule` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
  pub product: String,
  pub submodule: String,
}

impl QualifiedName {
  pub fn new(product: impl Into<String>, submodule: impl Into<String>) -> Self {
    Self {
      product: product.into(),
      submodule: submodule.into(),
    }
  }

  /// Parse a `product/submodule` reference.
  ///
  /// A bare `submodule` resolves against `default_product` when one is given.
  pub fn parse(reference: &str, default_product: Option<&str>) -> Result<Self, GraphError> {
    match reference.split_once('/') {
      Some((product, submodule)) if !product.is_empty() && !submodule.is_empty() && !submodule.contains('/') => {
        Ok(Self::new(product, submodule))
      }
      None if !reference.is_empty() => match default_product {
        Some(product) => Ok(Self::new(product, reference)),
        None => Err(GraphError::Configuration(format!(
          "reference '{reference}' must be qualified as product/submodule"
        ))),
      },
      _ => Err(GraphError::Configuration(format!("malformed submodule reference '{reference}'"))),
    }
  }
}

impl fmt::Display for QualifiedName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.product, self.submodule)
  }
}

impl Serialize for QualifiedName {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Static description of one submodule (the ModuleDescriptor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmoduleDescriptor {
  pub name: QualifiedName,
  /// Prerequisites in declaration order.
  pub prerequisites: Vec<QualifiedName>,
  pub actions: BTreeSet<Action>,
  /// Working directory for dispatched commands.
  pub dir: PathBuf,
  /// Directory removed by Clean, relative to `dir`.
  pub output_dir: PathBuf,
  /// Per-action command lines overriding the built-in defaults.
  pub commands: BTreeMap<Action, String>,
  /// Extra environment for dispatched commands.
  pub env: BTreeMap<String, String>,
}

impl SubmoduleDescriptor {
  /// A descriptor with no prerequisites, no actions, and `product/name` as its directory.
  pub fn new(product: impl Into<String>, name: impl Into<String>) -> Self {
    let name = QualifiedName::new(product, name);
    let dir = PathBuf::from(&name.product).join(&name.submodule);
    Self {
      name,
      prerequisites: Vec::new(),
      actions: BTreeSet::new(),
      dir,
      output_dir: PathBuf::from("target"),
      commands: BTreeMap::new(),
      env: BTreeMap::new(),
    }
  }

  pub fn with_prerequisites(mut self, prerequisites: impl IntoIterator<Item = QualifiedName>) -> Self {
    self.prerequisites = prerequisites.into_iter().collect();
    self
  }

  pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
    self.actions = actions.into_iter().collect();
    self
  }

  pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.dir = dir.into();
    self
  }

  pub fn with_command(mut self, action: Action, command: impl Into<String>) -> Self {
    self.commands.insert(action, command.into());
    self
  }

  pub fn supports(&self, action: Action) -> bool {
    self.actions.contains(&action)
  }
}

/// A top-level deliverable and its submodules in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
  pub name: String,
  pub submodules: Vec<QualifiedName>,
}

/// Errors raised while constructing or finalizing a [`ProductGraph`](super::ProductGraph).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  /// Bad or missing submodule or prerequisite reference.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// Prerequisite edges form a cycle; `chain` starts and ends on the same submodule.
  #[error("cyclic dependency: {}", format_chain(.chain))]
  CyclicDependency { chain: Vec<QualifiedName> },
}

fn format_chain(chain: &[QualifiedName]) -> String {
  chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}
