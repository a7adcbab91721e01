//! Submodule dependency graph spanning every product.
//!
//! Descriptors are registered through a [`GraphBuilder`]. [`GraphBuilder::finalize`]
//! resolves prerequisite references, rejects cycles, and produces an immutable
//! [`ProductGraph`].

mod types;

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::action::Action;

pub use types::{GraphError, Product, QualifiedName, SubmoduleDescriptor};

/// Collects submodule descriptors before the graph is validated.
#[derive(Debug, Default)]
pub struct GraphBuilder {
  products: Vec<Product>,
  descriptors: Vec<SubmoduleDescriptor>,
  positions: HashMap<QualifiedName, usize>,
}

impl GraphBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a product with no submodules yet. Registering it again is a no-op.
  pub fn add_product(&mut self, name: &str) -> &mut Product {
    let idx = match self.products.iter().position(|p| p.name == name) {
      Some(idx) => idx,
      None => {
        self.products.push(Product {
          name: name.to_string(),
          submodules: Vec::new(),
        });
        self.products.len() - 1
      }
    };
    &mut self.products[idx]
  }

  /// Register a submodule.
  ///
  /// Prerequisites are not checked here since they may point at submodules
  /// registered later; [`finalize`](Self::finalize) resolves them.
  ///
  /// # Errors
  ///
  /// Returns `Configuration` if the name is already taken within its product
  /// or contains a `/`.
  pub fn add_submodule(&mut self, descriptor: SubmoduleDescriptor) -> Result<(), GraphError> {
    let name = &descriptor.name;
    if name.product.is_empty() || name.submodule.is_empty() || name.product.contains('/') || name.submodule.contains('/')
    {
      return Err(GraphError::Configuration(format!("invalid submodule name '{name}'")));
    }
    if self.positions.contains_key(name) {
      return Err(GraphError::Configuration(format!(
        "submodule '{}' is declared twice in product '{}'",
        name.submodule, name.product
      )));
    }

    self.add_product(&name.product).submodules.push(name.clone());
    self.positions.insert(name.clone(), self.descriptors.len());
    self.descriptors.push(descriptor);
    Ok(())
  }

  /// Validate every prerequisite edge and check the whole graph for cycles.
  ///
  /// # Errors
  ///
  /// - `Configuration` if a prerequisite is unknown or does not support Build
  /// - `CyclicDependency` if prerequisite edges form a cycle
  pub fn finalize(self) -> Result<ProductGraph, GraphError> {
    let mut graph = DiGraph::with_capacity(self.descriptors.len(), 0);
    let mut nodes = HashMap::with_capacity(self.descriptors.len());

    // Node indices follow declaration order, so `descriptors[idx.index()]` holds.
    for descriptor in &self.descriptors {
      let idx = graph.add_node(descriptor.name.clone());
      nodes.insert(descriptor.name.clone(), idx);
    }

    for descriptor in &self.descriptors {
      let dependent = nodes[&descriptor.name];
      for prerequisite in &descriptor.prerequisites {
        let Some(&dep_idx) = nodes.get(prerequisite) else {
          return Err(GraphError::Configuration(format!(
            "submodule '{}' declares unknown prerequisite '{}'",
            descriptor.name, prerequisite
          )));
        };
        if !self.descriptors[dep_idx.index()].supports(Action::Build) {
          return Err(GraphError::Configuration(format!(
            "submodule '{}' depends on '{}', which does not support build",
            descriptor.name, prerequisite
          )));
        }
        // Edge from prerequisite to dependent
        graph.update_edge(dep_idx, dependent, ());
      }
    }

    let dag = ProductGraph {
      graph,
      nodes,
      descriptors: self.descriptors,
      products: self.products,
    };

    dag.verify_acyclic()?;

    debug!(
      products = dag.products.len(),
      submodules = dag.descriptors.len(),
      "finalized product graph"
    );

    Ok(dag)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
  White,
  Gray,
  Black,
}

/// Finalized, read-only dependency graph across all products.
#[derive(Debug)]
pub struct ProductGraph {
  graph: DiGraph<QualifiedName, ()>,
  nodes: HashMap<QualifiedName, NodeIndex>,
  descriptors: Vec<SubmoduleDescriptor>,
  products: Vec<Product>,
}

impl ProductGraph {
  /// Depth-first cycle check with white/gray/black marking.
  ///
  /// Roots and prerequisites are visited in declaration order so the reported
  /// chain is deterministic.
  fn verify_acyclic(&self) -> Result<(), GraphError> {
    let mut colors = vec![Color::White; self.descriptors.len()];
    let mut stack = Vec::new();

    for idx in 0..self.descriptors.len() {
      if colors[idx] == Color::White {
        self.visit(idx, &mut colors, &mut stack)?;
      }
    }
    Ok(())
  }

  fn visit(&self, idx: usize, colors: &mut [Color], stack: &mut Vec<usize>) -> Result<(), GraphError> {
    colors[idx] = Color::Gray;
    stack.push(idx);

    for prerequisite in &self.descriptors[idx].prerequisites {
      let next = self.nodes[prerequisite].index();
      match colors[next] {
        Color::White => self.visit(next, colors, stack)?,
        Color::Gray => {
          // Gray nodes are exactly the ones on the stack.
          let start = stack.iter().position(|&i| i == next);
          debug_assert!(start.is_some(), "gray node {next} missing from the DFS stack");
          let start = start.unwrap_or(0);
          let chain = stack[start..]
            .iter()
            .chain(std::iter::once(&next))
            .map(|&i| self.descriptors[i].name.clone())
            .collect();
          return Err(GraphError::CyclicDependency { chain });
        }
        Color::Black => {}
      }
    }

    stack.pop();
    colors[idx] = Color::Black;
    Ok(())
  }

  /// Look up a submodule by qualified name.
  pub fn get(&self, name: &QualifiedName) -> Option<&SubmoduleDescriptor> {
    self.nodes.get(name).map(|idx| &self.descriptors[idx.index()])
  }

  pub fn contains(&self, name: &QualifiedName) -> bool {
    self.nodes.contains_key(name)
  }

  /// Products in declaration order.
  pub fn products(&self) -> &[Product] {
    &self.products
  }

  pub fn product(&self, name: &str) -> Option<&Product> {
    self.products.iter().find(|p| p.name == name)
  }

  /// All submodules in declaration order.
  pub fn submodules(&self) -> impl Iterator<Item = &SubmoduleDescriptor> {
    self.descriptors.iter()
  }

  /// Submodules that list `name` as a direct prerequisite, in declaration order.
  pub fn dependents(&self, name: &QualifiedName) -> Vec<&QualifiedName> {
    let Some(&idx) = self.nodes.get(name) else {
      return Vec::new();
    };

    let mut dependents: Vec<NodeIndex> = self.graph.neighbors_directed(idx, Direction::Outgoing).collect();
    dependents.sort();
    dependents.into_iter().map(|dep| &self.graph[dep]).collect()
  }

  /// Number of submodules across all products.
  pub fn len(&self) -> usize {
    self.descriptors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.descriptors.is_empty()
  }
}
