//! Declarative configuration loading.
//!
//! A `stratum.toml` file lists products and their submodules. Loading parses
//! the file, registers every submodule with a [`GraphBuilder`] in file order,
//! and finalizes the graph, so a malformed configuration fails before any
//! command is dispatched.

mod types;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::credentials::Credentials;
use crate::graph::{GraphBuilder, GraphError, ProductGraph, QualifiedName, SubmoduleDescriptor};
use crate::platform::ShellStrategy;

pub use types::{CommandTable, Config, ProductConfig, RegistryConfig, SubmoduleConfig};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "stratum.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error(transparent)]
  Graph(#[from] GraphError),
}

/// Everything needed to plan and execute, resolved once at startup.
#[derive(Debug)]
pub struct Workspace {
  /// Directory the configuration file lives in.
  pub root: PathBuf,
  pub graph: ProductGraph,
  pub shell: ShellStrategy,
  pub credentials: Credentials,
}

impl Config {
  /// Parse configuration text. `origin` is only used in error messages.
  pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
      path: origin.to_path_buf(),
      source,
    })
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&text, path)
  }

  /// Build the finalized product graph, resolving directories against `root`.
  pub fn to_graph(&self, root: &Path) -> Result<ProductGraph, GraphError> {
    let mut builder = GraphBuilder::new();
    let mut seen_products = HashSet::new();

    for product in &self.products {
      if product.name.is_empty() || product.name.contains('/') {
        return Err(GraphError::Configuration(format!(
          "invalid product name '{}'",
          product.name
        )));
      }
      if !seen_products.insert(product.name.as_str()) {
        return Err(GraphError::Configuration(format!(
          "product '{}' is declared twice",
          product.name
        )));
      }

      builder.add_product(&product.name);
      let product_dir = root.join(product.dir.clone().unwrap_or_else(|| PathBuf::from(&product.name)));

      for submodule in &product.submodules {
        let prerequisites = submodule
          .prerequisites
          .iter()
          .map(|reference| QualifiedName::parse(reference, Some(&product.name)))
          .collect::<Result<Vec<_>, _>>()?;

        let mut descriptor = SubmoduleDescriptor::new(&product.name, &submodule.name)
          .with_prerequisites(prerequisites)
          .with_actions(submodule.actions.iter().copied())
          .with_dir(product_dir.join(submodule.dir.clone().unwrap_or_else(|| PathBuf::from(&submodule.name))));
        if let Some(output_dir) = &submodule.output_dir {
          descriptor.output_dir = output_dir.clone();
        }
        descriptor.commands = submodule.commands.merged_over(&self.commands);
        descriptor.env = submodule.env.clone();

        builder.add_submodule(descriptor)?;
      }
    }

    builder.finalize()
  }

  pub fn shell_strategy(&self) -> ShellStrategy {
    match &self.shell {
      Some(program) => ShellStrategy::with_program(program),
      None => ShellStrategy::detect(),
    }
  }
}

/// Load a configuration file and resolve it into a [`Workspace`].
pub fn load_workspace(path: &Path) -> Result<Workspace, ConfigError> {
  let config = Config::from_file(path)?;

  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
    _ => PathBuf::from("."),
  };
  let root = dunce::canonicalize(&parent).map_err(|source| ConfigError::Io { path: parent, source })?;

  let graph = config.to_graph(&root)?;
  let credentials = Credentials::from_env(&config.registry.username_env, &config.registry.password_env);

  info!(
    config = %path.display(),
    products = graph.products().len(),
    submodules = graph.len(),
    "loaded workspace"
  );

  Ok(Workspace {
    root,
    graph,
    shell: config.shell_strategy(),
    credentials,
  })
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use tempfile::TempDir;

  use super::*;
  use crate::action::Action;

  const SAMPLE: &str = r#"
[commands]
build = "bal build"

[[products]]
name = "core"

[[products.submodules]]
name = "native"
actions = ["build", "pack", "clean"]
commands = { build = "./gradlew build" }

[[products.submodules]]
name = "ballerina"
actions = ["build", "pack", "push-local", "clean"]
prerequisites = ["native"]

[[products]]
name = "dicom"
dir = "modules/dicom"

[[products.submodules]]
name = "ballerina"
dir = "bal"
actions = ["build"]
prerequisites = ["core/native"]
output_dir = "out"
env = { JAVA_OPTS = "-Xmx1g" }
"#;

  fn sample_graph() -> ProductGraph {
    Config::parse(SAMPLE, Path::new("stratum.toml"))
      .unwrap()
      .to_graph(Path::new("/ws"))
      .unwrap()
  }

  #[test]
  fn parses_products_in_order() {
    let graph = sample_graph();
    let names: Vec<_> = graph.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["core", "dicom"]);
    assert_eq!(graph.len(), 3);
  }

  #[test]
  fn bare_prerequisites_resolve_within_product() {
    let graph = sample_graph();
    let ballerina = graph.get(&QualifiedName::new("core", "ballerina")).unwrap();
    assert_eq!(ballerina.prerequisites, vec![QualifiedName::new("core", "native")]);
  }

  #[test]
  fn directories_resolve_against_root() {
    let graph = sample_graph();
    let native = graph.get(&QualifiedName::new("core", "native")).unwrap();
    assert_eq!(native.dir, Path::new("/ws").join("core").join("native"));
    assert_eq!(native.output_dir, PathBuf::from("target"));

    let dicom = graph.get(&QualifiedName::new("dicom", "ballerina")).unwrap();
    assert_eq!(dicom.dir, Path::new("/ws").join("modules/dicom").join("bal"));
    assert_eq!(dicom.output_dir, PathBuf::from("out"));
    assert_eq!(dicom.env, BTreeMap::from([("JAVA_OPTS".to_string(), "-Xmx1g".to_string())]));
  }

  #[test]
  fn submodule_commands_override_workspace_defaults() {
    let graph = sample_graph();
    let native = graph.get(&QualifiedName::new("core", "native")).unwrap();
    assert_eq!(native.commands.get(&Action::Build).map(String::as_str), Some("./gradlew build"));
    assert!(!native.commands.contains_key(&Action::Pack));

    let ballerina = graph.get(&QualifiedName::new("core", "ballerina")).unwrap();
    assert_eq!(ballerina.commands.get(&Action::Build).map(String::as_str), Some("bal build"));
  }

  #[test]
  fn unknown_keys_rejected() {
    let err = Config::parse("[[products]]\nname = \"x\"\ncolour = \"red\"\n", Path::new("bad.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
  }

  #[test]
  fn unknown_action_rejected() {
    let text = r#"
[[products]]
name = "x"
[[products.submodules]]
name = "y"
actions = ["deploy"]
"#;
    assert!(matches!(
      Config::parse(text, Path::new("bad.toml")),
      Err(ConfigError::Parse { .. })
    ));
  }

  #[test]
  fn duplicate_product_rejected() {
    let config = Config::parse("[[products]]\nname = \"x\"\n[[products]]\nname = \"x\"\n", Path::new("dup.toml")).unwrap();
    let err = config.to_graph(Path::new("/ws")).unwrap_err();
    assert!(matches!(err, GraphError::Configuration(msg) if msg.contains("declared twice")));
  }

  #[test]
  fn unknown_cross_product_prerequisite_rejected() {
    let text = r#"
[[products]]
name = "x"
[[products.submodules]]
name = "y"
actions = ["build"]
prerequisites = ["nowhere/native"]
"#;
    let err = Config::parse(text, Path::new("c.toml"))
      .unwrap()
      .to_graph(Path::new("/ws"))
      .unwrap_err();
    assert!(matches!(err, GraphError::Configuration(msg) if msg.contains("nowhere/native")));
  }

  #[test]
  fn registry_defaults() {
    let config = Config::parse("", Path::new("empty.toml")).unwrap();
    assert_eq!(config.registry.username_env, "REGISTRY_USERNAME");
    assert_eq!(config.registry.password_env, "REGISTRY_PASSWORD");
    assert!(config.products.is_empty());
  }

  #[test]
  fn configured_shell_overrides_detection() {
    let config = Config::parse("shell = \"bash\"\n", Path::new("s.toml")).unwrap();
    assert_eq!(config.shell_strategy().program, "bash");
  }

  #[test]
  fn load_workspace_reports_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = load_workspace(&temp.path().join(CONFIG_FILE)).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }

  #[test]
  fn load_workspace_resolves_root() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILE);
    std::fs::write(&path, SAMPLE).unwrap();

    let workspace = load_workspace(&path).unwrap();
    let root = dunce::canonicalize(temp.path()).unwrap();
    assert_eq!(workspace.root, root);
    let native = workspace.graph.get(&QualifiedName::new("core", "native")).unwrap();
    assert_eq!(native.dir, root.join("core").join("native"));
  }
}
