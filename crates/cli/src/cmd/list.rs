//! Implementation of the `stratum list` command.

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use stratum_lib::Action;
use stratum_lib::graph::{ProductGraph, QualifiedName};

use super::Context;
use crate::output::print_json;

#[derive(Serialize)]
struct ProductView<'a> {
  name: &'a str,
  submodules: Vec<SubmoduleView<'a>>,
}

#[derive(Serialize)]
struct SubmoduleView<'a> {
  name: &'a QualifiedName,
  dir: String,
  actions: Vec<Action>,
  prerequisites: &'a [QualifiedName],
  dependents: Vec<&'a QualifiedName>,
}

pub fn cmd_list(ctx: &Context) -> Result<()> {
  let workspace = ctx.load()?;
  let products = collect(&workspace.graph);

  if ctx.format.is_json() {
    return print_json(&products);
  }

  for product in &products {
    println!("{}", product.name.if_supports_color(Stream::Stdout, |s| s.bold()));
    for submodule in &product.submodules {
      let actions: Vec<&str> = submodule.actions.iter().map(|a| a.as_str()).collect();
      println!(
        "  {} {}",
        submodule.name.submodule,
        format!("[{}]", actions.join(", ")).if_supports_color(Stream::Stdout, |s| s.dimmed())
      );
      println!("    requires: {}", join_names(submodule.prerequisites.iter()));
      println!("    used by:  {}", join_names(submodule.dependents.iter().copied()));
    }
  }

  Ok(())
}

fn collect(graph: &ProductGraph) -> Vec<ProductView<'_>> {
  graph
    .products()
    .iter()
    .map(|product| ProductView {
      name: &product.name,
      submodules: product
        .submodules
        .iter()
        .filter_map(|name| graph.get(name))
        .map(|descriptor| SubmoduleView {
          name: &descriptor.name,
          dir: descriptor.dir.display().to_string(),
          actions: descriptor.actions.iter().copied().collect(),
          prerequisites: &descriptor.prerequisites,
          dependents: graph.dependents(&descriptor.name),
        })
        .collect(),
    })
    .collect()
}

fn join_names<'a>(names: impl Iterator<Item = &'a QualifiedName>) -> String {
  let names: Vec<String> = names.map(ToString::to_string).collect();
  if names.is_empty() { "-".to_string() } else { names.join(", ") }
}
