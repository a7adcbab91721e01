//! stratum-lib: task-dependency engine for layered multi-product builds.
//!
//! Products are made of submodules (native interop, compiler plugin, language
//! binding) whose build steps must run in dependency order. This crate
//! provides:
//! - `config`: loading the declarative `stratum.toml`
//! - `graph`: the validated, acyclic submodule graph across all products
//! - `plan`: expanding a requested action into ordered steps
//! - `execute`: dispatching steps as shell commands with fail-fast semantics

pub mod action;
pub mod config;
pub mod credentials;
pub mod error;
pub mod execute;
pub mod graph;
pub mod plan;
pub mod platform;

pub use action::Action;
pub use error::{Error, Result};
