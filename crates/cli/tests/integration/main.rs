//! CLI integration tests: real configurations, real shell commands.

mod common;
mod plan_tests;
mod run_tests;
