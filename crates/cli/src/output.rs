//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable durations, and Unicode symbols.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use stratum_lib::execute::StepStatus;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const SKIP: &str = "-";
}

/// Duration rounded to milliseconds, e.g. `1s 250ms`.
pub fn format_duration(duration: Duration) -> String {
  let millis = Duration::from_millis(duration.as_millis() as u64);
  if millis.is_zero() {
    return "0ms".to_string();
  }
  humantime::format_duration(millis).to_string()
}

/// Short label for a step status in the run summary.
pub fn status_label(status: &StepStatus) -> String {
  match status {
    StepStatus::Pending => "pending".to_string(),
    StepStatus::Running => "running".to_string(),
    StepStatus::Succeeded => "succeeded".to_string(),
    StepStatus::Failed { exit_code: Some(code) } => format!("failed (exit {code})"),
    StepStatus::Failed { exit_code: None } => "failed".to_string(),
    StepStatus::Skipped => "skipped".to_string(),
    StepStatus::Aborted => "aborted".to_string(),
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

/// One summary line per step: symbol, step, status and duration.
pub fn print_step_line(step: &str, status: &StepStatus, duration: Duration) {
  let label = status_label(status);
  let timing = match status {
    StepStatus::Skipped | StepStatus::Pending => String::new(),
    _ => format!(" in {}", format_duration(duration)),
  };

  match status {
    StepStatus::Succeeded => println!(
      "  {} {} {}{}",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      step,
      label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      timing
    ),
    StepStatus::Failed { .. } | StepStatus::Aborted => println!(
      "  {} {} {}{}",
      symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
      step,
      label.if_supports_color(Stream::Stdout, |s| s.red()),
      timing
    ),
    _ => println!(
      "  {} {} {}",
      symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      step.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      label.if_supports_color(Stream::Stdout, |s| s.dimmed())
    ),
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
