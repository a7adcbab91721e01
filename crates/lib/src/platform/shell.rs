//! Shell-invocation strategy for dispatched commands.
//!
//! The strategy is chosen once from the host OS: Windows-family hosts wrap
//! command lines in `cmd /C`, every other host in `sh -c`.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::os::Os;

/// Argument convention of a shell program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
  Posix,
  Cmd,
  PowerShell,
}

/// A shell program plus the arguments that precede the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellStrategy {
  pub kind: ShellKind,
  pub program: String,
  pub args: Vec<String>,
}

impl ShellStrategy {
  /// Strategy for the current host.
  pub fn detect() -> Self {
    let strategy = Self::for_os(Os::current());
    debug!(shell = %strategy, "selected shell strategy");
    strategy
  }

  /// Strategy for a given host OS; an undetected OS gets the POSIX wrapper.
  pub fn for_os(os: Option<Os>) -> Self {
    match os {
      Some(os) if os.is_windows_family() => Self::cmd(),
      _ => Self::posix(),
    }
  }

  pub fn posix() -> Self {
    Self {
      kind: ShellKind::Posix,
      program: "sh".to_string(),
      args: vec!["-c".to_string()],
    }
  }

  pub fn cmd() -> Self {
    Self {
      kind: ShellKind::Cmd,
      program: "cmd".to_string(),
      args: vec!["/C".to_string()],
    }
  }

  /// Strategy for an explicitly configured shell program.
  ///
  /// The argument convention is inferred from the program name.
  pub fn with_program(program: &str) -> Self {
    let lower = program.to_lowercase();
    let (kind, args) = if lower.contains("powershell") || lower.contains("pwsh") {
      (ShellKind::PowerShell, vec!["-NoProfile".to_string(), "-Command".to_string()])
    } else if Path::new(&lower)
      .file_stem()
      .is_some_and(|stem| stem == "cmd")
    {
      (ShellKind::Cmd, vec!["/C".to_string()])
    } else {
      (ShellKind::Posix, vec!["-c".to_string()])
    };

    Self {
      kind,
      program: program.to_string(),
      args,
    }
  }

  /// Full argument vector (excluding the program) for running `line`.
  pub fn argv(&self, line: &str) -> Vec<String> {
    let mut argv = self.args.clone();
    argv.push(line.to_string());
    argv
  }

  /// Idempotent command line that deletes `dir` and everything below it.
  pub fn remove_dir_command(&self, dir: &Path) -> String {
    let dir = dir.display().to_string();
    match self.kind {
      ShellKind::Posix => format!("rm -rf '{}'", dir.replace('\'', r"'\''")),
      ShellKind::Cmd => format!(r#"if exist "{dir}" rmdir /s /q "{dir}""#),
      ShellKind::PowerShell => format!(
        "if (Test-Path -LiteralPath '{0}') {{ Remove-Item -LiteralPath '{0}' -Recurse -Force }}",
        dir.replace('\'', "''")
      ),
    }
  }
}

impl fmt::Display for ShellStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.program, self.args.join(" "))
  }
}
