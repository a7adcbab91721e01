//! CommandDispatcher: run one plan step as an external command.
//!
//! The dispatcher knows nothing about ordering. It maps a step to a command
//! line, runs it through the shell strategy in the submodule's directory,
//! streams its output, and reports how it finished.

use std::cell::RefCell;
use std::future::Future;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

#[cfg(unix)]
use rustix::process::{Pid, Signal, kill_process_group};

use crate::action::Action;
use crate::credentials::Credentials;
use crate::graph::SubmoduleDescriptor;
use crate::platform::ShellStrategy;
use crate::plan::Step;

use super::types::ExecuteError;

pub const DEFAULT_BUILD_COMMAND: &str = "bal build";
pub const DEFAULT_PACK_COMMAND: &str = "bal pack";
pub const DEFAULT_PUSH_LOCAL_COMMAND: &str = "bal pack && bal push --repository=local";

/// How a dispatched command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
  /// The process exited; `exit_code` is `None` when it was killed by a signal.
  Exited { success: bool, exit_code: Option<i32> },
  /// The cancellation future resolved first and the process was killed.
  Cancelled,
}

/// Result of dispatching one step.
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub command: String,
  pub completion: Completion,
  /// Captured stdout and stderr, interleaved by line.
  pub output: String,
}

#[derive(Debug, Clone, Copy)]
enum Sink {
  Stdout,
  Stderr,
}

/// Executes single steps through a fixed shell strategy.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
  shell: ShellStrategy,
  credentials: Credentials,
  echo: bool,
}

impl CommandDispatcher {
  pub fn new(shell: ShellStrategy, credentials: Credentials) -> Self {
    Self {
      shell,
      credentials,
      echo: true,
    }
  }

  /// Stop forwarding command output to this process's stdout/stderr.
  /// Output is still captured.
  pub fn quiet(mut self, quiet: bool) -> Self {
    self.echo = !quiet;
    self
  }

  pub fn shell(&self) -> &ShellStrategy {
    &self.shell
  }

  /// The command line dispatched for `step`.
  ///
  /// A configured command wins; otherwise the built-in default for the
  /// step's action is used. Clean defaults to removing the output directory.
  pub fn command_line(&self, descriptor: &SubmoduleDescriptor, step: &Step) -> String {
    let action = step.command_action();
    if let Some(command) = descriptor.commands.get(&action) {
      return command.clone();
    }

    match action {
      Action::Build => DEFAULT_BUILD_COMMAND.to_string(),
      Action::Pack => DEFAULT_PACK_COMMAND.to_string(),
      Action::PushLocal => DEFAULT_PUSH_LOCAL_COMMAND.to_string(),
      Action::Clean => self.shell.remove_dir_command(&descriptor.output_dir),
    }
  }

  /// Run `step` to completion.
  pub async fn run(&self, descriptor: &SubmoduleDescriptor, step: &Step) -> Result<CommandOutput, ExecuteError> {
    self.run_until(descriptor, step, std::future::pending()).await
  }

  /// Run `step` until it exits or `cancel` resolves, whichever comes first.
  ///
  /// On cancellation the child process is killed and the output captured so
  /// far is returned with [`Completion::Cancelled`].
  pub async fn run_until<F>(
    &self,
    descriptor: &SubmoduleDescriptor,
    step: &Step,
    cancel: F,
  ) -> Result<CommandOutput, ExecuteError>
  where
    F: Future<Output = ()>,
  {
    let command = self.command_line(descriptor, step);

    if !descriptor.dir.is_dir() {
      // Nothing was ever built there, so there is nothing to clean.
      if step.action == Action::Clean {
        debug!(dir = %descriptor.dir.display(), "clean target directory missing, nothing to do");
        return Ok(CommandOutput {
          command,
          completion: Completion::Exited {
            success: true,
            exit_code: Some(0),
          },
          output: String::new(),
        });
      }
      return Err(ExecuteError::MissingDirectory(descriptor.dir.clone()));
    }

    info!(submodule = %step.submodule, cmd = %command, "executing command");

    let mut process = Command::new(&self.shell.program);
    process
      .args(self.shell.argv(&command))
      .current_dir(&descriptor.dir)
      .envs(&descriptor.env)
      .envs(self.credentials.env())
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      // Kills the shell if this future is dropped mid-step.
      .kill_on_drop(true);

    // The shell leads its own process group so cancellation reaches every
    // command it started, and a terminal interrupt reaches only us.
    #[cfg(unix)]
    process.process_group(0);

    debug!(shell = %self.shell, working_dir = ?descriptor.dir, "spawning process");

    let mut child = process.spawn().map_err(|source| ExecuteError::Spawn {
      program: self.shell.program.clone(),
      source,
    })?;

    // Still addresses the group after the shell itself has been reaped.
    let pgid = child.id();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let captured = RefCell::new(String::new());
    let echo = self.echo;

    let wait = async {
      let (out, err) = tokio::join!(
        pump(stdout, Sink::Stdout, echo, &captured),
        pump(stderr, Sink::Stderr, echo, &captured)
      );
      out?;
      err?;
      child.wait().await
    };

    tokio::pin!(cancel);

    let mut completion = tokio::select! {
      biased;
      _ = &mut cancel => Completion::Cancelled,
      status = wait => {
        let status = status?;
        Completion::Exited { success: status.success(), exit_code: status.code() }
      }
    };

    // A process killed by a signal while cancellation fires is an abort, not a failure.
    if let Completion::Exited { exit_code: None, .. } = completion {
      let fired = tokio::select! {
        biased;
        _ = &mut cancel => true,
        _ = std::future::ready(()) => false,
      };
      if fired {
        completion = Completion::Cancelled;
      }
    }

    if completion == Completion::Cancelled {
      info!(submodule = %step.submodule, "cancelled, killing process");
      terminate(&mut child, pgid, step).await;
    }

    Ok(CommandOutput {
      command,
      completion,
      output: captured.into_inner(),
    })
  }
}

/// Kill every process in the shell's group (unix), then the shell if it is
/// still running.
async fn terminate(child: &mut Child, pgid: Option<u32>, step: &Step) {
  #[cfg(unix)]
  if let Some(pgid) = pgid.and_then(|id| i32::try_from(id).ok()).and_then(Pid::from_raw) {
    // Fails with ESRCH once every member has exited.
    if let Err(e) = kill_process_group(pgid, Signal::KILL) {
      debug!(submodule = %step.submodule, error = %e, "process group already exited");
    }
  }
  #[cfg(not(unix))]
  let _ = pgid;

  if matches!(child.try_wait(), Ok(None))
    && let Err(e) = child.kill().await
  {
    warn!(submodule = %step.submodule, error = %e, "failed to kill process");
  }
}

/// Forward `reader` line by line to `sink` and append each line to `captured`.
async fn pump<R>(reader: Option<R>, sink: Sink, echo: bool, captured: &RefCell<String>) -> std::io::Result<()>
where
  R: AsyncRead + Unpin,
{
  let Some(reader) = reader else {
    return Ok(());
  };

  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();
  loop {
    buf.clear();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
      return Ok(());
    }
    let text = String::from_utf8_lossy(&buf);
    let line = text.trim_end_matches(['\n', '\r']);

    if echo {
      match sink {
        Sink::Stdout => println!("{line}"),
        Sink::Stderr => eprintln!("{line}"),
      }
    }

    let mut captured = captured.borrow_mut();
    captured.push_str(line);
    captured.push('\n');
  }
}
