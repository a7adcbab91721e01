mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stratum_lib::Action;
use stratum_lib::config::CONFIG_FILE;

use crate::output::{OutputFormat, print_error};

/// Exit code for failures outside the engine (I/O on stdout, runtime setup).
const EXIT_FAILURE: i32 = 1;

/// stratum - orchestrate layered multi-product builds
#[derive(Parser)]
#[command(name = "stratum")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the workspace configuration
  #[arg(short, long, global = true, default_value = CONFIG_FILE)]
  config: PathBuf,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Do not echo the output of dispatched commands
  #[arg(short, long, global = true)]
  quiet: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build targets and everything they depend on
  Build(RunArgs),

  /// Build prerequisites, then package targets
  Pack(RunArgs),

  /// Build targets, then pack and publish them to the local repository
  PushLocal(RunArgs),

  /// Remove build outputs of targets
  Clean(RunArgs),

  /// Print the execution plan for an action without running it
  Plan {
    /// Action to plan (build, pack, push-local, clean)
    action: Action,

    /// `product` or `product/submodule`; none selects everything
    targets: Vec<String>,
  },

  /// List products, submodules and their dependencies
  List,

  /// Show the detected platform and shell
  Info,
}

#[derive(Args)]
struct RunArgs {
  /// `product` or `product/submodule`; none selects everything
  targets: Vec<String>,

  /// Print the plan without dispatching any command
  #[arg(long)]
  dry_run: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match run(cli) {
    Ok(code) => exit_code(code),
    Err(err) => {
      print_error(&err.to_string());
      let code = err
        .downcast_ref::<stratum_lib::Error>()
        .map(stratum_lib::Error::exit_code)
        .unwrap_or(EXIT_FAILURE);
      exit_code(code)
    }
  }
}

fn run(cli: Cli) -> Result<i32> {
  let ctx = cmd::Context {
    config: cli.config,
    quiet: cli.quiet,
    format: cli.output,
  };

  match cli.command {
    Commands::Build(args) => cmd::cmd_run(&ctx, Action::Build, &args.targets, args.dry_run),
    Commands::Pack(args) => cmd::cmd_run(&ctx, Action::Pack, &args.targets, args.dry_run),
    Commands::PushLocal(args) => cmd::cmd_run(&ctx, Action::PushLocal, &args.targets, args.dry_run),
    Commands::Clean(args) => cmd::cmd_run(&ctx, Action::Clean, &args.targets, args.dry_run),
    Commands::Plan { action, targets } => cmd::cmd_plan(&ctx, action, &targets).map(|()| 0),
    Commands::List => cmd::cmd_list(&ctx).map(|()| 0),
    Commands::Info => cmd::cmd_info(&ctx).map(|()| 0),
  }
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn exit_code(code: i32) -> ExitCode {
  ExitCode::from(u8::try_from(code).unwrap_or(EXIT_FAILURE as u8))
}
