use anyhow::Result;
use serde_json::json;

use stratum_lib::config::Config;
use stratum_lib::platform::{Os, ShellStrategy};

use super::Context;
use crate::output::{print_json, print_stat, print_success};

/// Show the host platform and the shell commands would run through.
///
/// A configured `shell` override is honoured when the configuration exists.
pub fn cmd_info(ctx: &Context) -> Result<()> {
  let shell = if ctx.config.is_file() {
    Config::from_file(&ctx.config)
      .map_err(stratum_lib::Error::from)?
      .shell_strategy()
  } else {
    ShellStrategy::detect()
  };
  let os = Os::current().map_or("unknown", |os| os.as_str());

  if ctx.format.is_json() {
    return print_json(&json!({
      "version": env!("CARGO_PKG_VERSION"),
      "os": os,
      "arch": std::env::consts::ARCH,
      "shell": shell,
    }));
  }

  print_success(&format!("stratum v{}", env!("CARGO_PKG_VERSION")));
  print_stat("OS", os);
  print_stat("Arch", std::env::consts::ARCH);
  print_stat("Shell", &shell.to_string());

  Ok(())
}
