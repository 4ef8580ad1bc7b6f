use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::{DumpArgs, cmd_dump};
use output::print_error;

/// Extract debug symbols into a symbol store for crash reporting
#[derive(Parser)]
#[command(name = "symbolstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(flatten)]
  dump: DumpArgs,
}

fn main() -> ExitCode {
  // stdout carries the produced paths, so logs go to stderr
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let cli = Cli::parse();

  match cmd_dump(cli.dump) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
