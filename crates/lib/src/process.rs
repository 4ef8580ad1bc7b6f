//! External tool invocation.
//!
//! Tools are spawned directly with an argument vector; nothing is passed
//! through a shell. Calls block the current task until the tool exits.

use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{Output, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("failed to run {tool}: {source}")]
  Spawn {
    tool: String,
    #[source]
    source: io::Error,
  },

  #[error("{tool} failed with exit code {code:?}")]
  Failed { tool: String, code: Option<i32> },
}

/// Run `program` to completion and return its raw output, whatever its exit status.
pub async fn output<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> Result<Output, ToolError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  let mut command = Command::new(program);
  command.args(args).stdin(Stdio::null());
  if let Some(dir) = cwd {
    command.current_dir(dir);
  }

  debug!(tool = %program.display(), working_dir = ?cwd, "spawning process");

  command.output().await.map_err(|source| ToolError::Spawn {
    tool: program.display().to_string(),
    source,
  })
}

/// Run `program` and return its trimmed stdout, failing on a non-zero exit.
pub async fn run<I, S>(program: &Path, args: I, cwd: Option<&Path>) -> Result<String, ToolError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  let output = output(program, args, cwd).await?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "tool stderr");
    }

    return Err(ToolError::Failed {
      tool: program.display().to_string(),
      code: output.status.code(),
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
