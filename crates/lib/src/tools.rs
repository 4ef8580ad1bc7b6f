//! Locations of the external tools a run shells out to.
//!
//! Every tool except `pdbstr` has a default program name looked up on `PATH`
//! and can be overridden through an environment variable:
//!
//! | Tool      | Default   | Override           |
//! |-----------|-----------|--------------------|
//! | `file`    | `file`    | `SYMSTORE_FILE`    |
//! | `svn`     | `svn`     | `SYMSTORE_SVN`     |
//! | `objcopy` | `objcopy` | `SYMSTORE_OBJCOPY` |
//! | `pdbstr`  | -         | `PDBSTR_PATH`      |

use std::path::PathBuf;

use thiserror::Error;

use crate::consts::PDBSTR_PATH_VAR;

#[derive(Debug, Error)]
pub enum ToolsError {
  #[error("Invalid path to pdbstr.exe - please set/check {PDBSTR_PATH_VAR}")]
  PdbstrNotSet,

  #[error("Invalid path to pdbstr.exe ({0}) - please set/check {PDBSTR_PATH_VAR}")]
  PdbstrMissing(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tools {
  pub file: PathBuf,
  pub svn: PathBuf,
  pub objcopy: PathBuf,
}

impl Tools {
  pub fn current() -> Self {
    Self {
      file: env_or("SYMSTORE_FILE", "file"),
      svn: env_or("SYMSTORE_SVN", "svn"),
      objcopy: env_or("SYMSTORE_OBJCOPY", "objcopy"),
    }
  }
}

impl Default for Tools {
  fn default() -> Self {
    Self {
      file: PathBuf::from("file"),
      svn: PathBuf::from("svn"),
      objcopy: PathBuf::from("objcopy"),
    }
  }
}

fn env_or(var: &str, default: &str) -> PathBuf {
  match std::env::var_os(var) {
    Some(value) if !value.is_empty() => PathBuf::from(value),
    _ => PathBuf::from(default),
  }
}

/// Resolve `pdbstr` from `PDBSTR_PATH`.
///
/// Source indexing cannot start without it, so this is checked before any
/// file is processed.
pub fn resolve_pdbstr() -> Result<PathBuf, ToolsError> {
  let path = std::env::var_os(PDBSTR_PATH_VAR)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .ok_or(ToolsError::PdbstrNotSet)?;

  if !path.exists() {
    return Err(ToolsError::PdbstrMissing(path));
  }

  Ok(path)
}
