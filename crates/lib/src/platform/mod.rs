//! Host platform strategies.
//!
//! Exactly one strategy is selected per run from the host OS. It decides
//! which files are worth dumping, how dump_syms is invoked, how FILE names
//! are normalized and how raw debug info is packaged next to the symbols.

pub mod linux;
pub mod macos;
pub mod os;
pub mod probe;
pub mod windows;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::process::ToolError;
use crate::store::SymbolStoreEntry;
use crate::tools::Tools;

pub use linux::LinuxDumper;
pub use macos::MacDumper;
pub use os::Os;
pub use windows::WindowsDumper;

#[derive(Debug, Error)]
pub enum PlatformError {
  #[error("unsupported platform: {0}")]
  Unsupported(String),
}

/// Errors while packaging raw debug info into the store.
#[derive(Debug, Error)]
pub enum CopyError {
  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error("failed to copy {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to compress {from} into {to}: {source}")]
  Compress {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug)]
pub enum Platform {
  Windows(WindowsDumper),
  Linux(LinuxDumper),
  MacOs(MacDumper),
}

impl Platform {
  pub fn for_os(os: Os, tools: &Tools) -> Self {
    match os {
      Os::Windows => Self::Windows(WindowsDumper::default()),
      Os::Linux => Self::Linux(LinuxDumper::new(tools.file.clone(), tools.objcopy.clone())),
      Os::MacOs => Self::MacOs(MacDumper::new(tools.file.clone())),
    }
  }

  /// Select the strategy for the host OS.
  pub fn current(tools: &Tools) -> Result<Self, PlatformError> {
    let os = Os::current().ok_or_else(|| PlatformError::Unsupported(std::env::consts::OS.to_string()))?;
    Ok(Self::for_os(os, tools))
  }

  pub fn os(&self) -> Os {
    match self {
      Self::Windows(_) => Os::Windows,
      Self::Linux(_) => Os::Linux,
      Self::MacOs(_) => Os::MacOs,
    }
  }

  /// Whether a file found while walking a directory should be dumped.
  pub async fn should_process(&self, path: &Path) -> bool {
    match self {
      Self::Windows(dumper) => dumper.should_process(path),
      Self::Linux(dumper) => dumper.should_process(path).await,
      Self::MacOs(dumper) => dumper.should_process(path).await,
    }
  }

  /// `dump_syms [-a <arch>] <file>` with stdout captured for streaming.
  pub fn dumper_command(&self, dump_syms: &Path, arch: Option<&str>, file: &Path) -> Command {
    let mut command = Command::new(dump_syms);
    if let Some(arch) = arch {
      command.arg("-a").arg(arch);
    }
    command
      .arg(file)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit());
    command
  }

  pub fn fix_filename_case(&mut self, file: &str) -> String {
    match self {
      Self::Windows(dumper) => dumper.fix_filename_case(file),
      Self::Linux(_) | Self::MacOs(_) => file.to_string(),
    }
  }

  /// Package the raw debug info of `file` into the store slot of `entry`.
  ///
  /// Returns the store-relative path of the artifact, if one was produced.
  pub async fn copy_debug(
    &self,
    file: &Path,
    entry: &SymbolStoreEntry,
    store_root: &Path,
  ) -> Result<Option<String>, CopyError> {
    match self {
      Self::Windows(dumper) => dumper.copy_debug(file, entry, store_root).await.map(Some),
      Self::Linux(dumper) => dumper.copy_debug(file, entry, store_root).await.map(Some),
      Self::MacOs(_) => Ok(None),
    }
  }

  /// Source-server indexing only exists for PDB files.
  pub fn supports_source_index(&self) -> bool {
    matches!(self, Self::Windows(_))
  }
}

pub(crate) fn has_suffix(path: &Path, suffix: &str) -> bool {
  path.to_string_lossy().ends_with(suffix)
}

#[cfg(unix)]
pub(crate) fn is_executable(path: &Path) -> bool {
  rustix::fs::access(path, rustix::fs::Access::EXEC_OK).is_ok()
}

#[cfg(not(unix))]
pub(crate) fn is_executable(_path: &Path) -> bool {
  false
}
