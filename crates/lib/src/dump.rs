//! Store driver: walk inputs, run the dumper and file its output.
//!
//! For every input file the dumper runs once per configured architecture.
//! Each invocation whose output starts with a `MODULE` record produces the
//! store-relative path of its `.sym` file, followed (when copying) by the
//! path of the packaged debug info. Paths are handed to the caller's `emit`
//! callback as soon as they exist and collected into a [`DumpReport`].

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tokio::io::BufReader;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::platform::{CopyError, Platform};
use crate::srcsrv::{self, SourceIndex, SourceIndexError};
use crate::store::paths::full_path;
use crate::symbols::{RewriteContext, RewriteError, rewrite};
use crate::tools::Tools;
use crate::vcs::VcsResolver;

#[derive(Debug, Error)]
pub enum DumpError {
  #[error("dump_syms not found at {0}")]
  DumperNotFound(PathBuf),

  #[error("failed to run dump_syms on {path}: {source}")]
  Spawn {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to wait for dump_syms on {path}: {source}")]
  Wait {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Rewrite(#[from] RewriteError),

  #[error("failed to copy debug info for {path}: {source}")]
  Copy {
    path: PathBuf,
    #[source]
    source: CopyError,
  },

  #[error(transparent)]
  SourceIndex(#[from] SourceIndexError),
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct DumpOptions {
  pub dump_syms: PathBuf,
  /// Root of the symbol store.
  pub symbol_path: PathBuf,
  /// Empty means a single invocation without `-a`.
  pub archs: Vec<String>,
  pub srcdir: Option<PathBuf>,
  pub copy_debug: bool,
  pub vcs_info: bool,
  /// Set when source indexing is requested.
  pub pdbstr: Option<PathBuf>,
  /// Where `.stream` files are written before injection.
  pub stream_dir: PathBuf,
}

impl DumpOptions {
  pub fn new(dump_syms: impl Into<PathBuf>, symbol_path: impl Into<PathBuf>) -> Self {
    Self {
      dump_syms: dump_syms.into(),
      symbol_path: symbol_path.into(),
      archs: Vec::new(),
      srcdir: None,
      copy_debug: false,
      vcs_info: false,
      pdbstr: None,
      stream_dir: PathBuf::from("."),
    }
  }

  /// Split a space-separated architecture list.
  pub fn parse_archs(archs: &str) -> Vec<String> {
    archs.split_whitespace().map(str::to_string).collect()
  }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DumpReport {
  /// Store-relative paths, in the order they were written.
  pub artifacts: Vec<String>,
  /// Inputs that yielded no symbols.
  pub failed: Vec<PathBuf>,
}

pub struct SymbolDumper {
  options: DumpOptions,
  platform: Platform,
  vcs: Option<VcsResolver>,
  report: DumpReport,
}

impl SymbolDumper {
  /// Fails when the dumper binary does not exist.
  pub fn new(mut options: DumpOptions, platform: Platform, tools: &Tools) -> Result<Self, DumpError> {
    options.dump_syms = std::path::absolute(&options.dump_syms)
      .map_err(|_| DumpError::DumperNotFound(options.dump_syms.clone()))?;
    if !options.dump_syms.is_file() {
      return Err(DumpError::DumperNotFound(options.dump_syms));
    }

    // pdbstr runs from the stream directory, so store paths must not be relative.
    options.symbol_path = absolute_or_same(&options.symbol_path);
    options.stream_dir = absolute_or_same(&options.stream_dir);

    debug!(platform = %platform.os(), dump_syms = %options.dump_syms.display(), "starting symbol dump");

    let vcs = options
      .vcs_info
      .then(|| VcsResolver::new(options.srcdir.as_deref(), tools.svn.clone()));

    Ok(Self {
      options,
      platform,
      vcs,
      report: DumpReport::default(),
    })
  }

  /// Process every input in order and return the run's report.
  pub async fn process_all<P: AsRef<Path>>(
    mut self,
    inputs: &[P],
    emit: &mut dyn FnMut(&str),
  ) -> Result<DumpReport, DumpError> {
    for input in inputs {
      self.process(input.as_ref(), emit).await?;
    }
    Ok(self.report)
  }

  /// Dump a file, or every eligible file below a directory.
  pub async fn process(&mut self, input: &Path, emit: &mut dyn FnMut(&str)) -> Result<(), DumpError> {
    if input.is_dir() {
      for file in walk(input) {
        if self.platform.should_process(&file).await {
          self.process_file(&file, emit).await?;
        } else {
          debug!(path = %file.display(), "skipping ineligible file");
        }
      }
    } else if input.is_file() {
      self.process_file(input, emit).await?;
    } else {
      warn!(path = %input.display(), "input does not exist");
      self.report.failed.push(input.to_path_buf());
    }
    Ok(())
  }

  async fn process_file(&mut self, file: &Path, emit: &mut dyn FnMut(&str)) -> Result<(), DumpError> {
    let archs: Vec<Option<String>> = if self.options.archs.is_empty() {
      vec![None]
    } else {
      self.options.archs.iter().cloned().map(Some).collect()
    };

    let mut produced = false;
    for arch in archs {
      produced |= self.dump_once(file, arch.as_deref(), emit).await?;
    }

    if !produced {
      warn!(path = %file.display(), "no symbols produced");
      self.report.failed.push(file.to_path_buf());
    }
    Ok(())
  }

  /// One dumper invocation. Returns whether a symbol file was written.
  async fn dump_once(&mut self, file: &Path, arch: Option<&str>, emit: &mut dyn FnMut(&str)) -> Result<bool, DumpError> {
    let mut child = self
      .platform
      .dumper_command(&self.options.dump_syms, arch, file)
      .spawn()
      .map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DumpError::DumperNotFound(self.options.dump_syms.clone()),
        _ => DumpError::Spawn {
          path: file.to_path_buf(),
          source,
        },
      })?;

    let stdout = child.stdout.take().ok_or_else(|| DumpError::Spawn {
      path: file.to_path_buf(),
      source: io::Error::other("dump_syms stdout was not captured"),
    })?;

    let mut source_index = SourceIndex::default();
    let ctx = RewriteContext {
      platform: &mut self.platform,
      vcs: self.vcs.as_mut(),
      source_index: &mut source_index,
    };

    let dumped = match rewrite(BufReader::new(stdout), &self.options.symbol_path, ctx).await {
      Ok(dumped) => dumped,
      Err(e) => {
        if let Err(kill) = child.kill().await {
          debug!(error = %kill, "failed to kill dump_syms");
        }
        return Err(e.into());
      }
    };

    let status = child.wait().await.map_err(|source| DumpError::Wait {
      path: file.to_path_buf(),
      source,
    })?;
    if !status.success() {
      warn!(path = %file.display(), arch, code = ?status.code(), "dump_syms exited with failure");
    }

    let Some(dumped) = dumped else {
      debug!(path = %file.display(), arch, "dump_syms produced no MODULE record");
      return Ok(false);
    };

    info!(path = %dumped.rel_path, "wrote symbol file");
    self.record(dumped.rel_path.clone(), emit);

    if self.options.copy_debug {
      let copied = self
        .platform
        .copy_debug(file, &dumped.entry, &self.options.symbol_path)
        .await
        .map_err(|source| DumpError::Copy {
          path: file.to_path_buf(),
          source,
        })?;
      if let Some(rel_path) = copied {
        info!(path = %rel_path, "copied debug info");
        self.record(rel_path, emit);
      }
    }

    if let Some(pdbstr) = &self.options.pdbstr {
      if self.platform.supports_source_index() {
        let stream = source_index
          .write_stream(&self.options.stream_dir, &dumped.entry.debug_file)
          .await?;
        if self.options.copy_debug {
          let pdb = full_path(&self.options.symbol_path, &dumped.entry.debug_copy_rel_path());
          srcsrv::inject(pdbstr, &pdb, &stream).await?;
        }
      }
    }

    Ok(true)
  }

  fn record(&mut self, rel_path: String, emit: &mut dyn FnMut(&str)) {
    emit(&rel_path);
    self.report.artifacts.push(rel_path);
  }
}

fn absolute_or_same(path: &Path) -> PathBuf {
  std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Regular files below `dir`, including symlinks to files, sorted by name.
fn walk(dir: &Path) -> Vec<PathBuf> {
  WalkDir::new(dir)
    .sort_by_file_name()
    .into_iter()
    .filter_map(|entry| match entry {
      Ok(entry) => Some(entry),
      Err(e) => {
        warn!(error = %e, "failed to read directory entry");
        None
      }
    })
    .filter(|entry| entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file()))
    .map(|entry| entry.into_path())
    .collect()
}
