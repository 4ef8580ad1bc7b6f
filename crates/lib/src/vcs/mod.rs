//! Version-control identity of source files.
//!
//! A source path found in a `FILE` record is turned into a canonical,
//! VCS-qualified name of the form
//!
//! ```text
//! <kind>:<root>:<relative path>:<revision>
//! cvs:cvs.mozilla.org/cvsroot:mozilla/browser/app/nsBrowserApp.cpp:1.36
//! ```
//!
//! Detection looks at the file's directory: a `CVS/` control directory wins,
//! then `.svn/` or `_svn/`. Files under neither resolve to themselves.
//!
//! Lookups are memoized per path for the lifetime of one [`VcsResolver`].
//! Only successful resolutions are cached, so a failed lookup is attempted
//! again the next time the same path shows up. `svn info` itself still runs
//! at most once per path.

pub mod cvs;
pub mod svn;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::util::path::normalize_path;
use svn::SvnInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcsKind {
  None,
  Cvs,
  Svn,
}

impl VcsKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::None => "none",
      Self::Cvs => "cvs",
      Self::Svn => "svn",
    }
  }
}

impl fmt::Display for VcsKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Resolved version-control identity of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileRef {
  /// The path as it was looked up.
  pub file: String,
  pub kind: VcsKind,
  /// Repository root as `host/path`, empty for unversioned files.
  pub root: String,
  pub revision: String,
  /// Repository-relative name, empty for unversioned files.
  pub rel_path: String,
  /// Canonical name; the raw path for unversioned files.
  pub name: String,
}

impl SourceFileRef {
  pub fn unversioned(file: &str) -> Self {
    Self {
      file: file.to_string(),
      kind: VcsKind::None,
      root: String::new(),
      revision: String::new(),
      rel_path: String::new(),
      name: file.to_string(),
    }
  }

  pub fn versioned(kind: VcsKind, file: &str, root: String, rel_path: String, revision: String) -> Self {
    let name = format!("{}:{}:{}:{}", kind, root, rel_path, revision);
    Self {
      file: file.to_string(),
      kind,
      root,
      revision,
      rel_path,
      name,
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VcsError {
  #[error("failed to get CVS root for {0}")]
  CvsRoot(String),

  #[error("failed to get CVS revision for {0}")]
  CvsRevision(String),

  #[error("failed to get SVN root for {0}")]
  SvnRoot(String),

  #[error("failed to get SVN revision for {0}")]
  SvnRevision(String),

  #[error("failed to get SVN filename for {0}")]
  SvnFilename(String),
}

/// Run-scoped, memoizing VCS lookup.
#[derive(Debug)]
pub struct VcsResolver {
  srcdir: Option<PathBuf>,
  svn: PathBuf,
  resolved: HashMap<String, SourceFileRef>,
  svn_info: HashMap<String, SvnInfo>,
}

impl VcsResolver {
  /// `srcdir` is the top of the source tree used to build CVS relative
  /// names; `svn` is the client queried for SVN working copies.
  pub fn new(srcdir: Option<&Path>, svn: PathBuf) -> Self {
    Self {
      srcdir: srcdir.map(normalize_path),
      svn,
      resolved: HashMap::new(),
      svn_info: HashMap::new(),
    }
  }

  pub async fn resolve(&mut self, file: &str) -> Result<SourceFileRef, VcsError> {
    if let Some(cached) = self.resolved.get(file) {
      debug!(file, "vcs cache hit");
      return Ok(cached.clone());
    }

    let resolved = self.lookup(file).await?;
    self.resolved.insert(file.to_string(), resolved.clone());
    Ok(resolved)
  }

  async fn lookup(&mut self, file: &str) -> Result<SourceFileRef, VcsError> {
    let path = Path::new(file);
    let (dir, name) = match (path.parent(), path.file_name()) {
      (Some(dir), Some(name)) if !dir.as_os_str().is_empty() && !file.ends_with(['/', '\\']) => {
        (dir, name.to_string_lossy())
      }
      _ => return Ok(SourceFileRef::unversioned(file)),
    };

    match detect(dir) {
      VcsKind::Cvs => cvs::resolve(file, dir, &name, self.srcdir.as_deref()),
      VcsKind::Svn => {
        if !self.svn_info.contains_key(file) {
          let info = svn::query(&self.svn, path).await;
          self.svn_info.insert(file.to_string(), info);
        }
        svn::resolve(file, &self.svn_info[file])
      }
      VcsKind::None => Ok(SourceFileRef::unversioned(file)),
    }
  }
}

fn detect(dir: &Path) -> VcsKind {
  if dir.join("CVS").is_dir() {
    VcsKind::Cvs
  } else if dir.join(".svn").is_dir() || dir.join("_svn").is_dir() {
    VcsKind::Svn
  } else {
    VcsKind::None
  }
}
