//! Streaming rewrite of dumper output into the symbol store.
//!
//! The output is consumed one line at a time. The `MODULE` line decides where
//! the symbol file goes, `FILE` records get their source names normalized and
//! optionally VCS-qualified, and every other line is copied byte-for-byte so
//! records this tool does not know about survive unchanged.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::ModuleHeader;
use crate::consts::FILE_RECORD;
use crate::platform::Platform;
use crate::srcsrv::{SourceIndex, SourceIndexRecord};
use crate::store::SymbolStoreEntry;
use crate::store::paths::full_path;
use crate::util::path::forward_slashes;
use crate::vcs::{VcsKind, VcsResolver};

#[derive(Debug, Error)]
pub enum RewriteError {
  #[error("malformed MODULE record: {0}")]
  MalformedModule(String),

  #[error("malformed FILE record: {0}")]
  MalformedFile(String),

  #[error("failed to read dumper output: {0}")]
  Read(#[source] io::Error),

  #[error("failed to create symbol directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write symbol file {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// What one dumper invocation turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dumped {
  pub header: ModuleHeader,
  pub entry: SymbolStoreEntry,
  /// Store-relative path of the symbol file, with forward slashes.
  pub rel_path: String,
  pub path: PathBuf,
}

/// Collaborators used while rewriting `FILE` records.
pub struct RewriteContext<'a> {
  pub platform: &'a mut Platform,
  /// `None` when VCS annotation is disabled.
  pub vcs: Option<&'a mut VcsResolver>,
  pub source_index: &'a mut SourceIndex,
}

impl RewriteContext<'_> {
  async fn source_name(&mut self, raw: &str) -> String {
    let source_path = self.platform.fix_filename_case(raw);

    let Some(vcs) = self.vcs.as_deref_mut() else {
      return source_path;
    };

    match vcs.resolve(&source_path).await {
      Ok(resolved) => {
        if resolved.kind == VcsKind::Cvs {
          self.source_index.push(SourceIndexRecord {
            source_path: source_path.clone(),
            repo_file: forward_slashes(&resolved.rel_path),
            revision: resolved.revision.clone(),
          });
        }
        forward_slashes(&resolved.name)
      }
      Err(e) => {
        warn!(file = %source_path, error = %e, "failed to resolve VCS info");
        forward_slashes(&source_path)
      }
    }
  }
}

/// Stream dumper output from `reader` into the store under `store_root`.
///
/// Returns `Ok(None)` when the output does not start with a `MODULE` line;
/// nothing is written in that case.
pub async fn rewrite<R>(
  mut reader: R,
  store_root: &Path,
  mut ctx: RewriteContext<'_>,
) -> Result<Option<Dumped>, RewriteError>
where
  R: AsyncBufRead + Unpin,
{
  let mut line = Vec::new();
  let read = reader.read_until(b'\n', &mut line).await.map_err(RewriteError::Read)?;
  if read == 0 || !ModuleHeader::is_module_line(&line) {
    debug!("dumper output has no MODULE line");
    return Ok(None);
  }

  let module_line = String::from_utf8_lossy(&line);
  let header = ModuleHeader::parse(&module_line)
    .ok_or_else(|| RewriteError::MalformedModule(module_line.trim_end().to_string()))?;
  let entry = header.store_entry();
  let rel_path = entry.sym_rel_path();
  let path = full_path(store_root, &rel_path);

  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|source| RewriteError::CreateDir {
        path: parent.to_path_buf(),
        source,
      })?;
  }

  let write_err = |source| RewriteError::Write {
    path: path.clone(),
    source,
  };
  let mut out = BufWriter::new(File::create(&path).await.map_err(write_err)?);
  out.write_all(&line).await.map_err(write_err)?;

  loop {
    line.clear();
    if reader.read_until(b'\n', &mut line).await.map_err(RewriteError::Read)? == 0 {
      break;
    }

    match file_record(&line)? {
      Some((index, filename)) => {
        let name = ctx.source_name(filename).await;
        let record = format!("{} {} {}\n", FILE_RECORD, index, name);
        out.write_all(record.as_bytes()).await.map_err(write_err)?;
      }
      None => out.write_all(&line).await.map_err(write_err)?,
    }
  }

  out.flush().await.map_err(write_err)?;

  Ok(Some(Dumped {
    header,
    entry,
    rel_path,
    path,
  }))
}

/// Split `FILE <index> <filename>` into its index and trimmed filename.
///
/// Lines that are not `FILE` records, or are not valid UTF-8, yield `None`.
fn file_record(line: &[u8]) -> Result<Option<(&str, &str)>, RewriteError> {
  let Ok(text) = std::str::from_utf8(line) else {
    return Ok(None);
  };
  let Some(rest) = text.strip_prefix(FILE_RECORD) else {
    return Ok(None);
  };
  if !rest.starts_with(char::is_whitespace) {
    return Ok(None);
  }

  let rest = rest.trim_start();
  let (index, filename) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
  let filename = filename.trim();
  if index.is_empty() || filename.is_empty() {
    return Err(RewriteError::MalformedFile(text.trim_end().to_string()));
  }

  Ok(Some((index, filename)))
}
