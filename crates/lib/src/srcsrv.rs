//! Source-server indexing for PDB files.
//!
//! Each dumper invocation collects one [`SourceIndexRecord`] per CVS-annotated
//! `FILE` line. The records are rendered into a `srcsrv` data block, written
//! to `<debug_file>.stream` and, when the PDB itself was copied into the
//! store, spliced into that copy with `pdbstr`:
//!
//! ```text
//! pdbstr -w -p:<store>/<pdb>/<guid>/<pdb> -i:<pdb>.stream -s:srcsrv
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::process::{self, ToolError};

// The block is read by the debugger's source server, which expands the
// %...% variables itself, so it is emitted as-is.
const HEADER: &str = concat!(
  "SRCSRV: ini ------------------------------------------------\r\n",
  "VERSION=1\r\n",
  "SRCSRV: variables ------------------------------------------\r\n",
  "CVS_EXTRACT_CMD=%fnchdir%(%CVS_WORKINGDIR%)cvs.exe -d %fnvar%(%var2%) checkout -r %var4% %var3%\r\n",
  "CVS_EXTRACT_TARGET=%targ%\\%var2%\\%fnbksl%(%var3%)\\%fnfile%(%var1%)\r\n",
  "CVS_WORKING_DIR=%targ%\\%var2%\\%fnbksl%(%var3%)\r\n",
  "MYSERVER=%CVSROOT%\r\n",
  "SRCSRVTRG=%CVS_WORKING_DIR%\r\n",
  "SRCSRVCMD=%CVS_EXTRACT_CMD%\r\n",
  "SRCSRV: source files ---------------------------------------\r\n",
);

const FOOTER: &str = "SRCSRV: end ------------------------------------------------\r\n\n";

#[derive(Debug, Error)]
pub enum SourceIndexError {
  #[error("failed to write source index stream {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove source index stream {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to add source index to {pdb}: {source}")]
  Inject {
    pdb: PathBuf,
    #[source]
    source: ToolError,
  },
}

/// One indexed source file: where it was built from and how to fetch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIndexRecord {
  pub source_path: String,
  pub repo_file: String,
  pub revision: String,
}

impl SourceIndexRecord {
  fn line(&self) -> String {
    format!("{}*MYSERVER*{}*{}\r\n", self.source_path, self.repo_file, self.revision)
  }
}

/// Records gathered during a single dumper invocation, in encounter order.
#[derive(Debug, Default)]
pub struct SourceIndex {
  records: Vec<SourceIndexRecord>,
}

impl SourceIndex {
  pub fn push(&mut self, record: SourceIndexRecord) {
    self.records.push(record);
  }

  pub fn records(&self) -> &[SourceIndexRecord] {
    &self.records
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn render(&self) -> String {
    let mut block = String::from(HEADER);
    for record in &self.records {
      block.push_str(&record.line());
    }
    block.push_str(FOOTER);
    block
  }

  /// Write the rendered block to `<dir>/<debug_file>.stream`.
  pub async fn write_stream(&self, dir: &Path, debug_file: &str) -> Result<PathBuf, SourceIndexError> {
    let path = dir.join(format!("{}.stream", debug_file));
    tokio::fs::write(&path, self.render())
      .await
      .map_err(|source| SourceIndexError::Write {
        path: path.clone(),
        source,
      })?;
    debug!(path = %path.display(), records = self.records.len(), "wrote source index stream");
    Ok(path)
  }
}

/// Splice `stream` into `pdb` as its `srcsrv` stream, then delete `stream`.
///
/// `pdbstr` runs from the stream's directory and is handed the bare stream name.
pub async fn inject(pdbstr: &Path, pdb: &Path, stream: &Path) -> Result<(), SourceIndexError> {
  let dir = stream.parent().filter(|d| !d.as_os_str().is_empty());
  let name = stream.file_name().unwrap_or(stream.as_os_str());

  let mut pdb_arg = std::ffi::OsString::from("-p:");
  pdb_arg.push(pdb);
  let mut stream_arg = std::ffi::OsString::from("-i:");
  stream_arg.push(name);

  process::run(pdbstr, ["-w".into(), pdb_arg, stream_arg, "-s:srcsrv".into()], dir)
    .await
    .map_err(|source| SourceIndexError::Inject {
      pdb: pdb.to_path_buf(),
      source,
    })?;

  tokio::fs::remove_file(stream)
    .await
    .map_err(|source| SourceIndexError::Remove {
      path: stream.to_path_buf(),
      source,
    })
}
