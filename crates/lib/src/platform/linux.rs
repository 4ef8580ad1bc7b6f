//! Linux strategy: ELF executables and shared objects.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::debug;

use super::probe::file_type;
use super::{CopyError, has_suffix, is_executable};
use crate::process;
use crate::store::SymbolStoreEntry;
use crate::store::paths::full_path;

#[derive(Debug)]
pub struct LinuxDumper {
  file_cmd: PathBuf,
  objcopy: PathBuf,
}

impl LinuxDumper {
  pub fn new(file_cmd: PathBuf, objcopy: PathBuf) -> Self {
    Self { file_cmd, objcopy }
  }

  /// Accept executables and `.so` files that `file(1)` reports as ELF.
  pub async fn should_process(&self, path: &Path) -> bool {
    if !(has_suffix(path, ".so") || is_executable(path)) {
      return false;
    }
    file_type(&self.file_cmd, path).await.starts_with("ELF")
  }

  /// Split the debug sections into `<file>.dbg`, point the binary at it with
  /// a `.gnu_debuglink` section and store the debug file gzipped.
  pub async fn copy_debug(&self, file: &Path, entry: &SymbolStoreEntry, store_root: &Path) -> Result<String, CopyError> {
    let mut file_dbg = file.as_os_str().to_os_string();
    file_dbg.push(".dbg");
    let file_dbg = PathBuf::from(file_dbg);

    process::run(
      &self.objcopy,
      [OsString::from("--only-keep-debug"), file.into(), file_dbg.clone().into()],
      None,
    )
    .await?;

    let mut debuglink = OsString::from("--add-gnu-debuglink=");
    debuglink.push(&file_dbg);
    process::run(&self.objcopy, [debuglink, file.into()], None).await?;

    let rel_path = entry.compressed_debug_rel_path();
    let dest = full_path(store_root, &rel_path);

    let (from, to) = (file_dbg.clone(), dest.clone());
    let compressed = tokio::task::spawn_blocking(move || gzip(&from, &to))
      .await
      .map_err(io::Error::other)
      .and_then(|r| r);
    compressed.map_err(|source| CopyError::Compress {
      from: file_dbg,
      to: dest,
      source,
    })?;

    debug!(path = %rel_path, "stored compressed debug info");
    Ok(rel_path)
  }
}

fn gzip(from: &Path, to: &Path) -> io::Result<()> {
  if let Some(parent) = to.parent() {
    std::fs::create_dir_all(parent)?;
  }
  let mut input = BufReader::new(File::open(from)?);
  let mut encoder = GzEncoder::new(BufWriter::new(File::create(to)?), Compression::default());
  io::copy(&mut input, &mut encoder)?;
  let mut writer = encoder.finish()?;
  io::Write::flush(&mut writer)
}
