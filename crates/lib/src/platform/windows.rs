//! Windows strategy: PDB files next to their executables.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::{CopyError, has_suffix};
use crate::store::SymbolStoreEntry;
use crate::store::paths::full_path;

#[derive(Debug, Default)]
pub struct WindowsDumper {
  case_cache: HashMap<String, String>,
}

impl WindowsDumper {
  /// Accept `.pdb` files that have a `.exe` or `.dll` with the same base name beside them.
  pub fn should_process(&self, path: &Path) -> bool {
    has_suffix(path, ".pdb") && ["exe", "dll"].iter().any(|ext| path.with_extension(ext).is_file())
  }

  /// Restore the on-disk casing of a source file name.
  ///
  /// Visual C++ records source names in lowercase. When the directory exists,
  /// the first entry matching case-insensitively (an exact match wins) is
  /// substituted. Results are memoized per raw name.
  pub fn fix_filename_case(&mut self, file: &str) -> String {
    if let Some(fixed) = self.case_cache.get(file) {
      return fixed.clone();
    }

    let fixed = on_disk_name(Path::new(file)).unwrap_or_else(|| file.to_string());
    if fixed != file {
      debug!(from = file, to = %fixed, "fixed filename case");
    }
    self.case_cache.insert(file.to_string(), fixed.clone());
    fixed
  }

  /// Copy the PDB verbatim into the store slot.
  pub async fn copy_debug(&self, file: &Path, entry: &SymbolStoreEntry, store_root: &Path) -> Result<String, CopyError> {
    let rel_path = entry.debug_copy_rel_path();
    let dest = full_path(store_root, &rel_path);

    copy_file(file, &dest).await.map_err(|source| CopyError::Copy {
      from: file.to_path_buf(),
      to: dest.clone(),
      source,
    })?;

    Ok(rel_path)
  }
}

async fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
  if let Some(parent) = to.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::copy(from, to).await
}

fn on_disk_name(file: &Path) -> Option<String> {
  let dir = file.parent().filter(|d| !d.as_os_str().is_empty())?;
  let name = file.file_name()?;
  let wanted = name.to_string_lossy().to_lowercase();

  let mut found = None;
  for entry in fs::read_dir(dir).ok()?.filter_map(Result::ok) {
    let candidate = entry.file_name();
    if candidate.as_os_str() == name {
      found = Some(candidate);
      break;
    }
    if found.is_none() && candidate.to_string_lossy().to_lowercase() == wanted {
      found = Some(candidate);
    }
  }

  found.map(|candidate| dir.join(candidate).to_string_lossy().into_owned())
}
