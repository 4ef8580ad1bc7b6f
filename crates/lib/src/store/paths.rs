use std::path::{Path, PathBuf};

use crate::util::path::{forward_slashes, normalize_path};

/// The store slot for one module, keyed by its debug file and GUID.
///
/// Every path derived from an entry is a pure function of `(debug_file, guid)`,
/// so two builds reporting the same GUID land in the same slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolStoreEntry {
  pub debug_file: String,
  pub guid: String,
}

impl SymbolStoreEntry {
  pub fn new(debug_file: impl Into<String>, guid: impl Into<String>) -> Self {
    Self {
      debug_file: debug_file.into(),
      guid: guid.into(),
    }
  }

  /// `foo.pdb` becomes `foo.sym`; anything else just gains `.sym`.
  pub fn sym_file_name(&self) -> String {
    let stem = self.debug_file.strip_suffix(".pdb").unwrap_or(&self.debug_file);
    format!("{}.sym", stem)
  }

  pub fn sym_rel_path(&self) -> String {
    self.rel_path(&self.sym_file_name())
  }

  /// Location of a verbatim copy of the debug file.
  pub fn debug_copy_rel_path(&self) -> String {
    self.rel_path(&self.debug_file)
  }

  /// Location of gzipped split debug info.
  pub fn compressed_debug_rel_path(&self) -> String {
    self.rel_path(&format!("{}.dbg.gz", self.debug_file))
  }

  fn rel_path(&self, file_name: &str) -> String {
    forward_slashes(&format!("{}/{}/{}", self.debug_file, self.guid, file_name))
  }
}

/// Resolve a store-relative path against the store root.
pub fn full_path(store_root: &Path, rel_path: &str) -> PathBuf {
  normalize_path(&store_root.join(rel_path))
}
