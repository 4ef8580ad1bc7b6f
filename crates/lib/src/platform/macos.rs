//! macOS strategy: Mach-O executables and dylibs. Debug info is never copied.

use std::path::{Path, PathBuf};

use super::probe::file_type;
use super::{has_suffix, is_executable};

#[derive(Debug)]
pub struct MacDumper {
  file_cmd: PathBuf,
}

impl MacDumper {
  pub fn new(file_cmd: PathBuf) -> Self {
    Self { file_cmd }
  }

  /// Accept executables and `.dylib` files that `file(1)` reports as Mach-O.
  pub async fn should_process(&self, path: &Path) -> bool {
    if !(has_suffix(path, ".dylib") || is_executable(path)) {
      return false;
    }
    file_type(&self.file_cmd, path).await.starts_with("Mach-O")
  }
}
