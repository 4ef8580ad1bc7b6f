//! Lexical path helpers.

use std::path::{Component, Path, PathBuf};

/// Collapse `.`, `..` and redundant separators without touching the filesystem.
///
/// `..` never climbs above the root of an absolute path. An empty result
/// becomes `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  let mut depth = 0usize;

  for component in path.components() {
    match component {
      Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
      Component::CurDir => {}
      Component::ParentDir => {
        if depth > 0 {
          out.pop();
          depth -= 1;
        } else if !out.has_root() {
          out.push("..");
        }
      }
      Component::Normal(part) => {
        out.push(part);
        depth += 1;
      }
    }
  }

  if out.as_os_str().is_empty() {
    out.push(".");
  }
  out
}

/// Replace every backslash with a forward slash.
pub fn forward_slashes(path: &str) -> String {
  path.replace('\\', "/")
}
