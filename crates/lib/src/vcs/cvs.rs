//! CVS working-copy metadata (`CVS/Root`, `CVS/Entries`).

use std::fs;
use std::path::Path;

use tracing::debug;

use super::{SourceFileRef, VcsError, VcsKind};
use crate::util::path::normalize_path;

pub fn resolve(file: &str, dir: &Path, name: &str, srcdir: Option<&Path>) -> Result<SourceFileRef, VcsError> {
  let control = dir.join("CVS");

  let root = fs::read_to_string(control.join("Root"))
    .ok()
    .and_then(|contents| contents.lines().next().and_then(parse_root))
    .ok_or_else(|| VcsError::CvsRoot(file.to_string()))?;

  let revision = fs::read_to_string(control.join("Entries"))
    .ok()
    .and_then(|contents| find_revision(&contents, name))
    .ok_or_else(|| VcsError::CvsRevision(file.to_string()))?;

  let rel_path = relative_name(file, srcdir);
  debug!(file, root = %root, revision = %revision, "resolved CVS file");

  Ok(SourceFileRef::versioned(VcsKind::Cvs, file, root, rel_path, revision))
}

/// `:pserver:anonymous@cvs.mozilla.org:/cvsroot` becomes `cvs.mozilla.org/cvsroot`.
///
/// Only the segment after the first `@` is kept, with every colon removed.
/// Roots without a user part are not supported.
pub fn parse_root(line: &str) -> Option<String> {
  let mut parts = line.trim().split('@');
  parts.next();
  parts.next().map(|host| host.replace(':', ""))
}

/// Revision of `name` from the `/name/revision/date/options/tag` records.
pub fn find_revision(entries: &str, name: &str) -> Option<String> {
  entries.lines().find_map(|line| {
    let mut fields = line.split('/');
    fields.next();
    match (fields.next(), fields.next()) {
      (Some(entry), Some(revision)) if entry == name => Some(revision.to_string()),
      _ => None,
    }
  })
}

/// Repository-relative name for a file under `srcdir`.
///
/// The source root is stripped when it prefixes the normalized path (ASCII
/// case-insensitively, since compilers may lowercase recorded names) and its
/// last component is put back in front:
///
/// ```text
/// srcdir /builds/mozilla, file /builds/mozilla/browser/app.cpp -> mozilla/browser/app.cpp
/// ```
pub fn relative_name(file: &str, srcdir: Option<&Path>) -> String {
  let Some(srcdir) = srcdir else {
    return file.to_string();
  };

  let normalized = normalize_path(Path::new(file)).to_string_lossy().into_owned();
  let prefix = srcdir.to_string_lossy();

  let rest = match normalized.get(..prefix.len()) {
    Some(head) if head.eq_ignore_ascii_case(&prefix) => &normalized[prefix.len()..],
    _ => normalized.as_str(),
  };

  let tail = srcdir
    .file_name()
    .or_else(|| srcdir.parent().and_then(Path::file_name))
    .map(|t| t.to_string_lossy().into_owned())
    .unwrap_or_default();

  format!("{}{}", tail, rest)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn root_drops_method_user_and_colons() {
    assert_eq!(
      parse_root(":pserver:anonymous@cvs-mirror.mozilla.org:/cvsroot\n").as_deref(),
      Some("cvs-mirror.mozilla.org/cvsroot")
    );
    assert_eq!(parse_root(":ext:ted@example.com:/cvsroot").as_deref(), Some("example.com/cvsroot"));
  }

  #[test]
  fn root_without_user_is_unresolved() {
    assert_eq!(parse_root(":local:/var/cvsroot"), None);
    assert_eq!(parse_root(""), None);
  }

  #[test]
  fn revision_comes_from_matching_entry() {
    let entries = "/Makefile.in/1.12/Tue Mar  6 2007//\n/foo.c/1.4/Mon Jan  1 2007//\nD/sub////\n";
    assert_eq!(find_revision(entries, "foo.c").as_deref(), Some("1.4"));
    assert_eq!(find_revision(entries, "Makefile.in").as_deref(), Some("1.12"));
    assert_eq!(find_revision(entries, "missing.c"), None);
  }

  #[test]
  fn short_entry_records_are_ignored() {
    assert_eq!(find_revision("/foo.c\n", "foo.c"), None);
  }

  #[test]
  #[cfg(unix)]
  fn relative_name_prefixes_last_srcdir_component() {
    assert_eq!(
      relative_name("/builds/mozilla/browser/app/nsBrowserApp.cpp", Some(Path::new("/builds/mozilla"))),
      "mozilla/browser/app/nsBrowserApp.cpp"
    );
    assert_eq!(relative_name("/src/repo/foo.c", Some(Path::new("/src"))), "src/repo/foo.c");
  }

  #[test]
  #[cfg(unix)]
  fn srcdir_match_ignores_case() {
    assert_eq!(
      relative_name("/builds/mozilla/xpcom/base/nsdebug.cpp", Some(Path::new("/Builds/Mozilla"))),
      "Mozilla/xpcom/base/nsdebug.cpp"
    );
  }

  #[test]
  #[cfg(unix)]
  fn file_outside_srcdir_keeps_full_path() {
    assert_eq!(
      relative_name("/usr/include/stdio.h", Some(Path::new("/builds/mozilla"))),
      "mozilla/usr/include/stdio.h"
    );
  }

  #[test]
  #[cfg(unix)]
  fn path_is_normalized_before_stripping() {
    assert_eq!(
      relative_name("/builds/mozilla/obj/../dom/x.cpp", Some(Path::new("/builds/mozilla"))),
      "mozilla/dom/x.cpp"
    );
  }

  #[test]
  fn no_srcdir_keeps_raw_path() {
    assert_eq!(relative_name("/a/./b.c", None), "/a/./b.c");
  }
}
