//! `file(1)` probing.

use std::ffi::OsStr;
use std::path::Path;

use tracing::debug;

use crate::process;

/// Describe the payload of `path` with `file -Lb`.
///
/// `-L` follows symlinks and `-b` omits the file name. Any failure yields an
/// empty description, which no eligibility check accepts.
pub async fn file_type(file_cmd: &Path, path: &Path) -> String {
  match process::output(file_cmd, [OsStr::new("-Lb"), path.as_os_str()], None).await {
    Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
    Ok(output) => {
      debug!(path = %path.display(), code = ?output.status.code(), "file probe failed");
      String::new()
    }
    Err(e) => {
      debug!(path = %path.display(), error = %e, "file probe failed");
      String::new()
    }
  }
}
