//! Test utilities for symstore-lib.
//!
//! Fake external tools are tiny `/bin/sh` scripts written into a temp
//! directory. Tests that spawn them are `#[serial]` so that no other test
//! forks while a script is still open for writing.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Write an executable shell script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// A dump_syms stand-in that prints `output` and appends its arguments to
/// `dump_syms.log` next to the script.
pub fn fake_dumper(dir: &Path, output: &str) -> PathBuf {
  let out = dir.join("dump_syms.out");
  fs::write(&out, output).unwrap();
  let log = dir.join("dump_syms.log");
  write_script(
    dir,
    "dump_syms",
    &format!("echo \"$@\" >> '{}'\ncat '{}'", log.display(), out.display()),
  )
}

/// A `file(1)` stand-in that always answers `description`.
pub fn fake_file_probe(dir: &Path, description: &str) -> PathBuf {
  write_script(dir, "file", &format!("echo '{}'", description))
}

/// Lines appended to `<dir>/<name>` by a fake tool.
pub fn logged_lines(dir: &Path, name: &str) -> Vec<String> {
  fs::read_to_string(dir.join(name))
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}
