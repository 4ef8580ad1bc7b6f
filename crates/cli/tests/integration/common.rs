//! Shared test helpers for CLI integration tests.
//!
//! External tools are replaced by small shell scripts inside the test's
//! temporary directory and pointed at through the tool override variables.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding the fake tools, the
/// build outputs and the symbol store.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.script("file", "echo 'ELF 64-bit LSB shared object, x86-64'");
    env.script(
      "objcopy",
      "case \"$1\" in\n  --only-keep-debug) cp \"$2\" \"$3\" ;;\nesac",
    );
    env
  }

  pub fn path(&self) -> &Path {
    self.temp.path()
  }

  pub fn store(&self) -> PathBuf {
    self.path().join("store")
  }

  /// Write an executable shell script into the environment.
  pub fn script(&self, name: &str, body: &str) -> PathBuf {
    let path = self.path().join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
  }

  /// A dump_syms stand-in that prints `output` for every invocation.
  pub fn dumper(&self, output: &str) -> PathBuf {
    let out = self.path().join("dump_syms.out");
    fs::write(&out, output).unwrap();
    let log = self.path().join("dump_syms.log");
    self.script(
      "dump_syms",
      &format!("echo \"$@\" >> '{}'\ncat '{}'", log.display(), out.display()),
    )
  }

  /// Create a fake build output relative to the environment.
  pub fn write_file(&self, relative_path: &str, content: &[u8]) -> PathBuf {
    let path = self.path().join(relative_path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
  }

  /// A CVS checkout with a single file `repo/foo.c` at revision 1.4.
  pub fn cvs_checkout(&self) -> PathBuf {
    self.write_file("src/repo/CVS/Root", b":pserver:anonymous@example.com:/cvsroot\n");
    self.write_file("src/repo/CVS/Entries", b"/foo.c/1.4/Mon Jan  1 00:00:00 2007//\n");
    self.write_file("src/repo/foo.c", b"int foo(void) { return 0; }\n")
  }

  /// `symbolstore` with tool overrides pointing into the environment.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("symbolstore");
    cmd
      .current_dir(self.path())
      .env("SYMSTORE_FILE", self.path().join("file"))
      .env("SYMSTORE_OBJCOPY", self.path().join("objcopy"))
      .env("SYMSTORE_SVN", self.path().join("svn"))
      .env_remove("RUST_LOG");
    cmd
  }

  pub fn read_store(&self, rel_path: &str) -> String {
    fs::read_to_string(self.store().join(rel_path)).unwrap()
  }
}
