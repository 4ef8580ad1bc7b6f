//! End-to-end symbol store runs on Linux with fake external tools.

#![cfg(target_os = "linux")]

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

const LIBFOO_SYM: &str = "libfoo.so/ABCDEF0123456789/libfoo.so.sym";

fn libfoo_output(source: &str) -> String {
  format!(
    "MODULE Linux x86 ABCDEF0123456789 libfoo.so\nFILE 0 {}\nFUNC 1000 10 0 foo_init\n1000 10 42 0\nPUBLIC 1000 0 foo_init\n",
    source
  )
}

#[test]
#[serial]
fn stores_symbols_with_vcs_names() {
  let env = TestEnv::new();
  let foo = env.cvs_checkout();
  let dumper = env.dumper(&libfoo_output(&foo.display().to_string()));
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF");

  env
    .cmd()
    .arg("-v")
    .arg("-s")
    .arg(env.path().join("src/repo"))
    .arg(&dumper)
    .arg(env.store())
    .arg(&lib)
    .assert()
    .success()
    .stdout(format!("{}\n", LIBFOO_SYM));

  assert_eq!(
    env.read_store(LIBFOO_SYM),
    "MODULE Linux x86 ABCDEF0123456789 libfoo.so\n\
     FILE 0 cvs:example.com/cvsroot:repo/foo.c:1.4\n\
     FUNC 1000 10 0 foo_init\n\
     1000 10 42 0\n\
     PUBLIC 1000 0 foo_init\n"
  );
}

#[test]
#[serial]
fn without_vcs_info_file_names_are_kept() {
  let env = TestEnv::new();
  let dumper = env.dumper(&libfoo_output("/build/foo.c"));
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF");

  env.cmd().arg(&dumper).arg(env.store()).arg(&lib).assert().success();

  assert!(env.read_store(LIBFOO_SYM).contains("\nFILE 0 /build/foo.c\n"));
}

#[test]
#[serial]
fn copy_prints_compressed_debug_path() {
  let env = TestEnv::new();
  let dumper = env.dumper(&libfoo_output("/build/foo.c"));
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF debug");

  env
    .cmd()
    .arg("--copy")
    .arg(&dumper)
    .arg(env.store())
    .arg(&lib)
    .assert()
    .success()
    .stdout(format!(
      "{}\nlibfoo.so/ABCDEF0123456789/libfoo.so.dbg.gz\n",
      LIBFOO_SYM
    ));

  assert!(env.store().join("libfoo.so/ABCDEF0123456789/libfoo.so.dbg.gz").is_file());
  assert!(env.path().join("obj/libfoo.so.dbg").is_file());
}

#[test]
#[serial]
fn directory_input_runs_each_arch() {
  let env = TestEnv::new();
  let dumper = env.dumper(&libfoo_output("/build/foo.c"));
  env.write_file("obj/libfoo.so", b"\x7fELF");
  env.write_file("obj/README", b"not a binary");

  let assert = env
    .cmd()
    .args(["-a", "x86 x86_64"])
    .arg(&dumper)
    .arg(env.store())
    .arg(env.path().join("obj"))
    .assert()
    .success();

  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  assert_eq!(stdout.lines().collect::<Vec<_>>(), [LIBFOO_SYM, LIBFOO_SYM]);

  let calls = std::fs::read_to_string(env.path().join("dump_syms.log")).unwrap();
  let lib = env.path().join("obj/libfoo.so");
  assert_eq!(
    calls,
    format!("-a x86 {}\n-a x86_64 {}\n", lib.display(), lib.display())
  );
}

#[test]
#[serial]
fn json_output_reports_artifacts_and_failures() {
  let env = TestEnv::new();
  let dumper = env.dumper(&libfoo_output("/build/foo.c"));
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF");
  let missing = env.path().join("obj/gone.so");

  let assert = env
    .cmd()
    .args(["-o", "json"])
    .arg(&dumper)
    .arg(env.store())
    .arg(&lib)
    .arg(&missing)
    .assert()
    .success();

  let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(report["artifacts"], serde_json::json!([LIBFOO_SYM]));
  assert_eq!(report["failed"], serde_json::json!([missing.display().to_string()]));
}

#[test]
#[serial]
fn output_without_module_warns_and_succeeds() {
  let env = TestEnv::new();
  let dumper = env.script("dump_syms", "echo 'no debugging symbols found'");
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF");

  env
    .cmd()
    .arg(&dumper)
    .arg(env.store())
    .arg(&lib)
    .assert()
    .success()
    .stdout("")
    .stderr(predicate::str::contains("no symbols produced"));

  assert!(!env.store().exists());
}

#[test]
#[serial]
fn malformed_module_line_fails_run() {
  let env = TestEnv::new();
  let dumper = env.dumper("MODULE Linux x86\n");
  let lib = env.write_file("obj/libfoo.so", b"\x7fELF");

  env
    .cmd()
    .arg(&dumper)
    .arg(env.store())
    .arg(&lib)
    .assert()
    .failure()
    .stderr(predicate::str::contains("malformed MODULE record"));
}
