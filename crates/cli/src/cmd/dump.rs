//! Implementation of the symbol dump run.
//!
//! Runs the dumper over every input, writes the symbol store and reports the
//! produced store-relative paths.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use symstore_lib::platform::Platform;
use symstore_lib::tools::{Tools, resolve_pdbstr};
use symstore_lib::{DumpOptions, SymbolDumper};

use crate::output::{OutputFormat, print_artifact, print_json, print_warning};

#[derive(Debug, Args)]
pub struct DumpArgs {
  /// Copy debug info files into the same directory structure as symbol files
  #[arg(short, long)]
  pub copy: bool,

  /// Run dump_syms multiple times on the same file, passing each architecture
  /// as a -a argument (space-separated)
  #[arg(short, long, value_name = "ARCHS")]
  pub archs: Option<String>,

  /// Use CVS relative paths from this directory
  #[arg(short, long)]
  pub srcdir: Option<PathBuf>,

  /// Get source information from version control and add it to the symbol files
  #[arg(short, long)]
  pub vcs_info: bool,

  /// Add source index information to debug files, making them suitable for a source server (needs PDBSTR_PATH)
  #[arg(short = 'i', long)]
  pub source_index: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  pub output: OutputFormat,

  /// Path to the dump_syms binary
  pub dump_syms: PathBuf,

  /// Root of the symbol store
  pub symbol_path: PathBuf,

  /// Debug info files or directories to process
  #[arg(required = true)]
  pub files: Vec<PathBuf>,
}

impl DumpArgs {
  fn options(&self, pdbstr: Option<PathBuf>) -> Result<DumpOptions> {
    let mut options = DumpOptions::new(&self.dump_syms, &self.symbol_path);
    options.archs = self.archs.as_deref().map(DumpOptions::parse_archs).unwrap_or_default();
    options.srcdir = self.srcdir.clone();
    options.copy_debug = self.copy;
    options.vcs_info = self.vcs_info;
    options.pdbstr = pdbstr;
    options.stream_dir = std::env::current_dir().context("Failed to determine working directory")?;
    Ok(options)
  }
}

/// Execute the dump.
///
/// In text mode each path is printed as soon as it is written; in JSON mode
/// the full report is printed once at the end.
pub fn cmd_dump(args: DumpArgs) -> Result<()> {
  let pdbstr = if args.source_index { Some(resolve_pdbstr()?) } else { None };

  let tools = Tools::current();
  debug!(?tools, "resolved external tools");
  let platform = Platform::current(&tools)?;
  let dumper = SymbolDumper::new(args.options(pdbstr)?, platform, &tools)?;

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .context("Failed to create async runtime")?;

  let json = args.output.is_json();
  let mut emit = |rel_path: &str| {
    if !json {
      print_artifact(rel_path);
    }
  };
  let report = rt
    .block_on(dumper.process_all(args.files.as_slice(), &mut emit))
    .context("Symbol dump failed")?;

  if json {
    print_json(&report)?;
  } else if !report.failed.is_empty() {
    print_warning(&format!("{} input(s) produced no symbols", report.failed.len()));
  }

  Ok(())
}
