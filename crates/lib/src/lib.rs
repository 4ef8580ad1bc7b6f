//! symstore-lib: debug-symbol extraction and symbol-store construction.
//!
//! - `dump`: the store driver that walks inputs and runs the dumper
//! - `symbols`: streaming rewrite of dumper output into `.sym` files
//! - `vcs`: CVS/SVN identity of source files named in `FILE` records
//! - `platform`: per-OS eligibility, filename handling and debug-info packaging
//! - `srcsrv`: source-server index streams for PDB files

pub mod consts;
pub mod dump;
pub mod platform;
pub mod process;
pub mod srcsrv;
pub mod store;
pub mod symbols;
pub mod tools;
pub mod util;
pub mod vcs;

pub use dump::{DumpError, DumpOptions, DumpReport, SymbolDumper};
