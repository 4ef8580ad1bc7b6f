//! Symbol store layout.
//!
//! The store is a directory tree indexed by debug-file name and GUID.
//!
//! # Layout
//!
//! ```text
//! <symbol_path>/
//! └── <debug_file>/
//!     └── <guid>/
//!         ├── <debug_file minus .pdb>.sym   # rewritten dumper output
//!         ├── <debug_file>                  # raw debug file (Windows, --copy)
//!         └── <debug_file>.dbg.gz           # split debug info (Linux, --copy)
//! ```
//!
//! Relative paths are always reported with forward slashes.

pub mod paths;

pub use paths::SymbolStoreEntry;
