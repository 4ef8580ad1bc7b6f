//! Breakpad symbol files.
//!
//! dump_syms prints a `MODULE` header followed by records such as `FILE`,
//! `FUNC`, `PUBLIC` and `STACK`. Only `MODULE` and `FILE` are interpreted
//! here; everything else is passed through untouched.

pub mod module;
pub mod rewrite;

pub use module::ModuleHeader;
pub use rewrite::{Dumped, RewriteContext, RewriteError, rewrite};
