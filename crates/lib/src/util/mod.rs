//! Shared utilities.
//!
//! Lexical path handling used across the crate, plus test helpers.

pub mod path;

#[cfg(test)]
pub mod testutil;
