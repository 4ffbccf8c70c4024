//! Shared utilities.
//!
//! Filesystem helpers used by fusion and packaging, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
