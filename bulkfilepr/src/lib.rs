//! Create or update one standardized file in a git checkout and open a pull request.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (mode policy, branch naming, hashing).
//! - **[`io`]**: Side-effecting adapters (git/gh subprocesses, the managed file).
//!   The [`io::repository::Repository`] trait isolates them so tests can record
//!   calls instead of spawning processes.
//!
//! [`apply`] coordinates both to implement `bulkfilepr apply`.

pub mod apply;
pub mod config;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Release version, injected at build time through `BULKFILEPR_VERSION`.
pub const VERSION: &str = match option_env!("BULKFILEPR_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
