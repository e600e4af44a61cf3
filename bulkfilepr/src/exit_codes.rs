//! Stable exit codes for the bulkfilepr CLI.

/// Command succeeded, including runs where nothing needed to change.
pub const OK: i32 = 0;
/// The run failed (repository precondition, git/gh step, unreadable input).
pub const OPERATIONAL: i32 = 1;
/// Invalid usage: missing or invalid flags, unknown subcommand, invalid configuration.
pub const USAGE: i32 = 2;
