//! Side-effecting adapters: subprocesses, git/gh, and the managed file.

pub mod files;
pub mod git;
pub mod process;
pub mod repository;
