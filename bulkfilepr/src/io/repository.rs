//! Repository port used by the apply engine.
//!
//! The [`Repository`] trait decouples orchestration from how git and the
//! hosting CLI are driven. [`crate::io::git::GitRepository`] spawns `git` and
//! `gh`; tests use an in-memory recorder that never spawns processes.

use anyhow::Result;

/// Parameters for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Branch the pull request merges into.
    pub base: String,
    /// Branch carrying the change.
    pub head: String,
    pub title: String,
    pub body: String,
    pub draft: bool,
}

/// Everything the engine needs from version control and the hosting service.
///
/// Every call blocks until the underlying operation completes.
pub trait Repository {
    /// Name of the repository's primary branch, as reported by the host.
    fn default_branch(&self) -> Result<String>;

    /// Currently checked-out branch.
    fn current_branch(&self) -> Result<String>;

    /// True when there are no staged, unstaged, or untracked changes.
    fn is_working_tree_clean(&self) -> Result<bool>;

    /// True when `name` exists locally or as a cached `remote` tracking ref.
    fn branch_exists(&self, name: &str, remote: &str) -> Result<bool>;

    /// Create `name` at HEAD and check it out.
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Check out an existing branch.
    fn switch_branch(&self, name: &str) -> Result<()>;

    /// Stage a single path.
    fn add_file(&self, path: &str) -> Result<()>;

    fn commit(&self, message: &str) -> Result<()>;

    /// Push `branch` to `remote`, setting upstream.
    fn push(&self, remote: &str, branch: &str) -> Result<()>;

    /// Open a pull request and return its URL.
    fn create_pr(&self, request: &PullRequest) -> Result<String>;
}
