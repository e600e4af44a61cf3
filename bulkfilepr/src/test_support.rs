//! Test-only repository doubles.
//!
//! [`RecordingRepository`] implements the repository port in memory and records
//! every mutating call. [`TestRepo`] is a throwaway git checkout with a bare
//! `origin` for exercising [`crate::io::git::GitRepository`] end to end.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use tempfile::TempDir;

use crate::io::repository::{PullRequest, Repository};

pub const DEFAULT_PR_URL: &str = "https://github.com/owner/repo/pull/1";

/// Port operation, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    DefaultBranch,
    CurrentBranch,
    CleanCheck,
    BranchExists,
    CreateBranch,
    SwitchBranch,
    AddFile,
    Commit,
    Push,
    CreatePr,
}

/// Mutating call recorded by [`RecordingRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateBranch(String),
    SwitchBranch(String),
    AddFile(String),
    Commit(String),
    Push { remote: String, branch: String },
    CreatePr(PullRequest),
}

/// In-memory repository port with scripted answers and failures.
///
/// Defaults: default and current branch `main`, clean tree, no existing
/// branches, every call succeeds.
#[derive(Debug)]
pub struct RecordingRepository {
    default_branch: String,
    current_branch: RefCell<String>,
    clean: bool,
    existing_branches: HashSet<String>,
    pr_url: String,
    failures: HashSet<Op>,
    calls: RefCell<Vec<Call>>,
}

impl Default for RecordingRepository {
    fn default() -> Self {
        Self {
            default_branch: "main".to_string(),
            current_branch: RefCell::new("main".to_string()),
            clean: true,
            existing_branches: HashSet::new(),
            pr_url: DEFAULT_PR_URL.to_string(),
            failures: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_branch(mut self, name: &str) -> Self {
        self.default_branch = name.to_string();
        self.current_branch = RefCell::new(name.to_string());
        self
    }

    pub fn on_branch(self, name: &str) -> Self {
        self.current_branch.replace(name.to_string());
        self
    }

    pub fn dirty(mut self) -> Self {
        self.clean = false;
        self
    }

    pub fn with_existing_branch(mut self, name: &str) -> Self {
        self.existing_branches.insert(name.to_string());
        self
    }

    pub fn with_pr_url(mut self, url: &str) -> Self {
        self.pr_url = url.to_string();
        self
    }

    pub fn failing(mut self, op: Op) -> Self {
        self.failures.insert(op);
        self
    }

    /// Mutating calls in the order they were made.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn created_branches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateBranch(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn commits(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Commit(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreatePr(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn current(&self) -> String {
        self.current_branch.borrow().clone()
    }

    fn check(&self, op: Op) -> Result<()> {
        if self.failures.contains(&op) {
            return Err(anyhow!("simulated {op:?} failure"));
        }
        Ok(())
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Repository for RecordingRepository {
    fn default_branch(&self) -> Result<String> {
        self.check(Op::DefaultBranch)?;
        Ok(self.default_branch.clone())
    }

    fn current_branch(&self) -> Result<String> {
        self.check(Op::CurrentBranch)?;
        Ok(self.current())
    }

    fn is_working_tree_clean(&self) -> Result<bool> {
        self.check(Op::CleanCheck)?;
        Ok(self.clean)
    }

    fn branch_exists(&self, name: &str, _remote: &str) -> Result<bool> {
        self.check(Op::BranchExists)?;
        Ok(self.existing_branches.contains(name))
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.check(Op::CreateBranch)?;
        self.record(Call::CreateBranch(name.to_string()));
        self.current_branch.replace(name.to_string());
        Ok(())
    }

    fn switch_branch(&self, name: &str) -> Result<()> {
        self.check(Op::SwitchBranch)?;
        self.record(Call::SwitchBranch(name.to_string()));
        self.current_branch.replace(name.to_string());
        Ok(())
    }

    fn add_file(&self, path: &str) -> Result<()> {
        self.check(Op::AddFile)?;
        self.record(Call::AddFile(path.to_string()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.check(Op::Commit)?;
        self.record(Call::Commit(message.to_string()));
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.check(Op::Push)?;
        self.record(Call::Push {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn create_pr(&self, request: &PullRequest) -> Result<String> {
        self.check(Op::CreatePr)?;
        self.record(Call::CreatePr(request.clone()));
        Ok(self.pr_url.clone())
    }
}

/// Temporary git checkout on `main` with one commit and a bare `origin` remote.
pub struct TestRepo {
    temp: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        let work = temp.path().join("work");
        let origin = temp.path().join("origin.git");
        fs::create_dir_all(&work).context("create work dir")?;

        git(temp.path(), &["init", "--bare", "origin.git"])?;
        git(&origin, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        git(&work, &["init"])?;
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        git(&work, &["config", "user.email", "test@example.com"])?;
        git(&work, &["config", "user.name", "test"])?;
        git(&work, &["config", "commit.gpgsign", "false"])?;
        fs::write(work.join("README.md"), "hi\n").context("write README.md")?;
        git(&work, &["add", "README.md"])?;
        git(&work, &["commit", "-m", "chore: init"])?;
        let origin = origin
            .to_str()
            .ok_or_else(|| anyhow!("non-utf8 temp path"))?
            .to_string();
        git(&work, &["remote", "add", "origin", &origin])?;
        git(&work, &["push", "-u", "origin", "main"])?;
        Ok(Self { temp })
    }

    /// Root of the working checkout.
    pub fn path(&self) -> std::path::PathBuf {
        self.temp.path().join("work")
    }

    /// Path of the bare remote.
    pub fn origin(&self) -> std::path::PathBuf {
        self.temp.path().join("origin.git")
    }

    /// Write `contents` to `relative` and commit it on the current branch.
    pub fn commit_file(&self, relative: &str, contents: &[u8]) -> Result<()> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        git(&self.path(), &["add", relative])?;
        git(&self.path(), &["commit", "-m", &format!("add {relative}")])?;
        Ok(())
    }

    /// Run git in the working checkout and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> Result<String> {
        git(&self.path(), args)
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        return Err(anyhow!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
