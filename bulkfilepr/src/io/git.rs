//! Subprocess-backed repository port.
//!
//! Drives `git` for local branch/commit/push work and `gh` for the hosting
//! side (default branch lookup and pull request creation). Every child process
//! runs under [`CommandLimits`].

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::io::process::{CommandLimits, CommandOutput, run_command_with_timeout};
use crate::io::repository::{PullRequest, Repository};

/// Parsed `git status --porcelain` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// 2-letter XY code, or "??" for untracked.
    pub code: String,
    /// Path for the changed file.
    pub path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoView {
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

/// [`Repository`] implementation that shells out to `git` and `gh` in a checkout.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
    limits: CommandLimits,
}

impl GitRepository {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            limits: CommandLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CommandLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get status entries (including untracked) in porcelain format.
    pub fn status_porcelain(&self) -> Result<Vec<StatusEntry>> {
        let out = self.git_capture(&["status", "--porcelain=v1", "-uall"])?;
        let mut entries = Vec::new();
        for line in out.lines() {
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_status_line(line)?);
        }
        Ok(entries)
    }

    fn ref_exists(&self, reference: &str) -> Result<bool> {
        let output = self.run("git", &["rev-parse", "--verify", "--quiet", reference])?;
        if output.timed_out {
            return Err(anyhow!("git rev-parse --verify {reference} timed out"));
        }
        Ok(output.success())
    }

    fn git_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked("git", args)?;
        Ok(output.stdout_lossy())
    }

    fn gh_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked("gh", args)?;
        Ok(output.stdout_lossy())
    }

    fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(program, args)?;
        if output.timed_out {
            return Err(anyhow!(
                "{program} {} timed out after {}s",
                args.join(" "),
                self.limits.timeout.as_secs()
            ));
        }
        if !output.success() {
            let stderr = output.stderr_lossy();
            return Err(anyhow!(
                "{program} {} failed: {}",
                args.join(" "),
                stderr.trim()
            ));
        }
        Ok(output)
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.workdir);
        run_command_with_timeout(cmd, self.limits)
            .with_context(|| format!("spawn {program} {}", args.join(" ")))
    }
}

impl Repository for GitRepository {
    #[instrument(skip_all)]
    fn default_branch(&self) -> Result<String> {
        let out = self.gh_capture(&["repo", "view", "--json", "defaultBranchRef"])?;
        let name = parse_default_branch(&out)?;
        debug!(branch = %name, "default branch");
        Ok(name)
    }

    #[instrument(skip_all)]
    fn current_branch(&self) -> Result<String> {
        let out = self.git_capture(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let name = out.trim().to_string();
        if name == "HEAD" {
            warn!("detached HEAD detected");
            return Err(anyhow!("detached HEAD (refuse to run)"));
        }
        debug!(branch = %name, "current branch");
        Ok(name)
    }

    #[instrument(skip_all)]
    fn is_working_tree_clean(&self) -> Result<bool> {
        let entries = self.status_porcelain()?;
        if entries.is_empty() {
            debug!("worktree is clean");
            return Ok(true);
        }
        warn!(changed = entries.len(), "worktree not clean");
        for entry in &entries {
            debug!(code = %entry.code, path = %entry.path, "uncommitted change");
        }
        Ok(false)
    }

    #[instrument(skip_all, fields(branch = name, remote = remote))]
    fn branch_exists(&self, name: &str, remote: &str) -> Result<bool> {
        if self.ref_exists(&format!("refs/heads/{name}"))? {
            debug!("branch exists locally");
            return Ok(true);
        }
        // Only cached remote-tracking refs are consulted; no fetch happens here.
        if self.ref_exists(&format!("refs/remotes/{remote}/{name}"))? {
            debug!("branch exists on remote");
            return Ok(true);
        }
        Ok(false)
    }

    #[instrument(skip_all, fields(branch = name))]
    fn create_branch(&self, name: &str) -> Result<()> {
        debug!("creating and checking out new branch");
        self.run_checked("git", &["checkout", "-b", name])
            .with_context(|| format!("create branch {name}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(branch = name))]
    fn switch_branch(&self, name: &str) -> Result<()> {
        debug!("checking out branch");
        self.run_checked("git", &["checkout", name])
            .with_context(|| format!("switch to branch {name}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(path = path))]
    fn add_file(&self, path: &str) -> Result<()> {
        self.run_checked("git", &["add", "--", path])
            .with_context(|| format!("stage {path}"))?;
        Ok(())
    }

    #[instrument(skip_all)]
    fn commit(&self, message: &str) -> Result<()> {
        debug!("committing staged changes");
        self.run_checked("git", &["commit", "-m", message])?;
        Ok(())
    }

    #[instrument(skip_all, fields(remote = remote, branch = branch))]
    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        debug!("pushing branch");
        self.run_checked("git", &["push", "-u", remote, branch])
            .with_context(|| format!("push to {remote}/{branch}"))?;
        Ok(())
    }

    #[instrument(skip_all, fields(base = %request.base, head = %request.head, draft = request.draft))]
    fn create_pr(&self, request: &PullRequest) -> Result<String> {
        let mut args = vec![
            "pr",
            "create",
            "--base",
            request.base.as_str(),
            "--head",
            request.head.as_str(),
            "--title",
            request.title.as_str(),
            "--body",
            request.body.as_str(),
        ];
        if request.draft {
            args.push("--draft");
        }
        let out = self.gh_capture(&args)?;
        // `gh pr create` prints progress lines before the URL; the URL is last.
        let url = out
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .ok_or_else(|| anyhow!("gh pr create returned no URL"))?
            .to_string();
        debug!(url = %url, "pull request created");
        Ok(url)
    }
}

fn parse_default_branch(raw: &str) -> Result<String> {
    let view: RepoView = serde_json::from_str(raw).context("parse gh repo view output")?;
    let name = view
        .default_branch_ref
        .map(|branch| branch.name.trim().to_string())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(anyhow!("failed to get default branch: empty response"));
    }
    Ok(name)
}

fn parse_status_line(line: &str) -> Result<StatusEntry> {
    if let Some(path) = line.strip_prefix("?? ") {
        return Ok(StatusEntry {
            code: "??".to_string(),
            path: path.trim().to_string(),
        });
    }
    if line.len() < 4 {
        return Err(anyhow!("unexpected porcelain line: '{line}'"));
    }
    let code = line[..2].to_string();
    let mut path = line[3..].trim().to_string();
    if let Some((_, new)) = path.split_once("->") {
        path = new.trim().to_string();
    }
    Ok(StatusEntry { code, path })
}
