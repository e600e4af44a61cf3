//! Orchestration for a single `bulkfilepr apply`.
//!
//! A run checks repository preconditions, evaluates the mode policy against
//! the managed file, and, when a change is warranted, creates a branch, writes
//! and commits the file, pushes, and opens a pull request. Any failed step
//! switches the checkout back to the default branch before reporting.

use tracing::{debug, info, instrument, warn};

use crate::config::ApplyConfig;
use crate::core::mode::{Decision, branch_for_content, evaluate};
use crate::core::types::{Action, Outcome};
use crate::error::{ApplyError, Rollback, Step};
use crate::io::files::{file_exists, read_file, write_file};
use crate::io::repository::{PullRequest, Repository};

pub const REASON_BRANCH_EXISTS: &str = "branch already exists, assuming previous successful run";

/// Execute one apply run against `repo` with `new_content` as the desired file bytes.
///
/// Precondition checks and mode evaluation are read-only. Dry runs stop once the
/// branch name is known. A branch that already exists locally or on the remote
/// is treated as the result of an earlier successful run and left alone.
#[instrument(skip_all, fields(mode = %config.mode, destination = %config.destination, dry_run = config.dry_run))]
pub fn run_apply<R: Repository + ?Sized>(
    config: &ApplyConfig,
    repo: &R,
    new_content: &[u8],
) -> Result<Outcome, ApplyError> {
    config.validate()?;

    let default_branch = repo.default_branch().map_err(ApplyError::DefaultBranch)?;
    let current = repo.current_branch().map_err(ApplyError::CurrentBranch)?;
    if current != default_branch {
        return Err(ApplyError::WrongBranch {
            current,
            expected: default_branch,
        });
    }
    if !repo
        .is_working_tree_clean()
        .map_err(ApplyError::WorkingTreeStatus)?
    {
        return Err(ApplyError::DirtyWorkingTree);
    }

    let existing = read_existing(config)?;
    if let Decision::NoAction(reason) = evaluate(
        config.mode,
        existing.as_deref(),
        new_content,
        &config.accepted_fingerprints,
    ) {
        info!(reason = %reason, "no action taken");
        return Ok(Outcome::no_action(default_branch, reason));
    }

    let branch = resolve_branch(config, new_content);
    let mut outcome = Outcome {
        default_branch,
        action: Action::WouldUpdate,
        branch: Some(branch.clone()),
        pr_url: None,
        reason: None,
    };
    if config.dry_run {
        info!(branch = %branch, "dry run, would update");
        return Ok(outcome);
    }

    let exists = repo
        .branch_exists(&branch, &config.remote)
        .map_err(|source| ApplyError::BranchLookup {
            branch: branch.clone(),
            source,
        })?;
    if exists {
        info!(branch = %branch, "branch already exists, skipping");
        outcome.action = Action::BranchExists;
        outcome.reason = Some(REASON_BRANCH_EXISTS.to_string());
        return Ok(outcome);
    }

    let pr_url = update_on_branch(config, repo, &outcome.default_branch, &branch, new_content)?;
    info!(branch = %branch, url = %pr_url, "pull request opened");
    outcome.action = Action::Updated;
    outcome.pr_url = Some(pr_url);

    // The pull request is already open; a failed switch back only affects the local checkout.
    if let Err(err) = repo.switch_branch(&outcome.default_branch) {
        warn!(err = %format!("{err:#}"), "failed to switch back to default branch");
    }
    Ok(outcome)
}

/// Branch to use: the explicit override, else one derived from the content digest.
pub fn resolve_branch(config: &ApplyConfig, new_content: &[u8]) -> String {
    match config.branch.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => branch_for_content(new_content),
    }
}

fn read_existing(config: &ApplyConfig) -> Result<Option<Vec<u8>>, ApplyError> {
    if !file_exists(&config.repo, &config.destination) {
        debug!("managed file does not exist");
        return Ok(None);
    }
    read_file(&config.repo, &config.destination)
        .map(Some)
        .map_err(|source| ApplyError::ReadExisting {
            path: config.repo.join(&config.destination),
            source,
        })
}

/// Run the mutating sequence; on failure, try to restore the default branch.
fn update_on_branch<R: Repository + ?Sized>(
    config: &ApplyConfig,
    repo: &R,
    default_branch: &str,
    branch: &str,
    new_content: &[u8],
) -> Result<String, ApplyError> {
    let attempt = (|| -> Result<String, (Step, anyhow::Error)> {
        debug!(branch, "creating branch");
        repo.create_branch(branch)
            .map_err(|e| (Step::CreateBranch, e))?;

        debug!("writing managed file");
        write_file(&config.repo, &config.destination, new_content).map_err(|e| {
            (
                Step::WriteFile,
                anyhow::Error::new(e).context(format!("write {}", config.destination)),
            )
        })?;

        debug!("staging managed file");
        repo.add_file(&config.destination)
            .map_err(|e| (Step::StageFile, e))?;

        debug!("committing");
        repo.commit(&config.commit_message())
            .map_err(|e| (Step::Commit, e))?;

        debug!(remote = %config.remote, "pushing");
        repo.push(&config.remote, branch)
            .map_err(|e| (Step::Push, e))?;

        debug!(draft = config.draft, "creating pull request");
        repo.create_pr(&PullRequest {
            base: default_branch.to_string(),
            head: branch.to_string(),
            title: config.pr_title(),
            body: config.pr_body(),
            draft: config.draft,
        })
        .map_err(|e| (Step::CreatePullRequest, e))
    })();

    attempt.map_err(|(step, source)| {
        warn!(step = %step, err = %format!("{source:#}"), "update step failed, restoring default branch");
        let rollback = match repo.switch_branch(default_branch) {
            Ok(()) => Rollback::Restored,
            Err(err) => {
                let message = format!("{err:#}");
                warn!(err = %message, "failed to restore default branch");
                Rollback::Failed(message)
            }
        };
        ApplyError::Step {
            step,
            source,
            rollback,
        }
    })
}
