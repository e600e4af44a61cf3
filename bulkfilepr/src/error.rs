//! Error types for the apply engine.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Mutating step of the update sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateBranch,
    WriteFile,
    StageFile,
    Commit,
    Push,
    CreatePullRequest,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Step::CreateBranch => "create branch",
            Step::WriteFile => "write file",
            Step::StageFile => "stage file",
            Step::Commit => "commit",
            Step::Push => "push",
            Step::CreatePullRequest => "create PR",
        };
        f.write_str(text)
    }
}

/// Result of switching back to the default branch after a failed step.
///
/// Recorded for diagnosis only; it never replaces the step failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollback {
    Restored,
    Failed(String),
}

/// All errors an apply run can end with.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("failed to detect default branch")]
    DefaultBranch(#[source] anyhow::Error),

    #[error("failed to get current branch")]
    CurrentBranch(#[source] anyhow::Error),

    #[error("not on default branch: current branch is {current:?}, expected {expected:?}")]
    WrongBranch { current: String, expected: String },

    #[error("failed to check working tree status")]
    WorkingTreeStatus(#[source] anyhow::Error),

    #[error("working tree is not clean: please commit or stash your changes")]
    DirtyWorkingTree,

    #[error("failed to read existing file {}", path.display())]
    ReadExisting {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to check whether branch {branch} exists")]
    BranchLookup {
        branch: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to {step}")]
    Step {
        step: Step,
        #[source]
        source: anyhow::Error,
        rollback: Rollback,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_message_names_the_step_and_keeps_source() {
        let err = ApplyError::Step {
            step: Step::Push,
            source: anyhow::anyhow!("remote rejected"),
            rollback: Rollback::Failed("checkout failed".to_string()),
        };
        assert_eq!(err.to_string(), "failed to push");
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain, "failed to push: remote rejected");
    }

    #[test]
    fn wrong_branch_names_both_branches() {
        let err = ApplyError::WrongBranch {
            current: "feature".to_string(),
            expected: "main".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "not on default branch: current branch is \"feature\", expected \"main\""
        );
    }
}
