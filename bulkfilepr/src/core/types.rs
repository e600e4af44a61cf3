//! Shared deterministic types for the apply engine.
//!
//! These types define stable contracts between the policy, the engine, and the
//! CLI output. They carry no I/O and serialize the same way on every run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Policy deciding whether the managed file should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Create the file if missing, update it if present.
    Upsert,
    /// Only update a file that already exists.
    Exists,
    /// Only update a file whose current digest is one of the accepted fingerprints.
    Match,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Upsert => "upsert",
            Mode::Exists => "exists",
            Mode::Match => "match",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upsert" => Ok(Mode::Upsert),
            "exists" => Ok(Mode::Exists),
            "match" => Ok(Mode::Match),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// What a run did (or would do).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The policy found nothing to change.
    NoAction,
    /// Dry run: the change is warranted but nothing was touched.
    WouldUpdate,
    /// The branch already exists locally or on the remote; nothing was touched.
    BranchExists,
    /// A branch was pushed and a pull request opened.
    Updated,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::NoAction => "no action taken",
            Action::WouldUpdate => "would update",
            Action::BranchExists => "branch already exists",
            Action::Updated => "updated",
        };
        f.write_str(text)
    }
}

/// Result of one engine run, populated as the run progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub default_branch: String,
    pub action: Action,
    /// Branch used or that would be used. `None` when no change is warranted.
    pub branch: Option<String>,
    /// Pull request URL, only for [`Action::Updated`].
    pub pr_url: Option<String>,
    /// Why nothing was changed.
    pub reason: Option<String>,
}

impl Outcome {
    pub fn no_action(default_branch: String, reason: impl Into<String>) -> Self {
        Self {
            default_branch,
            action: Action::NoAction,
            branch: None,
            pr_url: None,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_known_names() {
        assert_eq!("upsert".parse::<Mode>().expect("upsert"), Mode::Upsert);
        assert_eq!("exists".parse::<Mode>().expect("exists"), Mode::Exists);
        assert_eq!("match".parse::<Mode>().expect("match"), Mode::Match);
    }

    #[test]
    fn mode_rejects_unknown_and_wrong_case() {
        for raw in ["", "invalid", "UPSERT", "Match"] {
            let err = raw.parse::<Mode>().expect_err("should reject");
            assert!(err.to_string().contains("must be one of: upsert, exists, match"));
        }
    }

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_string(&Action::WouldUpdate).expect("serialize");
        assert_eq!(json, "\"would_update\"");
        assert_eq!(Action::NoAction.to_string(), "no action taken");
    }
}
