//! Apply configuration: the immutable policy for one invocation.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::core::types::Mode;

pub const DEFAULT_REMOTE: &str = "origin";

/// Invalid configuration, detected before the engine runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid mode: {0:?}, must be one of: upsert, exists, match")]
    InvalidMode(String),
    #[error("repo-path is required")]
    MissingDestination,
    #[error("repo-path must be a relative path inside the repository: {0:?}")]
    DestinationOutsideRepo(String),
    #[error("new-file is required")]
    MissingNewFile,
    #[error("expect-sha256 is required when mode is 'match'")]
    MissingFingerprints,
}

/// Policy for a single apply run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyConfig {
    pub mode: Mode,
    /// Destination path of the managed file, relative to `repo`.
    pub destination: String,
    /// Where the new file content is read from.
    pub new_file: PathBuf,
    /// Root of the local checkout.
    pub repo: PathBuf,
    /// Explicit branch name; derived from the new content when `None`.
    pub branch: Option<String>,
    pub commit_message: Option<String>,
    pub pr_title: Option<String>,
    pub pr_body: Option<String>,
    pub draft: bool,
    pub dry_run: bool,
    pub remote: String,
    /// Accepted SHA-256 digests of the existing file (match mode).
    pub accepted_fingerprints: Vec<String>,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Upsert,
            destination: String::new(),
            new_file: PathBuf::new(),
            repo: PathBuf::from("."),
            branch: None,
            commit_message: None,
            pr_title: None,
            pr_body: None,
            draft: false,
            dry_run: false,
            remote: DEFAULT_REMOTE.to_string(),
            accepted_fingerprints: Vec::new(),
        }
    }
}

impl ApplyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destination.trim().is_empty() {
            return Err(ConfigError::MissingDestination);
        }
        if !is_contained(&self.destination) {
            return Err(ConfigError::DestinationOutsideRepo(self.destination.clone()));
        }
        if self.new_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingNewFile);
        }
        if self.mode == Mode::Match && self.accepted_fingerprints.is_empty() {
            return Err(ConfigError::MissingFingerprints);
        }
        Ok(())
    }

    pub fn commit_message(&self) -> String {
        non_empty(&self.commit_message)
            .unwrap_or_else(|| format!("chore: update {}", self.destination))
    }

    pub fn pr_title(&self) -> String {
        non_empty(&self.pr_title).unwrap_or_else(|| format!("Update {}", self.destination))
    }

    pub fn pr_body(&self) -> String {
        non_empty(&self.pr_body).unwrap_or_else(|| {
            format!(
                "This PR updates the standardized file at `{}`.",
                self.destination
            )
        })
    }
}

/// Split a comma-separated fingerprint list, trimming whitespace and dropping
/// empty entries. Order is preserved.
pub fn parse_fingerprints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Only plain relative components; joining onto the root must not escape it.
fn is_contained(destination: &str) -> bool {
    let path = Path::new(destination);
    !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
