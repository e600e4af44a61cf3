//! bulkfilepr: create or update one file in a repository and open a pull request.
//!
//! Each invocation targets a single local checkout. Run it from (or point
//! `--repo` at) a clean checkout of the default branch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use bulkfilepr::apply::run_apply;
use bulkfilepr::config::{ApplyConfig, DEFAULT_REMOTE, parse_fingerprints};
use bulkfilepr::core::hash::sha256_file;
use bulkfilepr::core::types::{Mode, Outcome};
use bulkfilepr::io::git::GitRepository;
use bulkfilepr::io::process::CommandLimits;
use bulkfilepr::report::{render_json, render_text};
use bulkfilepr::{VERSION, exit_codes, logging};

/// clap prints `<name> <version>`, giving `bulkfilepr version <v>`.
static VERSION_LINE: LazyLock<String> = LazyLock::new(|| format!("version {VERSION}"));

#[derive(Parser)]
#[command(
    name = "bulkfilepr",
    version = VERSION_LINE.as_str(),
    propagate_version = true,
    about = "Batch-update standardized files across repositories"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a file into the repository on a new branch and open a pull request.
    Apply(ApplyArgs),
    /// Print the SHA-256 of a file, for use with `apply --expect-sha256`.
    Hash {
        /// File to hash.
        file: PathBuf,
    },
}

#[derive(Args)]
struct ApplyArgs {
    /// Update mode: upsert (always write), exists (only if present), match (only if hash matches).
    #[arg(long, value_name = "upsert|exists|match")]
    mode: Mode,
    /// Destination file path inside the repo.
    #[arg(long, value_name = "PATH")]
    repo_path: String,
    /// Path to the new file content.
    #[arg(long, value_name = "FILE")]
    new_file: PathBuf,
    /// Repository directory.
    #[arg(long, value_name = "DIR", default_value = ".")]
    repo: PathBuf,
    /// Branch name (derived from the new content if omitted).
    #[arg(long)]
    branch: Option<String>,
    /// Commit message [default: "chore: update <repo-path>"].
    #[arg(long)]
    commit_message: Option<String>,
    /// PR title [default: "Update <repo-path>"].
    #[arg(long)]
    pr_title: Option<String>,
    /// PR body.
    #[arg(long)]
    pr_body: Option<String>,
    /// Create the PR as a draft.
    #[arg(long)]
    draft: bool,
    /// Perform checks only, no changes.
    #[arg(long)]
    dry_run: bool,
    /// Git remote name.
    #[arg(long, default_value = DEFAULT_REMOTE)]
    remote: String,
    /// Expected SHA-256 of the existing file (required for match mode); comma-separated for several.
    #[arg(long, value_name = "HEX[,HEX...]")]
    expect_sha256: Option<String>,
    /// Print the outcome as JSON.
    #[arg(long)]
    json: bool,
    /// Per-command timeout for git and gh, in seconds.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

impl ApplyArgs {
    fn to_config(&self) -> ApplyConfig {
        ApplyConfig {
            mode: self.mode,
            destination: self.repo_path.clone(),
            new_file: self.new_file.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            commit_message: self.commit_message.clone(),
            pr_title: self.pr_title.clone(),
            pr_body: self.pr_body.clone(),
            draft: self.draft,
            dry_run: self.dry_run,
            remote: self.remote.clone(),
            accepted_fingerprints: self
                .expect_sha256
                .as_deref()
                .map(parse_fingerprints)
                .unwrap_or_default(),
        }
    }

    fn limits(&self) -> CommandLimits {
        CommandLimits {
            timeout: Duration::from_secs(self.timeout_secs),
            ..CommandLimits::default()
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match cli.command {
        Command::Apply(args) => cmd_apply(&args),
        Command::Hash { file } => cmd_hash(&file),
    };
    std::process::exit(code);
}

fn cmd_apply(args: &ApplyArgs) -> i32 {
    let config = args.to_config();
    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        return exit_codes::USAGE;
    }
    if args.timeout_secs == 0 {
        eprintln!("Error: --timeout-secs must be > 0");
        return exit_codes::USAGE;
    }

    let outcome = match apply_with_git(&config, args.limits()) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return exit_codes::OPERATIONAL;
        }
    };

    let rendered = if args.json {
        render_json(&outcome)
    } else {
        Ok(render_text(config.mode, &outcome))
    };
    match rendered {
        Ok(text) => {
            print!("{text}");
            exit_codes::OK
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            exit_codes::OPERATIONAL
        }
    }
}

fn apply_with_git(config: &ApplyConfig, limits: CommandLimits) -> Result<Outcome> {
    let new_content = fs::read(&config.new_file)
        .with_context(|| format!("failed to read new file {}", config.new_file.display()))?;
    let repo = GitRepository::new(&config.repo).with_limits(limits);
    Ok(run_apply(config, &repo, &new_content)?)
}

fn cmd_hash(file: &Path) -> i32 {
    match sha256_file(file) {
        Ok(digest) => {
            println!("{digest}  {}", file.display());
            exit_codes::OK
        }
        Err(err) => {
            eprintln!("Error: failed to hash {}: {err}", file.display());
            exit_codes::OPERATIONAL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apply_with_defaults() {
        let cli = Cli::parse_from([
            "bulkfilepr",
            "apply",
            "--mode",
            "upsert",
            "--repo-path",
            ".github/workflows/ci.yml",
            "--new-file",
            "ci.yml",
        ]);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        let config = args.to_config();
        assert_eq!(config.mode, Mode::Upsert);
        assert_eq!(config.repo, PathBuf::from("."));
        assert_eq!(config.remote, "origin");
        assert!(config.accepted_fingerprints.is_empty());
        assert_eq!(args.limits().timeout, Duration::from_secs(600));
    }

    #[test]
    fn parse_match_fingerprints() {
        let cli = Cli::parse_from([
            "bulkfilepr",
            "apply",
            "--mode",
            "match",
            "--repo-path",
            "a.txt",
            "--new-file",
            "b.txt",
            "--expect-sha256",
            "abc, def,",
            "--draft",
            "--dry-run",
        ]);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        let config = args.to_config();
        assert_eq!(config.accepted_fingerprints, vec!["abc", "def"]);
        assert!(config.draft);
        assert!(config.dry_run);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn invalid_mode_is_a_usage_error() {
        let err = Cli::try_parse_from([
            "bulkfilepr",
            "apply",
            "--mode",
            "sideways",
            "--repo-path",
            "a.txt",
            "--new-file",
            "b.txt",
        ])
        .err()
        .expect("should fail");
        assert_eq!(err.exit_code(), exit_codes::USAGE);
    }

    #[test]
    fn version_flag_prints_version_line() {
        let err = Cli::try_parse_from(["bulkfilepr", "--version"])
            .err()
            .expect("version exits early");
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert_eq!(err.to_string().trim_end(), format!("bulkfilepr version {VERSION}"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
