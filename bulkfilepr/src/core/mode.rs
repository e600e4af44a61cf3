//! Mode policy: decide whether the managed file needs a change.
//!
//! The decision is a pure function of the mode, the bytes currently on disk
//! (if any), the new bytes, and the accepted fingerprints. Reading the file is
//! the caller's job.

use crate::core::hash::{sha256_hex, truncate_hex};
use crate::core::types::Mode;

/// Prefix for branch names derived from content.
pub const BRANCH_PREFIX: &str = "bulkfilepr/";
/// Number of digest characters kept in a derived branch name.
pub const BRANCH_HASH_LEN: usize = 12;

pub const REASON_IDENTICAL: &str = "file content is already identical";
pub const REASON_MISSING: &str = "file does not exist";

/// Outcome of evaluating a mode against the current file state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    NoAction(String),
}

/// Apply `mode` to the current file state.
///
/// In [`Mode::Match`] the fingerprint check runs before the equality check, so
/// an unexpected file is reported as a mismatch even when it already holds the
/// new content.
pub fn evaluate(
    mode: Mode,
    existing: Option<&[u8]>,
    new_content: &[u8],
    accepted_fingerprints: &[String],
) -> Decision {
    let Some(existing) = existing else {
        return match mode {
            Mode::Upsert => Decision::Proceed,
            Mode::Exists | Mode::Match => Decision::NoAction(REASON_MISSING.to_string()),
        };
    };

    if mode == Mode::Match {
        let actual = sha256_hex(existing);
        if !accepted_fingerprints
            .iter()
            .any(|expected| expected.eq_ignore_ascii_case(&actual))
        {
            return Decision::NoAction(format!(
                "file hash mismatch: expected {}, got {}",
                accepted_fingerprints.join(", "),
                actual
            ));
        }
    }

    if existing == new_content {
        return Decision::NoAction(REASON_IDENTICAL.to_string());
    }
    Decision::Proceed
}

/// Deterministic branch name for `content`: identical bytes always map to the
/// same branch, so re-running after a failure converges on one branch.
pub fn branch_for_content(content: &[u8]) -> String {
    let digest = sha256_hex(content);
    format!("{BRANCH_PREFIX}{}", truncate_hex(&digest, BRANCH_HASH_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW: &[u8] = b"new content\n";
    const OLD: &[u8] = b"existing content\n";

    fn accepted(hashes: &[&str]) -> Vec<String> {
        hashes.iter().map(|h| h.to_string()).collect()
    }

    #[test]
    fn upsert_proceeds_when_absent_or_different() {
        assert_eq!(evaluate(Mode::Upsert, None, NEW, &[]), Decision::Proceed);
        assert_eq!(evaluate(Mode::Upsert, Some(OLD), NEW, &[]), Decision::Proceed);
    }

    #[test]
    fn identical_content_is_no_action_for_every_mode() {
        let fingerprints = accepted(&[sha256_hex(NEW).as_str()]);
        for mode in [Mode::Upsert, Mode::Exists, Mode::Match] {
            assert_eq!(
                evaluate(mode, Some(NEW), NEW, &fingerprints),
                Decision::NoAction(REASON_IDENTICAL.to_string()),
                "mode {mode}"
            );
        }
    }

    #[test]
    fn exists_and_match_skip_missing_file() {
        for mode in [Mode::Exists, Mode::Match] {
            assert_eq!(
                evaluate(mode, None, NEW, &accepted(&["abc"])),
                Decision::NoAction(REASON_MISSING.to_string())
            );
        }
    }

    #[test]
    fn exists_proceeds_on_different_content() {
        assert_eq!(evaluate(Mode::Exists, Some(OLD), NEW, &[]), Decision::Proceed);
    }

    #[test]
    fn match_proceeds_when_any_fingerprint_matches() {
        let fingerprints = accepted(&["deadbeef", sha256_hex(OLD).as_str()]);
        assert_eq!(
            evaluate(Mode::Match, Some(OLD), NEW, &fingerprints),
            Decision::Proceed
        );
    }

    #[test]
    fn match_fingerprint_comparison_ignores_case() {
        let upper = sha256_hex(OLD).to_ascii_uppercase();
        assert_eq!(
            evaluate(Mode::Match, Some(OLD), NEW, &accepted(&[upper.as_str()])),
            Decision::Proceed
        );
    }

    #[test]
    fn match_mismatch_names_expected_and_actual() {
        let decision = evaluate(Mode::Match, Some(OLD), NEW, &accepted(&["wronghash", "other"]));
        let Decision::NoAction(reason) = decision else {
            panic!("expected no action");
        };
        assert!(reason.starts_with("file hash mismatch"));
        assert!(reason.contains("wronghash, other"));
        assert!(reason.contains(&sha256_hex(OLD)));
    }

    #[test]
    fn match_checks_fingerprint_before_equality() {
        let decision = evaluate(Mode::Match, Some(NEW), NEW, &accepted(&["wronghash"]));
        let Decision::NoAction(reason) = decision else {
            panic!("expected no action");
        };
        assert!(reason.contains("mismatch"));
    }

    #[test]
    fn branch_name_is_stable_and_prefixed() {
        let first = branch_for_content(NEW);
        let second = branch_for_content(NEW);
        assert_eq!(first, second);
        assert_eq!(first, format!("bulkfilepr/{}", &sha256_hex(NEW)[..12]));
        assert_eq!(first.len(), BRANCH_PREFIX.len() + BRANCH_HASH_LEN);
    }

    #[test]
    fn different_content_yields_different_branch() {
        assert_ne!(branch_for_content(NEW), branch_for_content(OLD));
    }
}
