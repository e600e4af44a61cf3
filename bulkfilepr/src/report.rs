//! Rendering of apply outcomes for stdout.

use anyhow::{Context, Result};

use crate::core::types::{Action, Mode, Outcome};

/// Human-readable summary, one `Key: value` line per fact.
pub fn render_text(mode: Mode, outcome: &Outcome) -> String {
    let mut lines = vec![
        format!("Default branch: {}", outcome.default_branch),
        format!("Mode: {mode}"),
    ];
    let branch = outcome.branch.as_deref().unwrap_or_default();
    let reason = outcome.reason.as_deref().unwrap_or_default();
    match outcome.action {
        Action::NoAction => {
            lines.push("Action: no action taken".to_string());
            lines.push(format!("Reason: {reason}"));
        }
        Action::WouldUpdate => {
            lines.push("Action: would update (dry run)".to_string());
            lines.push(format!("Branch: {branch}"));
        }
        Action::BranchExists => {
            lines.push("Action: branch already exists (idempotent - no action taken)".to_string());
            lines.push(format!("Branch: {branch}"));
            lines.push(format!("Reason: {reason}"));
        }
        Action::Updated => {
            lines.push("Action: updated".to_string());
            lines.push(format!("Branch: {branch}"));
            lines.push(format!(
                "PR URL: {}",
                outcome.pr_url.as_deref().unwrap_or_default()
            ));
        }
    }
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Pretty-printed JSON with trailing newline.
pub fn render_json(outcome: &Outcome) -> Result<String> {
    let mut payload = serde_json::to_string_pretty(outcome).context("serialize outcome")?;
    payload.push('\n');
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn updated() -> Outcome {
        Outcome {
            default_branch: "main".to_string(),
            action: Action::Updated,
            branch: Some("bulkfilepr/abc123def456".to_string()),
            pr_url: Some("https://github.com/owner/repo/pull/1".to_string()),
            reason: None,
        }
    }

    #[test]
    fn text_for_updated_includes_branch_and_url() {
        let text = render_text(Mode::Upsert, &updated());
        assert_eq!(
            text,
            "Default branch: main\nMode: upsert\nAction: updated\n\
             Branch: bulkfilepr/abc123def456\nPR URL: https://github.com/owner/repo/pull/1\n"
        );
    }

    #[test]
    fn text_for_no_action_includes_reason() {
        let outcome = Outcome::no_action("main".to_string(), "file does not exist");
        let text = render_text(Mode::Exists, &outcome);
        assert!(text.contains("Action: no action taken\n"));
        assert!(text.contains("Reason: file does not exist\n"));
        assert!(!text.contains("Branch:"));
    }

    #[test]
    fn text_for_dry_run_marks_dry_run() {
        let mut outcome = updated();
        outcome.action = Action::WouldUpdate;
        outcome.pr_url = None;
        let text = render_text(Mode::Match, &outcome);
        assert!(text.contains("Action: would update (dry run)\n"));
        assert!(!text.contains("PR URL"));
    }

    #[test]
    fn json_round_trips_outcome() {
        let json = render_json(&updated()).expect("json");
        assert!(json.ends_with('\n'));
        let parsed: Outcome = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, updated());
        assert!(json.contains("\"action\": \"updated\""));
    }
}
