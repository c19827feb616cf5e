//! Explicit attribution detector
//!
//! Looks for literal markers that AI coding tools leave behind:
//! - Bot accounts as commit authors (`copilot[bot]`, `noreply@anthropic.com`, ...)
//! - Generated-with footers and co-author lines in the PR description
//! - Labels such as `codex` or `ai-generated`
//! - Branch names created by agents (`codex/...`, `cursor-...`)
//!
//! Any match is definitive. The first match fixes the attributed tool; later
//! matches only add indicators.

use crate::detectors::base::{DetectionOutcome, Detector};
use crate::models::{
    CommitRecord, ConfidenceLevel, Indicator, IndicatorType, IndicatorWeight, PullRequestRecord,
};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

pub const EXPLICIT_ATTRIBUTION: &str = "explicit_attribution";

/// Placeholder tool name when the evidence points to AI use without naming a tool
pub const UNKNOWN_AI_TOOL: &str = "Unknown AI Tool";

/// Substring patterns identifying a tool's bot account (all lowercase)
struct AuthorRule {
    tool: &'static str,
    usernames: &'static [&'static str],
    emails: &'static [&'static str],
    names: &'static [&'static str],
}

const AUTHOR_RULES: &[AuthorRule] = &[
    AuthorRule {
        tool: "GitHub Copilot",
        usernames: &["copilot[bot]", "github-copilot"],
        emails: &["copilot@github.com"],
        names: &[],
    },
    AuthorRule {
        tool: "Claude Code",
        usernames: &["claude-bot"],
        emails: &["noreply@anthropic.com", "claude@anthropic.com"],
        names: &["claude sonnet"],
    },
    AuthorRule {
        tool: "Devin",
        usernames: &["devin-bot"],
        emails: &["bot@devin.ai", "@devin.ai"],
        names: &[],
    },
    AuthorRule {
        tool: "Cursor",
        usernames: &["cursor-bot"],
        emails: &["@cursor.so", "cursor@"],
        names: &[],
    },
    AuthorRule {
        tool: "WindSurf",
        usernames: &["windsurf"],
        emails: &["@windsurf."],
        names: &[],
    },
];

/// Tool attributed to agent labels and branch names
const CODEX_TOOL: &str = "OpenAI Codex";

/// Labels applied by agent workflows
const CODEX_LABELS: &[&str] = &["codex", "ai-generated", "copilot"];

/// Substrings of agent-created branch names (matched anywhere, lowercase)
const CODEX_BRANCH_MARKERS: &[&str] = &["codex/", "codex-", "chatgpt-", "cursor-"];

struct DescriptionRule {
    tool: &'static str,
    patterns: Vec<Regex>,
}

static DESCRIPTION_RULES: OnceLock<Vec<DescriptionRule>> = OnceLock::new();

fn description_rules() -> &'static [DescriptionRule] {
    DESCRIPTION_RULES.get_or_init(|| {
        let rule = |tool: &'static str, patterns: &[&str]| DescriptionRule {
            tool,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid regex"))
                .collect(),
        };
        vec![
            rule(
                "Claude Code",
                &[
                    r"(?i)🤖\s*Generated with.*Claude Code",
                    r"(?i)Co-Authored-By:\s*Claude.*noreply@anthropic\.com",
                    r"(?i)\[Claude Code\]\(https://claude\.com/claude-code\)",
                ],
            ),
            rule(
                "GitHub Copilot",
                &[
                    r"(?i)🤖\s*Generated with.*Copilot",
                    r"(?i)Co-Authored-By:.*GitHub Copilot",
                    r"(?i)\[GitHub Copilot\]",
                ],
            ),
            rule(
                "Cursor",
                &[
                    r"(?i)🤖\s*Generated with.*Cursor",
                    r"(?i)Co-Authored-By:.*Cursor",
                    r"(?i)\[Cursor\]",
                    r"(?i)cursor\.so",
                ],
            ),
        ]
    })
}

/// Collects matches while keeping the first attributed tool
#[derive(Default)]
struct Attribution {
    tool: Option<String>,
    indicators: Vec<Indicator>,
}

impl Attribution {
    fn record(&mut self, tool: &str, details: String) {
        debug!("Explicit attribution: {} ({})", tool, details);
        if self.tool.is_none() {
            self.tool = Some(tool.to_string());
        }
        self.indicators.push(Indicator::new(
            IndicatorType::ExplicitAttribution,
            details,
            IndicatorWeight::Strong,
            100,
        ));
    }
}

/// Detects literal AI-tool markers in authors, description, labels and branch
#[derive(Debug, Default, Clone)]
pub struct ExplicitAttributionDetector;

impl ExplicitAttributionDetector {
    pub fn new() -> Self {
        Self
    }

    /// First commit whose author looks like a known bot account
    fn find_bot_author(commits: &[CommitRecord]) -> Option<(&'static str, String)> {
        for commit in commits {
            let username = commit
                .author
                .username
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            let email = commit.author.email.to_lowercase();
            let name = commit.author.name.to_lowercase();

            for rule in AUTHOR_RULES {
                let handle = if rule.usernames.iter().any(|p| username.contains(p)) {
                    Some(&username)
                } else if rule.emails.iter().any(|p| email.contains(p)) {
                    Some(&email)
                } else if rule.names.iter().any(|p| name.contains(p)) {
                    Some(&name)
                } else {
                    None
                };

                if let Some(handle) = handle {
                    return Some((
                        rule.tool,
                        format!(
                            "Commit {} authored by {} bot ({})",
                            short_hash(&commit.hash),
                            rule.tool,
                            handle
                        ),
                    ));
                }
            }
        }
        None
    }

    fn branch_marker(branch: &str) -> Option<&'static str> {
        let lowered = branch.to_lowercase();
        CODEX_BRANCH_MARKERS
            .iter()
            .copied()
            .find(|marker| lowered.contains(marker))
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

impl Detector for ExplicitAttributionDetector {
    fn name(&self) -> &'static str {
        EXPLICIT_ATTRIBUTION
    }

    fn description(&self) -> &'static str {
        "Finds explicit AI tool attribution in authors, PR footers, labels and branch names"
    }

    fn confidence_weight(&self) -> f64 {
        1.0
    }

    fn detect(&self, pr: &PullRequestRecord) -> Result<DetectionOutcome> {
        let start = Instant::now();
        let mut found = Attribution::default();

        // Bot authors are the most direct evidence, so they are checked first
        if let Some((tool, details)) = Self::find_bot_author(&pr.commits) {
            found.record(tool, details);
        }

        if let Some(description) = pr.description.as_deref() {
            for rule in description_rules() {
                if rule.patterns.iter().any(|p| p.is_match(description)) {
                    found.record(
                        rule.tool,
                        format!("PR description contains {} attribution", rule.tool),
                    );
                }
            }
        }

        for label in CODEX_LABELS {
            if pr.has_label(label) {
                found.record(CODEX_TOOL, format!("PR carries the '{}' label", label));
            }
        }

        if let Some(branch) = pr.branch.as_deref() {
            if let Some(marker) = Self::branch_marker(branch) {
                found.record(
                    CODEX_TOOL,
                    format!("Branch '{}' contains the '{}' agent marker", branch, marker),
                );
            }
        }

        let outcome = match found.tool {
            Some(tool) => DetectionOutcome::new(
                self.name(),
                100,
                ConfidenceLevel::Definitive,
                Some(tool.clone()),
                format!("Explicit AI tool attribution found: {}", tool),
                found.indicators,
                start.elapsed(),
            ),
            None => DetectionOutcome::uncertain(
                self.name(),
                "No explicit AI attribution markers found",
                start.elapsed(),
            ),
        };

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorIdentity, Metadata};
    use chrono::{TimeZone, Utc};

    fn commit(author: AuthorIdentity) -> CommitRecord {
        CommitRecord::new(
            "abc123def456",
            "feat: add login",
            author,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        )
    }

    fn pr(description: Option<&str>, commits: Vec<CommitRecord>) -> PullRequestRecord {
        PullRequestRecord {
            title: "Add login".to_string(),
            description: description.map(str::to_string),
            commits,
            branch: Some("feature/login".to_string()),
            labels: Default::default(),
            metadata: Metadata {
                additions: 150,
                deletions: 20,
                changed_file_count: 5,
                opened_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
                merged_at: None,
            },
        }
    }

    fn human() -> AuthorIdentity {
        AuthorIdentity::new("John Doe", "john@example.com")
    }

    #[test]
    fn test_no_markers_is_uncertain() {
        let outcome = ExplicitAttributionDetector::new()
            .detect(&pr(Some("Adds login."), vec![commit(human())]))
            .unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.confidence, ConfidenceLevel::Uncertain);
        assert!(outcome.detected_tool.is_none());
        assert!(outcome.indicators.is_empty());
        assert_eq!(outcome.detector_name, EXPLICIT_ATTRIBUTION);
    }

    #[test]
    fn test_claude_footer_and_bot_author() {
        let description = "Adds JWT auth.\n\n🤖 Generated with [Claude Code](https://claude.com/claude-code)\n\nCo-Authored-By: Claude <noreply@anthropic.com>";
        let author = AuthorIdentity::new("Claude", "noreply@anthropic.com");
        let outcome = ExplicitAttributionDetector::new()
            .detect(&pr(Some(description), vec![commit(author)]))
            .unwrap();

        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.confidence, ConfidenceLevel::Definitive);
        assert_eq!(outcome.detected_tool.as_deref(), Some("Claude Code"));
        assert_eq!(outcome.indicators.len(), 2);
        assert!(outcome
            .indicators
            .iter()
            .all(|i| i.weight == IndicatorWeight::Strong && i.score == 100));
    }

    #[test]
    fn test_bot_handle_alone_is_definitive() {
        let author = AuthorIdentity::new("Copilot", "198982749+Copilot@users.noreply.github.com")
            .with_username("Copilot[bot]");
        let outcome = ExplicitAttributionDetector::new()
            .detect(&pr(None, vec![commit(author)]))
            .unwrap();

        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.detected_tool.as_deref(), Some("GitHub Copilot"));
        assert_eq!(outcome.indicators.len(), 1);
        assert!(outcome.indicators[0].details.contains("copilot[bot]"));
    }

    #[test]
    fn test_first_tool_wins() {
        let author = AuthorIdentity::new("Devin", "bot@devin.ai").with_username("devin-bot");
        let description = "Co-Authored-By: GitHub Copilot <copilot@github.com>";
        let outcome = ExplicitAttributionDetector::new()
            .detect(&pr(Some(description), vec![commit(author)]))
            .unwrap();

        assert_eq!(outcome.detected_tool.as_deref(), Some("Devin"));
        assert_eq!(outcome.indicators.len(), 2);
    }

    #[test]
    fn test_cursor_description_marker() {
        let outcome = ExplicitAttributionDetector::new()
            .detect(&pr(Some("Built with https://cursor.so"), vec![]))
            .unwrap();
        assert_eq!(outcome.detected_tool.as_deref(), Some("Cursor"));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let mut record = pr(None, vec![commit(human())]);
        record.labels.insert("AI-Generated".to_string());
        let outcome = ExplicitAttributionDetector::new().detect(&record).unwrap();
        assert_eq!(outcome.confidence, ConfidenceLevel::Definitive);
        assert_eq!(outcome.detected_tool.as_deref(), Some("OpenAI Codex"));
    }

    #[test]
    fn test_every_agent_label_names_codex() {
        for label in ["codex", "copilot", "ai-generated"] {
            let mut record = pr(None, vec![commit(human())]);
            record.labels.insert(label.to_string());
            let outcome = ExplicitAttributionDetector::new().detect(&record).unwrap();
            assert_eq!(outcome.score, 100, "label {}", label);
            assert_eq!(outcome.detected_tool.as_deref(), Some("OpenAI Codex"), "label {}", label);
        }
    }

    #[test]
    fn test_branch_markers_match_anywhere() {
        for branch in [
            "codex/fix-login",
            "users/jd/cursor-refactor",
            "cursor-refactor",
            "feature/add-codex-support",
            "fix-chatgpt-output",
            "CODEX-Cleanup",
        ] {
            assert!(
                ExplicitAttributionDetector::branch_marker(branch).is_some(),
                "branch {}",
                branch
            );
        }
        assert!(ExplicitAttributionDetector::branch_marker("copilot/fix-123").is_none());
        assert!(ExplicitAttributionDetector::branch_marker("codex").is_none());
        assert!(ExplicitAttributionDetector::branch_marker("feature/login").is_none());
    }

    #[test]
    fn test_branch_marker_attributes_codex() {
        for branch in ["cursor-refactor", "feature/add-codex-support", "fix-chatgpt-output"] {
            let mut record = pr(None, vec![commit(human())]);
            record.branch = Some(branch.to_string());
            let outcome = ExplicitAttributionDetector::new().detect(&record).unwrap();
            assert_eq!(outcome.score, 100, "branch {}", branch);
            assert_eq!(outcome.confidence, ConfidenceLevel::Definitive);
            assert_eq!(outcome.detected_tool.as_deref(), Some("OpenAI Codex"), "branch {}", branch);
        }
    }

    #[test]
    fn test_empty_record_is_uncertain() {
        let mut record = pr(None, vec![]);
        record.branch = None;
        let outcome = ExplicitAttributionDetector::new().detect(&record).unwrap();
        assert_eq!(outcome.confidence, ConfidenceLevel::Uncertain);
    }
}
