//! Core data models for aidetect
//!
//! Input records (pull request, commits, authors) are immutable values built
//! by a data-acquisition layer. Evidence types (`Indicator`, `ConfidenceLevel`)
//! are shared by every detector and by the scoring strategies.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Clamp any intermediate score into the 0-100 range
pub fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 100) as u8
}

/// Five-point confidence scale with fixed numeric anchors
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ConfidenceLevel {
    #[default]
    Uncertain,
    Low,
    Medium,
    High,
    Definitive,
}

impl ConfidenceLevel {
    /// Numeric anchor for this level (0-100)
    pub fn numeric_value(&self) -> u8 {
        match self {
            ConfidenceLevel::Definitive => 100,
            ConfidenceLevel::High => 80,
            ConfidenceLevel::Medium => 60,
            ConfidenceLevel::Low => 40,
            ConfidenceLevel::Uncertain => 0,
        }
    }

    /// Map a 0-100 score onto the scale
    pub fn from_score(score: u8) -> Self {
        match score {
            95.. => ConfidenceLevel::Definitive,
            75..=94 => ConfidenceLevel::High,
            50..=74 => ConfidenceLevel::Medium,
            25..=49 => ConfidenceLevel::Low,
            _ => ConfidenceLevel::Uncertain,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::Definitive => "Definitive - Explicit AI tool attribution",
            ConfidenceLevel::High => "High - Very likely AI-assisted",
            ConfidenceLevel::Medium => "Medium - Probably AI-assisted",
            ConfidenceLevel::Low => "Low - Possibly AI-assisted",
            ConfidenceLevel::Uncertain => "Uncertain - Unable to determine",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfidenceLevel::Definitive => write!(f, "Definitive"),
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
            ConfidenceLevel::Uncertain => write!(f, "Uncertain"),
        }
    }
}

/// Category of a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorType {
    ExplicitAttribution,
    CommitPattern,
    DescriptionStructure,
    CodeStyle,
    TemporalPattern,
    AuthorInfo,
    ToolFingerprint,
    LinguisticPattern,
    Other,
}

impl IndicatorType {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            IndicatorType::ExplicitAttribution => "Explicit Attribution",
            IndicatorType::CommitPattern => "Commit Pattern",
            IndicatorType::DescriptionStructure => "Description Structure",
            IndicatorType::CodeStyle => "Code Style",
            IndicatorType::TemporalPattern => "Temporal Pattern",
            IndicatorType::AuthorInfo => "Author Information",
            IndicatorType::ToolFingerprint => "Tool Fingerprint",
            IndicatorType::LinguisticPattern => "Linguistic Pattern",
            IndicatorType::Other => "Other",
        }
    }
}

/// Qualitative strength of a piece of evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorWeight {
    Weak,
    Moderate,
    Strong,
}

impl IndicatorWeight {
    pub fn numeric_value(&self) -> u8 {
        match self {
            IndicatorWeight::Strong => 100,
            IndicatorWeight::Moderate => 50,
            IndicatorWeight::Weak => 25,
        }
    }

    /// Confidence label implied by this weight
    pub fn to_confidence(&self) -> ConfidenceLevel {
        match self {
            IndicatorWeight::Strong => ConfidenceLevel::Definitive,
            IndicatorWeight::Moderate => ConfidenceLevel::High,
            IndicatorWeight::Weak => ConfidenceLevel::Medium,
        }
    }
}

/// One discrete piece of cited evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    #[serde(rename = "type")]
    pub kind: IndicatorType,
    pub details: String,
    pub weight: IndicatorWeight,
    /// Score contribution of this indicator
    pub score: u8,
}

impl Indicator {
    pub fn new(
        kind: IndicatorType,
        details: impl Into<String>,
        weight: IndicatorWeight,
        score: u8,
    ) -> Self {
        Self {
            kind,
            details: details.into(),
            weight,
            score: score.min(100),
        }
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.weight.to_confidence()
    }
}

/// Author of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
    /// Platform handle (e.g. `copilot[bot]`)
    #[serde(default)]
    pub username: Option<String>,
}

impl AuthorIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// A single commit in a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    #[serde(alias = "sha")]
    pub hash: String,
    pub message: String,
    pub author: AuthorIdentity,
    pub timestamp: DateTime<Utc>,
    /// Changed file paths, when the forge reports them
    #[serde(default)]
    pub files: Vec<String>,
}

impl CommitRecord {
    pub fn new(
        hash: impl Into<String>,
        message: impl Into<String>,
        author: AuthorIdentity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
            author,
            timestamp,
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// Message length in bytes
    pub fn message_length(&self) -> usize {
        self.message.len()
    }

    /// Case-insensitive substring check
    pub fn message_contains(&self, pattern: &str) -> bool {
        self.message
            .to_lowercase()
            .contains(&pattern.to_lowercase())
    }

    pub fn message_matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.message)
    }
}

/// Diff statistics and timing for a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub additions: u64,
    pub deletions: u64,
    #[serde(alias = "changed_files")]
    pub changed_file_count: u64,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn total_lines_changed(&self) -> u64 {
        self.additions + self.deletions
    }

    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

/// The pull request under analysis. Read-only throughout the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRecord {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    pub metadata: Metadata,
}

impl PullRequestRecord {
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    pub fn description_contains(&self, pattern: &str) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&pattern.to_lowercase()))
    }

    pub fn description_matches(&self, pattern: &Regex) -> bool {
        self.description
            .as_deref()
            .is_some_and(|d| pattern.is_match(d))
    }

    pub fn branch_matches(&self, pattern: &Regex) -> bool {
        self.branch.as_deref().is_some_and(|b| pattern.is_match(b))
    }

    /// Case-insensitive label lookup
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}
