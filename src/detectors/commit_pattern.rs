//! Commit pattern detector
//!
//! Heuristic analysis of how commits were produced rather than what they say:
//! - Burst commits: large commits landing seconds apart
//! - Perfect first attempt: one big commit with no follow-up fixes
//! - Correction ratio: how often messages admit to fixes, WIP or debugging
//! - Message consistency: uniform lengths and well-formed prose
//!
//! Each signal adds (or subtracts) points; the sum is clamped to 0-100.
//!
//! Configurable via `[detectors.commit_pattern]`:
//! - `burst_threshold_seconds` (default 120)
//! - `perfect_first_attempt_min_lines` (default 50)

use crate::config::DetectorConfig;
use crate::detectors::base::{DetectionOutcome, Detector};
use crate::detectors::explicit_attribution::UNKNOWN_AI_TOOL;
use crate::models::{
    clamp_score, CommitRecord, ConfidenceLevel, Indicator, IndicatorType, IndicatorWeight,
    PullRequestRecord,
};
use anyhow::Result;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::debug;

pub const COMMIT_PATTERN: &str = "commit_pattern";

const DEFAULT_BURST_THRESHOLD_SECONDS: i64 = 120;
const DEFAULT_PERFECT_FIRST_ATTEMPT_MIN_LINES: u64 = 50;

/// Average lines per commit above which a quick follow-up counts as a burst
const BURST_MIN_LINES_PER_COMMIT: f64 = 20.0;

/// Score at which the detector attributes the PR to an unnamed AI tool
const ATTRIBUTION_SCORE: u8 = 70;

static CORRECTION_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static SENTENCE_SPLIT: OnceLock<Regex> = OnceLock::new();
static BULLET_BODY: OnceLock<Regex> = OnceLock::new();

fn correction_patterns() -> &'static [Regex] {
    CORRECTION_PATTERNS.get_or_init(|| {
        [
            r"(?i)\b(fix|fixed|oops|typo|missed|forgot|wrong)\b",
            r"(?i)\b(WIP|work in progress)\b",
            r"(?i)\b(tmp|temp|temporary)\b",
            r"(?i)\b(debug|debugging)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn sentence_split() -> &'static Regex {
    SENTENCE_SPLIT.get_or_init(|| Regex::new(r"[.!?]+").expect("valid regex"))
}

fn bullet_body() -> &'static Regex {
    BULLET_BODY.get_or_init(|| Regex::new(r"(?m)^.+:\s*\n[-*]").expect("valid regex"))
}

/// One scoring signal: points to add and the evidence to cite (if any)
struct Signal {
    points: i64,
    indicator: Option<Indicator>,
}

impl Signal {
    fn cited(points: u8, kind: IndicatorType, weight: IndicatorWeight, details: String) -> Self {
        Self {
            points: i64::from(points),
            indicator: Some(Indicator::new(kind, details, weight, points)),
        }
    }

    fn penalty(points: i64) -> Self {
        Self {
            points: -points,
            indicator: None,
        }
    }
}

/// Detects AI-like temporal and stylistic commit patterns
pub struct CommitPatternDetector {
    burst_threshold_seconds: i64,
    perfect_first_attempt_min_lines: u64,
}

impl CommitPatternDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        let burst_threshold_seconds = config
            .detector_option_i64(COMMIT_PATTERN, "burst_threshold_seconds")
            .unwrap_or(DEFAULT_BURST_THRESHOLD_SECONDS);
        let perfect_first_attempt_min_lines = config
            .detector_option_i64(COMMIT_PATTERN, "perfect_first_attempt_min_lines")
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(DEFAULT_PERFECT_FIRST_ATTEMPT_MIN_LINES);

        Self {
            burst_threshold_seconds,
            perfect_first_attempt_min_lines,
        }
    }

    /// Large commits in quick succession
    fn burst_signal(&self, pr: &PullRequestRecord) -> Option<Signal> {
        let commits = &pr.commits;
        if commits.len() < 2 {
            return None;
        }

        let avg_lines = pr.metadata.total_lines_changed() as f64 / commits.len() as f64;
        let pairs = commits.len() - 1;
        let bursts = commits
            .windows(2)
            .filter(|pair| {
                let delta = (pair[1].timestamp - pair[0].timestamp).num_seconds();
                delta <= self.burst_threshold_seconds && avg_lines > BURST_MIN_LINES_PER_COMMIT
            })
            .count();
        let ratio = bursts as f64 / pairs as f64;

        if ratio > 0.5 {
            Some(Signal::cited(
                40,
                IndicatorType::TemporalPattern,
                IndicatorWeight::Strong,
                format!(
                    "Found {} burst commits ({:.0}% of commits within {} seconds)",
                    bursts,
                    ratio * 100.0,
                    self.burst_threshold_seconds
                ),
            ))
        } else if ratio > 0.3 {
            Some(Signal::cited(
                25,
                IndicatorType::TemporalPattern,
                IndicatorWeight::Moderate,
                format!("Moderate burst commit pattern ({:.0}%)", ratio * 100.0),
            ))
        } else {
            None
        }
    }

    /// A single sizable commit that never needed a follow-up
    fn perfect_first_attempt_signal(&self, pr: &PullRequestRecord) -> Option<Signal> {
        let total_lines = pr.metadata.total_lines_changed();
        if pr.commits.len() != 1 || total_lines < self.perfect_first_attempt_min_lines {
            return None;
        }

        Some(Signal::cited(
            30,
            IndicatorType::CommitPattern,
            IndicatorWeight::Moderate,
            format!(
                "Single perfect commit with {} lines changed (no follow-up corrections)",
                total_lines
            ),
        ))
    }

    /// Share of commits whose message admits to a correction
    fn correction_signal(commits: &[CommitRecord]) -> Option<Signal> {
        if commits.is_empty() {
            return None;
        }

        let corrections = commits
            .iter()
            .filter(|c| correction_patterns().iter().any(|p| c.message_matches(p)))
            .count();
        let ratio = corrections as f64 / commits.len() as f64;

        if ratio < 0.05 && commits.len() >= 3 {
            Some(Signal::cited(
                35,
                IndicatorType::CommitPattern,
                IndicatorWeight::Moderate,
                format!(
                    "Very low correction ratio ({:.0}% - typical AI pattern)",
                    ratio * 100.0
                ),
            ))
        } else if ratio > 0.2 {
            Some(Signal::penalty(15))
        } else {
            None
        }
    }

    /// Uniform message lengths combined with well-formed prose
    fn consistency_signal(commits: &[CommitRecord]) -> Option<Signal> {
        if commits.len() < 3 {
            return None;
        }

        let messages: Vec<&str> = commits.iter().map(|c| c.message.trim()).collect();
        let lengths: Vec<f64> = messages.iter().map(|m| m.len() as f64).collect();
        let cv = coefficient_of_variation(&lengths);

        let perfect = messages.iter().filter(|m| has_perfect_grammar(m)).count();
        let perfect_ratio = perfect as f64 / messages.len() as f64;

        debug!(
            "Commit message consistency: cv={:.3}, perfect grammar {:.0}%",
            cv,
            perfect_ratio * 100.0
        );

        if cv < 0.3 && perfect_ratio > 0.8 {
            Some(Signal::cited(
                30,
                IndicatorType::CommitPattern,
                IndicatorWeight::Moderate,
                format!(
                    "Very consistent commit messages ({:.0}% perfect grammar, low length variance)",
                    perfect_ratio * 100.0
                ),
            ))
        } else {
            None
        }
    }
}

/// Population standard deviation over mean; 0 when the mean is 0
fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean
}

/// Multiple sentences, a long multi-line body, or a "Summary:" line followed by bullets
fn has_perfect_grammar(message: &str) -> bool {
    let sentences = sentence_split()
        .split(message)
        .filter(|s| !s.trim().is_empty())
        .count();

    sentences > 1
        || (message.len() > 100 && message.contains('\n'))
        || bullet_body().is_match(message)
}

impl Detector for CommitPatternDetector {
    fn name(&self) -> &'static str {
        COMMIT_PATTERN
    }

    fn description(&self) -> &'static str {
        "Analyzes commit timing, corrections and message consistency"
    }

    fn confidence_weight(&self) -> f64 {
        0.85
    }

    fn detect(&self, pr: &PullRequestRecord) -> Result<DetectionOutcome> {
        let start = Instant::now();

        if pr.commits.is_empty() {
            return Ok(DetectionOutcome::uncertain(
                self.name(),
                "Not enough commit data to analyze patterns",
                start.elapsed(),
            ));
        }

        let signals: Vec<Signal> = [
            self.burst_signal(pr),
            self.perfect_first_attempt_signal(pr),
            Self::correction_signal(&pr.commits),
            Self::consistency_signal(&pr.commits),
        ]
        .into_iter()
        .flatten()
        .collect();

        let raw: i64 = signals.iter().map(|s| s.points).sum();
        let indicators: Vec<Indicator> = signals.into_iter().filter_map(|s| s.indicator).collect();
        let score = clamp_score(raw);
        let confidence = ConfidenceLevel::from_score(score);

        let detected_tool = (score >= ATTRIBUTION_SCORE).then(|| UNKNOWN_AI_TOOL.to_string());

        let reasoning = if score >= ATTRIBUTION_SCORE {
            format!(
                "Strong temporal patterns detected ({} indicators) suggesting AI generation",
                indicators.len()
            )
        } else if score >= 40 {
            format!(
                "Moderate temporal patterns detected ({} indicators) that could suggest AI assistance",
                indicators.len()
            )
        } else {
            "Commit patterns appear consistent with human development workflow".to_string()
        };

        Ok(DetectionOutcome::new(
            self.name(),
            i64::from(score),
            confidence,
            detected_tool,
            reasoning,
            indicators,
            start.elapsed(),
        ))
    }
}
