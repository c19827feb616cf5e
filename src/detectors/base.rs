//! Base detector trait and types
//!
//! This module defines the core abstractions for AI-authorship detection:
//! - `Detector` trait that all detectors must implement
//! - `DetectionOutcome`, the immutable result of one detector invocation
//! - `DetectorRun` for capturing success or failure of a single run

use crate::models::{clamp_score, ConfidenceLevel, Indicator, PullRequestRecord};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of running one detector against one pull request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOutcome {
    /// AI likelihood, 0-100
    pub score: u8,
    pub confidence: ConfidenceLevel,
    /// Attributed tool, when the detector can name one
    pub detected_tool: Option<String>,
    pub reasoning: String,
    pub indicators: Vec<Indicator>,
    /// Registry id of the detector that produced this outcome
    pub detector_name: String,
    /// Wall-clock time spent in the detector, in milliseconds
    pub duration_ms: f64,
}

impl DetectionOutcome {
    pub fn new(
        detector_name: impl Into<String>,
        score: i64,
        confidence: ConfidenceLevel,
        detected_tool: Option<String>,
        reasoning: impl Into<String>,
        indicators: Vec<Indicator>,
        elapsed: Duration,
    ) -> Self {
        Self {
            score: clamp_score(score),
            confidence,
            detected_tool,
            reasoning: reasoning.into(),
            indicators,
            detector_name: detector_name.into(),
            duration_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }

    /// Insufficient-data baseline: score 0, uncertain, no tool
    pub fn uncertain(
        detector_name: impl Into<String>,
        reasoning: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self::new(
            detector_name,
            0,
            ConfidenceLevel::Uncertain,
            None,
            reasoning,
            Vec::new(),
            elapsed,
        )
    }

    pub fn is_definitive(&self) -> bool {
        self.confidence == ConfidenceLevel::Definitive
    }

    pub fn is_ai_generated(&self, threshold: u8) -> bool {
        self.score >= threshold
    }

    pub fn confidence_percentage(&self) -> u8 {
        self.confidence.numeric_value()
    }
}

/// Trait for all AI-authorship detectors
///
/// A detector inspects a pull request record and produces exactly one
/// `DetectionOutcome`. Implementations must be deterministic, must not
/// retry internally, and should report insufficient data as an uncertain
/// outcome rather than an error.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct LabelDetector;
///
/// impl Detector for LabelDetector {
///     fn name(&self) -> &'static str {
///         "label"
///     }
///
///     fn description(&self) -> &'static str {
///         "Flags PRs labelled ai-generated"
///     }
///
///     fn detect(&self, pr: &PullRequestRecord) -> Result<DetectionOutcome> {
///         let start = Instant::now();
///         Ok(DetectionOutcome::uncertain(self.name(), "nothing found", start.elapsed()))
///     }
/// }
/// ```
pub trait Detector: Send + Sync {
    /// Stable registry key (e.g. "explicit_attribution")
    fn name(&self) -> &'static str;

    /// Human-readable description of what this detector looks for
    fn description(&self) -> &'static str;

    /// Run detection against a pull request
    ///
    /// An `Err` (or a panic) is treated by the engine as "no outcome" for this
    /// detector; it never aborts the batch.
    fn detect(&self, pr: &PullRequestRecord) -> Result<DetectionOutcome>;

    /// Static trust weight in [0, 1]. Informational only.
    fn confidence_weight(&self) -> f64 {
        0.5
    }

    /// Whether this detector calls a billed external service
    ///
    /// Paid detectors run last in `DetectorEngine::detect_optimized` and are
    /// skipped entirely when free detectors are already conclusive.
    ///
    /// Default: `false`
    fn requires_external_api(&self) -> bool {
        false
    }
}

/// What happened when the engine invoked one detector
#[derive(Debug, Clone)]
pub enum DetectorRun {
    Completed(DetectionOutcome),
    Failed {
        detector_name: String,
        error: String,
        /// Time spent before the failure, in milliseconds
        duration_ms: f64,
    },
}

impl DetectorRun {
    pub fn detector_name(&self) -> &str {
        match self {
            DetectorRun::Completed(outcome) => &outcome.detector_name,
            DetectorRun::Failed { detector_name, .. } => detector_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DetectorRun::Completed(_))
    }

    pub fn into_outcome(self) -> Option<DetectionOutcome> {
        match self {
            DetectorRun::Completed(outcome) => Some(outcome),
            DetectorRun::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndicatorType, IndicatorWeight};

    #[test]
    fn test_outcome_clamps_score() {
        let high = DetectionOutcome::new(
            "d",
            180,
            ConfidenceLevel::High,
            None,
            "r",
            vec![],
            Duration::from_millis(2),
        );
        assert_eq!(high.score, 100);
        assert!((high.duration_ms - 2.0).abs() < 1e-9);

        let low = DetectionOutcome::new(
            "d",
            -15,
            ConfidenceLevel::Uncertain,
            None,
            "r",
            vec![],
            Duration::ZERO,
        );
        assert_eq!(low.score, 0);
    }

    #[test]
    fn test_uncertain_baseline() {
        let outcome = DetectionOutcome::uncertain("commit_pattern", "no commits", Duration::ZERO);
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.confidence, ConfidenceLevel::Uncertain);
        assert!(outcome.detected_tool.is_none());
        assert!(outcome.indicators.is_empty());
        assert!(!outcome.is_definitive());
        assert_eq!(outcome.confidence_percentage(), 0);
    }

    #[test]
    fn test_outcome_threshold_checks() {
        let outcome = DetectionOutcome::new(
            "explicit_attribution",
            100,
            ConfidenceLevel::Definitive,
            Some("Cursor".to_string()),
            "found",
            vec![Indicator::new(
                IndicatorType::ExplicitAttribution,
                "footer",
                IndicatorWeight::Strong,
                100,
            )],
            Duration::ZERO,
        );
        assert!(outcome.is_definitive());
        assert!(outcome.is_ai_generated(50));
        assert!(outcome.is_ai_generated(100));
        assert_eq!(outcome.confidence_percentage(), 100);
    }

    #[test]
    fn test_detector_run_accessors() {
        let ok = DetectorRun::Completed(DetectionOutcome::uncertain("a", "r", Duration::ZERO));
        let failed = DetectorRun::Failed {
            detector_name: "b".to_string(),
            error: "boom".to_string(),
            duration_ms: 3.0,
        };

        assert!(ok.is_success());
        assert_eq!(ok.detector_name(), "a");
        assert!(ok.into_outcome().is_some());

        assert!(!failed.is_success());
        assert_eq!(failed.detector_name(), "b");
        assert!(failed.into_outcome().is_none());
    }
}
