//! Weighted-average scoring strategy
//!
//! # Algorithm
//!
//! ```text
//! weight(o)     = confidence anchor of o / 100      (Definitive 1.0 .. Uncertain 0.0)
//! final_score   = round(Σ score·weight / Σ weight)   (0 when Σ weight == 0)
//! detected_tool = plurality over named tools, ties go to the first seen
//! boost         = +10 (capped at 100) when ≥3 outcomes name the winning tool
//! confidence    = Definitive if any outcome is Definitive
//!                 else Uncertain if stddev(scores) > uncertainty_threshold
//!                 else from_score(final_score)
//! ```
//!
//! Uncertain outcomes carry no weight but their indicators are still merged.

use super::outcome::{AggregatedOutcome, ScoringMetadata};
use super::{RunContext, ScoringStrategy, AI_MODEL_DETECTOR};
use crate::config::DetectorConfig;
use crate::detectors::DetectionOutcome;
use crate::models::{clamp_score, ConfidenceLevel, Indicator};
use tracing::debug;

/// Minimum number of outcomes naming the same tool to earn the boost
const CONSENSUS_MIN_VOTES: usize = 3;
const CONSENSUS_BONUS: i64 = 10;

#[derive(Debug, Clone)]
pub struct WeightedAverageStrategy {
    consensus_boost: bool,
    uncertainty_threshold: f64,
}

impl WeightedAverageStrategy {
    pub const ID: &'static str = "weighted_average";

    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            consensus_boost: config.should_apply_consensus_boost(),
            uncertainty_threshold: config.uncertainty_threshold(),
        }
    }

    /// Sums are kept in anchor units (weight x 100) so they stay exact
    /// whatever the outcome order
    fn weighted_score(outcomes: &[DetectionOutcome]) -> u8 {
        let (weighted_sum, total_weight) =
            outcomes.iter().fold((0_u64, 0_u64), |(sum, total), o| {
                let weight = u64::from(o.confidence.numeric_value());
                (sum + u64::from(o.score) * weight, total + weight)
            });

        if total_weight == 0 {
            return 0;
        }
        clamp_score((weighted_sum as f64 / total_weight as f64).round() as i64)
    }

    /// Winning tool name and its vote count
    fn vote_tool(outcomes: &[DetectionOutcome]) -> Option<(String, usize)> {
        // Vec keeps first-seen order so ties resolve deterministically
        let mut tally: Vec<(&str, usize)> = Vec::new();
        for tool in outcomes.iter().filter_map(|o| o.detected_tool.as_deref()) {
            match tally.iter_mut().find(|(name, _)| *name == tool) {
                Some((_, votes)) => *votes += 1,
                None => tally.push((tool, 1)),
            }
        }

        let mut winner: Option<(&str, usize)> = None;
        for (tool, votes) in tally {
            if winner.map_or(true, |(_, best)| votes > best) {
                winner = Some((tool, votes));
            }
        }
        winner.map(|(tool, votes)| (tool.to_string(), votes))
    }

    fn final_confidence(&self, outcomes: &[DetectionOutcome], score: u8) -> ConfidenceLevel {
        if outcomes.iter().any(|o| o.is_definitive()) {
            return ConfidenceLevel::Definitive;
        }

        let spread = population_std_dev(outcomes);
        if spread > self.uncertainty_threshold {
            debug!(
                "Detector disagreement {:.1} exceeds {:.1}, downgrading to Uncertain",
                spread, self.uncertainty_threshold
            );
            return ConfidenceLevel::Uncertain;
        }

        ConfidenceLevel::from_score(score)
    }

    fn reasoning(outcomes: &[DetectionOutcome], score: u8, tool: Option<&str>) -> String {
        let mut parts = vec![format!("Overall AI likelihood score: {}%", score)];
        if let Some(tool) = tool {
            parts.push(format!("Detected tool: {}", tool));
        }

        let summaries: Vec<String> = outcomes
            .iter()
            .map(|o| format!("{}: {}% ({})", o.detector_name, o.score, o.confidence))
            .collect();
        parts.push(format!("Detector results: {}", summaries.join(", ")));

        format!("{}.", parts.join(". "))
    }

    fn empty(&self, ctx: RunContext) -> AggregatedOutcome {
        AggregatedOutcome {
            final_score: 0,
            final_confidence: ConfidenceLevel::Uncertain,
            detected_tool: None,
            reasoning: "No detectors were able to analyze this pull request.".to_string(),
            detector_results: Vec::new(),
            aggregated_indicators: Vec::new(),
            metadata: ScoringMetadata {
                scoring_strategy: Self::ID.to_string(),
                early_exit: ctx.early_exit,
                ..Default::default()
            },
        }
    }
}

/// Population standard deviation of raw outcome scores; 0 below two outcomes
fn population_std_dev(outcomes: &[DetectionOutcome]) -> f64 {
    if outcomes.len() < 2 {
        return 0.0;
    }
    // n²·variance = n·Σs² - (Σs)², exact in integers
    let n = outcomes.len() as u64;
    let (sum, sum_sq) = outcomes.iter().fold((0_u64, 0_u64), |(sum, sum_sq), o| {
        let s = u64::from(o.score);
        (sum + s, sum_sq + s * s)
    });
    let scaled = (n * sum_sq - sum * sum) as f64;
    (scaled / (n * n) as f64).sqrt()
}

impl ScoringStrategy for WeightedAverageStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn aggregate(&self, outcomes: Vec<DetectionOutcome>, ctx: RunContext) -> AggregatedOutcome {
        if outcomes.is_empty() {
            return self.empty(ctx);
        }

        let mut score = Self::weighted_score(&outcomes);
        let vote = Self::vote_tool(&outcomes);

        if let Some((tool, votes)) = &vote {
            if self.consensus_boost && *votes >= CONSENSUS_MIN_VOTES {
                debug!("{} detectors agree on {}, applying consensus boost", votes, tool);
                score = clamp_score(i64::from(score) + CONSENSUS_BONUS);
            }
        }

        let detected_tool = vote.map(|(tool, _)| tool);
        let final_confidence = self.final_confidence(&outcomes, score);
        let reasoning = Self::reasoning(&outcomes, score, detected_tool.as_deref());

        let aggregated_indicators: Vec<Indicator> = outcomes
            .iter()
            .flat_map(|o| o.indicators.iter().cloned())
            .collect();

        let metadata = ScoringMetadata {
            detectors_run: outcomes.len(),
            total_duration_ms: outcomes.iter().map(|o| o.duration_ms).sum(),
            scoring_strategy: Self::ID.to_string(),
            early_exit: ctx.early_exit,
            api_calls_made: outcomes
                .iter()
                .filter(|o| o.detector_name.contains(AI_MODEL_DETECTOR))
                .count(),
        };

        AggregatedOutcome {
            final_score: score,
            final_confidence,
            detected_tool,
            reasoning,
            detector_results: outcomes,
            aggregated_indicators,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndicatorType, IndicatorWeight};
    use std::time::Duration;

    fn outcome(
        name: &str,
        score: i64,
        confidence: ConfidenceLevel,
        tool: Option<&str>,
    ) -> DetectionOutcome {
        DetectionOutcome::new(
            name,
            score,
            confidence,
            tool.map(str::to_string),
            "r",
            vec![Indicator::new(
                IndicatorType::Other,
                format!("{} evidence", name),
                IndicatorWeight::Weak,
                10,
            )],
            Duration::from_millis(5),
        )
    }

    fn strategy() -> WeightedAverageStrategy {
        WeightedAverageStrategy::new(&DetectorConfig::default())
    }

    #[test]
    fn test_empty_input() {
        let result = strategy().aggregate(vec![], RunContext::default());
        assert_eq!(result.final_score, 0);
        assert_eq!(result.final_confidence, ConfidenceLevel::Uncertain);
        assert!(result.detected_tool.is_none());
        assert_eq!(
            result.reasoning,
            "No detectors were able to analyze this pull request."
        );
        assert_eq!(result.metadata.detectors_run, 0);
        assert_eq!(result.metadata.total_duration_ms, 0.0);
        assert_eq!(result.metadata.api_calls_made, 0);
        assert!(!result.metadata.early_exit);
        assert_eq!(result.metadata.scoring_strategy, "weighted_average");
    }

    #[test]
    fn test_weighted_mean() {
        // (80*0.8 + 40*0.4) / 1.2 = 66.67
        let result = strategy().aggregate(
            vec![
                outcome("a", 80, ConfidenceLevel::High, None),
                outcome("b", 40, ConfidenceLevel::Low, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.final_score, 67);
        assert_eq!(result.final_confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_uncertain_outcomes_carry_no_weight() {
        let result = strategy().aggregate(
            vec![
                outcome("a", 70, ConfidenceLevel::Medium, None),
                outcome("b", 30, ConfidenceLevel::Uncertain, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.final_score, 70);
        // indicators from the weightless outcome are still merged
        assert_eq!(result.aggregated_indicators.len(), 2);
        assert_eq!(result.aggregated_indicators[1].details, "b evidence");
    }

    #[test]
    fn test_all_uncertain_scores_zero() {
        let result = strategy().aggregate(
            vec![
                outcome("a", 20, ConfidenceLevel::Uncertain, None),
                outcome("b", 10, ConfidenceLevel::Uncertain, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.final_score, 0);
        assert_eq!(result.final_confidence, ConfidenceLevel::Uncertain);
    }

    #[test]
    fn test_definitive_overrides_disagreement() {
        let result = strategy().aggregate(
            vec![
                outcome("explicit_attribution", 100, ConfidenceLevel::Definitive, Some("Cursor")),
                outcome("commit_pattern", 0, ConfidenceLevel::Uncertain, None),
            ],
            RunContext::with_early_exit(true),
        );
        assert_eq!(result.final_score, 100);
        assert_eq!(result.final_confidence, ConfidenceLevel::Definitive);
        assert_eq!(result.detected_tool.as_deref(), Some("Cursor"));
        assert!(result.metadata.early_exit);
    }

    #[test]
    fn test_high_variance_forces_uncertain() {
        // scores 90 and 10: std dev 40 is not above the threshold
        let result = strategy().aggregate(
            vec![
                outcome("a", 90, ConfidenceLevel::High, None),
                outcome("b", 10, ConfidenceLevel::High, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.final_confidence, ConfidenceLevel::Medium);

        // scores 94 and 4: std dev 45
        let result = strategy().aggregate(
            vec![
                outcome("a", 94, ConfidenceLevel::High, None),
                outcome("b", 4, ConfidenceLevel::High, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.final_score, 49);
        assert_eq!(result.final_confidence, ConfidenceLevel::Uncertain);
    }

    #[test]
    fn test_tool_vote_tie_goes_to_first_seen() {
        let result = strategy().aggregate(
            vec![
                outcome("a", 60, ConfidenceLevel::Medium, Some("Cursor")),
                outcome("b", 60, ConfidenceLevel::Medium, Some("Claude Code")),
                outcome("c", 60, ConfidenceLevel::Medium, Some("Claude Code")),
                outcome("d", 60, ConfidenceLevel::Medium, Some("Cursor")),
            ],
            RunContext::default(),
        );
        assert_eq!(result.detected_tool.as_deref(), Some("Cursor"));
        assert_eq!(result.final_score, 60);
    }

    #[test]
    fn test_consensus_boost() {
        let outcomes = vec![
            outcome("a", 60, ConfidenceLevel::Medium, Some("GitHub Copilot")),
            outcome("b", 60, ConfidenceLevel::Medium, Some("GitHub Copilot")),
            outcome("c", 60, ConfidenceLevel::Medium, Some("GitHub Copilot")),
        ];

        let boosted = strategy().aggregate(outcomes.clone(), RunContext::default());
        assert_eq!(boosted.final_score, 70);

        let config = DetectorConfig::default().with_consensus_boost(false);
        let plain = WeightedAverageStrategy::new(&config).aggregate(outcomes, RunContext::default());
        assert_eq!(plain.final_score, 60);
    }

    #[test]
    fn test_consensus_boost_caps_at_100() {
        let outcomes = (0..3)
            .map(|i| outcome(&format!("d{}", i), 95, ConfidenceLevel::High, Some("Devin")))
            .collect();
        let result = strategy().aggregate(outcomes, RunContext::default());
        assert_eq!(result.final_score, 100);
    }

    #[test]
    fn test_reasoning_template() {
        let result = strategy().aggregate(
            vec![
                outcome("explicit_attribution", 100, ConfidenceLevel::Definitive, Some("Cursor")),
                outcome("commit_pattern", 0, ConfidenceLevel::Uncertain, None),
            ],
            RunContext::default(),
        );
        assert_eq!(
            result.reasoning,
            "Overall AI likelihood score: 100%. Detected tool: Cursor. Detector results: \
             explicit_attribution: 100% (Definitive), commit_pattern: 0% (Uncertain)."
        );
    }

    #[test]
    fn test_metadata() {
        let result = strategy().aggregate(
            vec![
                outcome("commit_pattern", 40, ConfidenceLevel::Low, None),
                outcome("ai_model", 80, ConfidenceLevel::High, None),
            ],
            RunContext::default(),
        );
        assert_eq!(result.metadata.detectors_run, 2);
        assert!((result.metadata.total_duration_ms - 10.0).abs() < 1e-9);
        assert_eq!(result.metadata.api_calls_made, 1);
        assert!(!result.metadata.early_exit);
        let names: Vec<&str> = result
            .detector_results
            .iter()
            .map(|o| o.detector_name.as_str())
            .collect();
        assert_eq!(names, vec!["commit_pattern", "ai_model"]);
    }
}
