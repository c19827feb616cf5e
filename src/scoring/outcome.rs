//! Aggregated result of one orchestration pass

use crate::detectors::DetectionOutcome;
use crate::models::{ConfidenceLevel, Indicator, IndicatorType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Run bookkeeping attached to every aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringMetadata {
    /// Number of outcomes that reached the strategy
    pub detectors_run: usize,
    /// Sum of per-detector durations, in milliseconds
    pub total_duration_ms: f64,
    /// Id of the strategy that produced the aggregate
    pub scoring_strategy: String,
    /// True when the engine stopped before running every eligible detector
    pub early_exit: bool,
    /// Outcomes produced by the billed AI-model detector
    pub api_calls_made: usize,
}

/// Combined verdict over every detector outcome of one pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedOutcome {
    pub final_score: u8,
    pub final_confidence: ConfidenceLevel,
    pub detected_tool: Option<String>,
    pub reasoning: String,
    /// Outcomes in execution order
    pub detector_results: Vec<DetectionOutcome>,
    /// Indicators from all outcomes, in outcome order
    pub aggregated_indicators: Vec<Indicator>,
    pub metadata: ScoringMetadata,
}

/// Per-detector summary row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorBreakdown {
    pub score: u8,
    pub confidence: ConfidenceLevel,
    pub detected_tool: Option<String>,
    pub duration_ms: f64,
}

impl AggregatedOutcome {
    pub fn is_ai_generated(&self, threshold: u8) -> bool {
        self.final_score >= threshold
    }

    pub fn is_definitive(&self) -> bool {
        self.final_confidence == ConfidenceLevel::Definitive
    }

    /// Per-detector scores keyed by detector id, in execution order
    pub fn detector_breakdown(&self) -> IndexMap<String, DetectorBreakdown> {
        self.detector_results
            .iter()
            .map(|outcome| {
                (
                    outcome.detector_name.clone(),
                    DetectorBreakdown {
                        score: outcome.score,
                        confidence: outcome.confidence,
                        detected_tool: outcome.detected_tool.clone(),
                        duration_ms: outcome.duration_ms,
                    },
                )
            })
            .collect()
    }

    /// Indicators grouped by type, groups ordered by first appearance
    pub fn indicators_by_type(&self) -> IndexMap<IndicatorType, Vec<&Indicator>> {
        let mut groups: IndexMap<IndicatorType, Vec<&Indicator>> = IndexMap::new();
        for indicator in &self.aggregated_indicators {
            groups.entry(indicator.kind).or_default().push(indicator);
        }
        groups
    }
}
