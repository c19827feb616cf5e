//! JSON reporter
//!
//! Outputs the full AggregatedOutcome plus a per-detector breakdown as
//! pretty-printed JSON. Useful for CI gates, piping to jq, or storage.

use crate::scoring::{AggregatedOutcome, DetectorBreakdown};
use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    outcome: &'a AggregatedOutcome,
    confidence_description: &'static str,
    ai_threshold: u8,
    is_ai_generated: bool,
    detector_breakdown: IndexMap<String, DetectorBreakdown>,
}

impl<'a> JsonReport<'a> {
    fn new(outcome: &'a AggregatedOutcome, ai_threshold: u8) -> Self {
        Self {
            outcome,
            confidence_description: outcome.final_confidence.description(),
            ai_threshold,
            is_ai_generated: outcome.is_ai_generated(ai_threshold),
            detector_breakdown: outcome.detector_breakdown(),
        }
    }
}

/// Render result as JSON
pub fn render(result: &AggregatedOutcome, ai_threshold: u8) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(
        result,
        ai_threshold,
    ))?)
}
