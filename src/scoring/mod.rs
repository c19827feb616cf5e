//! Confidence scoring
//!
//! A scoring strategy folds the ordered list of detector outcomes from one
//! pass into a single `AggregatedOutcome`.
//!
//! # Strategies
//!
//! - `weighted_average`: confidence-weighted mean with tool voting,
//!   consensus boost and a variance-based confidence downgrade
//! - `maximum`, `consensus`: named but not implemented; selecting them
//!   fails at engine construction
//! - `custom`: must be supplied by the caller via
//!   `DetectorEngine::with_strategy`
//!
//! # Example
//!
//! ```ignore
//! let strategy = resolve_strategy(&config)?;
//! let aggregate = strategy.aggregate(outcomes, RunContext::default());
//! ```

mod outcome;
mod weighted_average;

pub use outcome::{AggregatedOutcome, DetectorBreakdown, ScoringMetadata};
pub use weighted_average::WeightedAverageStrategy;

use crate::config::{DetectorConfig, ScoringStrategyKind};
use crate::detectors::DetectionOutcome;
use thiserror::Error;

/// Registry id of the billed AI-model detector, counted in `api_calls_made`
pub const AI_MODEL_DETECTOR: &str = "ai_model";

/// Facts about the orchestration pass that the outcomes alone don't carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunContext {
    /// The engine stopped before running every eligible detector
    pub early_exit: bool,
}

impl RunContext {
    pub fn with_early_exit(early_exit: bool) -> Self {
        Self { early_exit }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("scoring strategy '{strategy}' is not implemented")]
    StrategyNotImplemented { strategy: String },

    #[error("the custom scoring strategy must be supplied with DetectorEngine::with_strategy")]
    CustomStrategyRequired,
}

/// Combines detector outcomes into one verdict
///
/// Implementations must be pure: the same outcomes and context always give
/// the same aggregate.
pub trait ScoringStrategy: Send + Sync {
    /// Stable id recorded in `ScoringMetadata::scoring_strategy`
    fn id(&self) -> &'static str;

    fn aggregate(&self, outcomes: Vec<DetectionOutcome>, ctx: RunContext) -> AggregatedOutcome;
}

/// Build the strategy named in the configuration, failing for unimplemented kinds
pub fn resolve_strategy(config: &DetectorConfig) -> Result<Box<dyn ScoringStrategy>, ScoringError> {
    match config.strategy() {
        ScoringStrategyKind::WeightedAverage => Ok(Box::new(WeightedAverageStrategy::new(config))),
        kind @ (ScoringStrategyKind::Maximum | ScoringStrategyKind::Consensus) => {
            Err(ScoringError::StrategyNotImplemented {
                strategy: kind.id().to_string(),
            })
        }
        ScoringStrategyKind::Custom => Err(ScoringError::CustomStrategyRequired),
    }
}
