//! aidetect - AI authorship detection from pull request metadata
//!
//! Pluggable detectors inspect a [`PullRequestRecord`] and each produce a
//! [`DetectionOutcome`]; the [`DetectorEngine`] runs them with early exit and
//! cost-aware ordering, and a scoring strategy folds the outcomes into one
//! [`AggregatedOutcome`].
//!
//! ```ignore
//! use aidetect::{DetectorConfig, DetectorEngine};
//!
//! let engine = DetectorEngine::with_default_detectors(DetectorConfig::default())?;
//! let result = engine.detect(&pr);
//! if result.is_ai_generated(engine.config().ai_threshold()) {
//!     println!("{}", result.reasoning);
//! }
//! ```

pub mod config;
pub mod detectors;
pub mod models;
pub mod reporters;
pub mod scoring;

pub use config::{ConfigError, DetectorConfig, ScoringStrategyKind};
pub use detectors::{
    CommitPatternDetector, DetectionOutcome, Detector, DetectorEngine, DetectorEngineBuilder,
    ExplicitAttributionDetector,
};
pub use models::{
    AuthorIdentity, CommitRecord, ConfidenceLevel, Indicator, IndicatorType, IndicatorWeight,
    Metadata, PullRequestRecord,
};
pub use scoring::{AggregatedOutcome, ScoringError, ScoringStrategy};
