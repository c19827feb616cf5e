//! AI-authorship detectors
//!
//! This module provides the detector framework and the built-in heuristics
//! that inspect pull request metadata for signs of AI assistance.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     DetectorEngine                          │
//! │  - Registers detectors (ordered)                            │
//! │  - Runs them sequentially, early exit on Definitive         │
//! │  - Free detectors before paid ones (detect_optimized)       │
//! │  - Hands outcomes to the scoring strategy                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Detector Trait                         │
//! │  - name(): Unique identifier                                │
//! │  - description(): Human-readable description                │
//! │  - detect(pr): Run detection, return one outcome            │
//! │  - requires_external_api(): Whether it is billed            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Built-in Detectors
//!
//! - `ExplicitAttributionDetector` - Bot authors, generated-with footers,
//!   labels and agent branch names
//! - `CommitPatternDetector` - Commit bursts, correction ratio and message
//!   consistency
//!
//! # Usage
//!
//! ```ignore
//! use aidetect::detectors::DetectorEngine;
//!
//! let engine = DetectorEngine::with_default_detectors(DetectorConfig::default())?;
//! let result = engine.detect(&pr);
//! println!("{}% ({})", result.final_score, result.final_confidence);
//! ```

mod base;
mod commit_pattern;
mod engine;
mod explicit_attribution;

pub use base::{DetectionOutcome, Detector, DetectorRun};
pub use commit_pattern::{CommitPatternDetector, COMMIT_PATTERN};
pub use engine::{DetectorEngine, DetectorEngineBuilder};
pub use explicit_attribution::{ExplicitAttributionDetector, EXPLICIT_ATTRIBUTION, UNKNOWN_AI_TOOL};
