//! Configuration module for aidetect
//!
//! This module handles:
//! - Detector enable flags and per-detector parameters
//! - Scoring strategy selection and its parameters
//! - The caller-facing AI classification threshold

mod detector_config;

pub use detector_config::{
    discover_config,
    load_config,
    normalize_detector_name,
    ConfigError,
    DetectorConfig,
    DetectorSettings,
    ScoringConfig,
    ScoringStrategyKind,
    ThresholdValue,
    KNOWN_DETECTORS,
};
