//! Detector and scoring configuration
//!
//! Loads configuration from `aidetect.toml` or `.aidetectrc.json`, or builds it
//! in code through consuming `with_*` methods. Every accessor falls back to the
//! documented default when a key is absent.
//!
//! # Configuration Format
//!
//! ```toml
//! # aidetect.toml
//! ai_threshold = 50
//!
//! [detectors.commit-pattern]
//! enabled = true
//! thresholds = { burst_threshold_seconds = 90, perfect_first_attempt_min_lines = 80 }
//!
//! [detectors.ai_model]
//! enabled = false
//!
//! [scoring]
//! strategy = "weighted_average"
//! early_exit_on_definitive = true
//! consensus_boost = true
//! uncertainty_threshold = 40
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Detector ids known to the configuration, with their default enable flag
pub const KNOWN_DETECTORS: &[(&str, bool)] = &[
    ("explicit_attribution", true),
    ("commit_pattern", true),
    ("tool_fingerprint", false),
    ("code_structure", false),
    ("linguistic", false),
    ("ai_model", false),
];

const DEFAULT_AI_THRESHOLD: u8 = 50;
const DEFAULT_UNCERTAINTY_THRESHOLD: f64 = 40.0;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported config format '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Named aggregation strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategyKind {
    #[default]
    WeightedAverage,
    #[serde(alias = "maximum_score")]
    Maximum,
    Consensus,
    Custom,
}

impl ScoringStrategyKind {
    /// Stable identifier, as written in config files and run metadata
    pub fn id(&self) -> &'static str {
        match self {
            ScoringStrategyKind::WeightedAverage => "weighted_average",
            ScoringStrategyKind::Maximum => "maximum",
            ScoringStrategyKind::Consensus => "consensus",
            ScoringStrategyKind::Custom => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScoringStrategyKind::WeightedAverage => "Weighted average of all detector scores",
            ScoringStrategyKind::Maximum => "Take the highest score from all detectors",
            ScoringStrategyKind::Consensus => "Require consensus across multiple detectors",
            ScoringStrategyKind::Custom => "Custom user-provided scoring function",
        }
    }
}

impl std::fmt::Display for ScoringStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Per-detector settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorSettings {
    /// Whether the detector is enabled (falls back to the built-in default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Detector-specific parameters, e.g. `burst_threshold_seconds`
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub thresholds: IndexMap<String, ThresholdValue>,
}

/// A parameter value can be an integer, float, boolean or string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl ThresholdValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v),
            ThresholdValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ThresholdValue::Integer(v) => Some(*v as f64),
            ThresholdValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ThresholdValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ThresholdValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for ThresholdValue {
    fn from(v: i64) -> Self {
        ThresholdValue::Integer(v)
    }
}

impl From<f64> for ThresholdValue {
    fn from(v: f64) -> Self {
        ThresholdValue::Float(v)
    }
}

impl From<bool> for ThresholdValue {
    fn from(v: bool) -> Self {
        ThresholdValue::Boolean(v)
    }
}

impl From<&str> for ThresholdValue {
    fn from(v: &str) -> Self {
        ThresholdValue::String(v.to_string())
    }
}

/// Parameters consumed by the scoring strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub strategy: ScoringStrategyKind,

    /// Stop running detectors once one returns a definitive outcome (default: true)
    #[serde(default = "default_true")]
    pub early_exit_on_definitive: bool,

    /// Add +10 when 3+ detectors name the same tool (default: true)
    #[serde(default = "default_true")]
    pub consensus_boost: bool,

    /// Score standard deviation above which the aggregate is uncertain (default: 40)
    #[serde(default = "default_uncertainty_threshold")]
    pub uncertainty_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: ScoringStrategyKind::default(),
            early_exit_on_definitive: true,
            consensus_boost: true,
            uncertainty_threshold: DEFAULT_UNCERTAINTY_THRESHOLD,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_uncertainty_threshold() -> f64 {
    DEFAULT_UNCERTAINTY_THRESHOLD
}

fn default_ai_threshold() -> u8 {
    DEFAULT_AI_THRESHOLD
}

fn clamped_threshold<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, 100) as u8)
}

/// Full configuration consulted by the engine, detectors and strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Per-detector settings keyed by canonical detector id
    #[serde(default, deserialize_with = "normalized_detectors")]
    detectors: IndexMap<String, DetectorSettings>,

    #[serde(default)]
    scoring: ScoringConfig,

    /// Score at or above which a PR is classified as AI-generated
    #[serde(
        default = "default_ai_threshold",
        deserialize_with = "clamped_threshold"
    )]
    ai_threshold: u8,
}

fn normalized_detectors<'de, D>(
    deserializer: D,
) -> Result<IndexMap<String, DetectorSettings>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = IndexMap::<String, DetectorSettings>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, settings)| (normalize_detector_name(&name), settings))
        .collect())
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            detectors: IndexMap::new(),
            scoring: ScoringConfig::default(),
            ai_threshold: DEFAULT_AI_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DetectorConfig = toml::from_str(content)?;
        config.validate()
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: DetectorConfig = serde_json::from_str(content)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let threshold = self.scoring.uncertainty_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scoring.uncertainty_threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        Ok(self)
    }

    fn settings_mut(&mut self, detector: &str) -> &mut DetectorSettings {
        self.detectors
            .entry(normalize_detector_name(detector))
            .or_default()
    }

    fn settings(&self, detector: &str) -> Option<&DetectorSettings> {
        self.detectors.get(&normalize_detector_name(detector))
    }

    pub fn enable(mut self, detector: &str) -> Self {
        self.settings_mut(detector).enabled = Some(true);
        self
    }

    pub fn disable(mut self, detector: &str) -> Self {
        self.settings_mut(detector).enabled = Some(false);
        self
    }

    /// Enable every known detector
    pub fn enable_all(mut self) -> Self {
        for (name, _) in KNOWN_DETECTORS {
            self.settings_mut(name).enabled = Some(true);
        }
        self
    }

    /// Set a detector-specific parameter
    pub fn with_detector_option(
        mut self,
        detector: &str,
        key: impl Into<String>,
        value: impl Into<ThresholdValue>,
    ) -> Self {
        self.settings_mut(detector)
            .thresholds
            .insert(key.into(), value.into());
        self
    }

    pub fn with_strategy(mut self, strategy: ScoringStrategyKind) -> Self {
        self.scoring.strategy = strategy;
        self
    }

    pub fn with_early_exit(mut self, enabled: bool) -> Self {
        self.scoring.early_exit_on_definitive = enabled;
        self
    }

    pub fn with_consensus_boost(mut self, enabled: bool) -> Self {
        self.scoring.consensus_boost = enabled;
        self
    }

    /// Negative values are treated as zero
    pub fn with_uncertainty_threshold(mut self, threshold: f64) -> Self {
        self.scoring.uncertainty_threshold = threshold.max(0.0);
        self
    }

    /// Clamped to 0-100
    pub fn with_ai_threshold(mut self, threshold: i64) -> Self {
        self.ai_threshold = threshold.clamp(0, 100) as u8;
        self
    }

    /// Whether a detector is enabled (explicit setting > built-in default > off)
    pub fn is_enabled(&self, detector: &str) -> bool {
        let normalized = normalize_detector_name(detector);
        self.detectors
            .get(&normalized)
            .and_then(|s| s.enabled)
            .unwrap_or_else(|| default_enabled(&normalized))
    }

    /// Canonical ids of every enabled detector, known ones first
    pub fn enabled_detectors(&self) -> Vec<String> {
        let mut names: Vec<String> = KNOWN_DETECTORS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();
        for name in self.detectors.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names.retain(|name| self.is_enabled(name));
        names
    }

    /// Raw parameter value for a detector
    pub fn detector_option(&self, detector: &str, key: &str) -> Option<&ThresholdValue> {
        self.settings(detector).and_then(|s| s.thresholds.get(key))
    }

    pub fn detector_option_i64(&self, detector: &str, key: &str) -> Option<i64> {
        self.detector_option(detector, key).and_then(|v| v.as_i64())
    }

    pub fn detector_option_f64(&self, detector: &str, key: &str) -> Option<f64> {
        self.detector_option(detector, key).and_then(|v| v.as_f64())
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn strategy(&self) -> ScoringStrategyKind {
        self.scoring.strategy
    }

    pub fn should_early_exit(&self) -> bool {
        self.scoring.early_exit_on_definitive
    }

    pub fn should_apply_consensus_boost(&self) -> bool {
        self.scoring.consensus_boost
    }

    pub fn uncertainty_threshold(&self) -> f64 {
        self.scoring.uncertainty_threshold
    }

    pub fn ai_threshold(&self) -> u8 {
        self.ai_threshold
    }
}

fn default_enabled(normalized: &str) -> bool {
    KNOWN_DETECTORS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, enabled)| *enabled)
        .unwrap_or(false)
}

/// Load configuration from an explicit path, choosing the format by extension
pub fn load_config(path: &Path) -> Result<DetectorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => DetectorConfig::from_toml_str(&content),
        Some("json") => DetectorConfig::from_json_str(&content),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Look for a configuration file in `dir`.
///
/// Searches for `aidetect.toml`, then `.aidetectrc.json`. Returns the default
/// configuration if neither exists or the first one found fails to parse.
pub fn discover_config(dir: &Path) -> DetectorConfig {
    for name in ["aidetect.toml", ".aidetectrc.json"] {
        let path = dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_config(&path) {
            Ok(config) => {
                debug!("Loaded detector config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", path.display(), e);
                return DetectorConfig::default();
            }
        }
    }

    debug!("No detector config found, using defaults");
    DetectorConfig::default()
}

/// Normalize a detector name to its canonical snake_case id
pub fn normalize_detector_name(name: &str) -> String {
    // ExplicitAttributionDetector -> explicit_attribution
    // commit-pattern -> commit_pattern
    // AIModel -> ai_model

    let mut result = String::new();
    let chars: Vec<char> = name.trim().chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_is_lower = i > 0 && chars[i - 1].is_lowercase();
            let is_acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && i + 1 < chars.len()
                && chars[i + 1].is_lowercase();

            if prev_is_lower || is_acronym_end {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if *c == '-' || *c == ' ' {
            result.push('_');
        } else {
            result.push(*c);
        }
    }

    match result.strip_suffix("_detector") {
        Some(stripped) => stripped.to_string(),
        None => result,
    }
}
