//! Detector orchestration engine
//!
//! The DetectorEngine runs registered detectors against one pull request and
//! hands the collected outcomes to the configured scoring strategy:
//! - Runs detectors sequentially in registration order
//! - Skips detectors disabled in the configuration
//! - Folds failed or panicking detectors out of the outcome list
//! - Stops early on a definitive outcome (configurable)
//! - In optimized mode, runs free detectors before paid ones and skips the
//!   paid set when the free result is already conclusive
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    DetectorEngine                       │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Register detectors (ordered by registration)        │
//! │  2. Filter by enable flags                              │
//! │  3. Run each, capturing success or failure              │
//! │  4. Stop on Definitive if early exit is enabled         │
//! │  5. Aggregate outcomes with the scoring strategy        │
//! └─────────────────────────────────────────────────────────┘
//! ```

use crate::config::{normalize_detector_name, DetectorConfig};
use crate::detectors::base::{DetectionOutcome, Detector, DetectorRun};
use crate::detectors::commit_pattern::CommitPatternDetector;
use crate::detectors::explicit_attribution::ExplicitAttributionDetector;
use crate::models::PullRequestRecord;
use crate::scoring::{resolve_strategy, AggregatedOutcome, RunContext, ScoringError, ScoringStrategy};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Aggregate confidence anchor at which free detectors make paid ones unnecessary
const CONCLUSIVE_CONFIDENCE: u8 = 80;

/// Outcomes of one sequential pass plus whether it stopped early
struct Pass {
    outcomes: Vec<DetectionOutcome>,
    /// Ids of detectors that errored or panicked, in execution order
    failed: Vec<String>,
    early_exit: bool,
}

/// Orchestrates AI-authorship detection across all registered detectors
pub struct DetectorEngine {
    /// Registered detectors keyed by id, in registration order
    detectors: IndexMap<&'static str, Arc<dyn Detector>>,
    config: DetectorConfig,
    strategy: Box<dyn ScoringStrategy>,
}

impl DetectorEngine {
    /// Create an engine using the strategy named in the configuration
    ///
    /// Fails if that strategy has no implementation.
    pub fn new(config: DetectorConfig) -> Result<Self, ScoringError> {
        let strategy = resolve_strategy(&config)?;
        Ok(Self::with_strategy(config, strategy))
    }

    /// Create an engine with a caller-supplied strategy
    pub fn with_strategy(config: DetectorConfig, strategy: Box<dyn ScoringStrategy>) -> Self {
        Self {
            detectors: IndexMap::new(),
            config,
            strategy,
        }
    }

    /// Create an engine with the built-in detectors registered
    pub fn with_default_detectors(config: DetectorConfig) -> Result<Self, ScoringError> {
        let mut engine = Self::new(config)?;
        let commit_pattern = CommitPatternDetector::new(&engine.config);
        engine
            .register(Arc::new(ExplicitAttributionDetector::new()))
            .register(Arc::new(commit_pattern));
        Ok(engine)
    }

    /// Register a detector
    ///
    /// Registering an id that already exists replaces that detector in place.
    pub fn register(&mut self, detector: Arc<dyn Detector>) -> &mut Self {
        let name = detector.name();
        if self.detectors.insert(name, detector).is_some() {
            debug!("Replaced detector: {}", name);
        }
        self
    }

    pub fn unregister(&mut self, name: &str) -> &mut Self {
        self.detectors.shift_remove(name);
        self
    }

    pub fn has_detector(&self, name: &str) -> bool {
        self.detectors.contains_key(name)
    }

    /// Registered detector ids in registration order
    pub fn detector_names(&self) -> Vec<&'static str> {
        self.detectors.keys().copied().collect()
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn strategy_id(&self) -> &'static str {
        self.strategy.id()
    }

    /// Run every enabled detector and aggregate the outcomes
    pub fn detect(&self, pr: &PullRequestRecord) -> AggregatedOutcome {
        let start = Instant::now();
        let enabled: Vec<&Arc<dyn Detector>> = self.enabled_detectors().collect();

        let pass = self.run_pass(&enabled, pr, self.config.should_early_exit());
        let result = self
            .strategy
            .aggregate(pass.outcomes, RunContext::with_early_exit(pass.early_exit));

        self.log_summary("detect", &result, &pass.failed, start);
        result
    }

    /// Run exactly the named detectors, in the given order
    ///
    /// Enable flags are ignored and there is no early exit. Unknown and
    /// repeated names are skipped.
    pub fn detect_with(&self, names: &[&str], pr: &PullRequestRecord) -> AggregatedOutcome {
        let start = Instant::now();
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut selected: Vec<&Arc<dyn Detector>> = Vec::new();

        for name in names {
            match self.detector(name) {
                Some(detector) => {
                    if seen.insert(detector.name()) {
                        selected.push(detector);
                    }
                }
                None => warn!("Unknown detector '{}' requested, skipping", name),
            }
        }

        let pass = self.run_pass(&selected, pr, false);
        let result = self
            .strategy
            .aggregate(pass.outcomes, RunContext::with_early_exit(false));

        self.log_summary("detect_with", &result, &pass.failed, start);
        result
    }

    /// Cost-aware detection: free detectors first, paid ones only if needed
    ///
    /// When the aggregate over the free detectors is already at High
    /// confidence or above, paid detectors are never invoked.
    pub fn detect_optimized(&self, pr: &PullRequestRecord) -> AggregatedOutcome {
        let start = Instant::now();
        let (free, paid): (Vec<&Arc<dyn Detector>>, Vec<&Arc<dyn Detector>>) = self
            .enabled_detectors()
            .partition(|d| !d.requires_external_api());

        let free_pass = self.run_pass(&free, pr, self.config.should_early_exit());
        let partial = self.strategy.aggregate(
            free_pass.outcomes.clone(),
            RunContext::with_early_exit(free_pass.early_exit || !paid.is_empty()),
        );

        if partial.final_confidence.numeric_value() >= CONCLUSIVE_CONFIDENCE {
            if !paid.is_empty() {
                info!(
                    "Free detectors conclusive ({}), skipping {} paid detector(s)",
                    partial.final_confidence,
                    paid.len()
                );
            }
            self.log_summary("detect_optimized", &partial, &free_pass.failed, start);
            return partial;
        }

        let paid_pass = self.run_pass(&paid, pr, false);
        let mut outcomes = free_pass.outcomes;
        outcomes.extend(paid_pass.outcomes);
        let mut failed = free_pass.failed;
        failed.extend(paid_pass.failed);

        let result = self
            .strategy
            .aggregate(outcomes, RunContext::with_early_exit(free_pass.early_exit));

        self.log_summary("detect_optimized", &result, &failed, start);
        result
    }

    fn enabled_detectors(&self) -> impl Iterator<Item = &Arc<dyn Detector>> + '_ {
        self.detectors.values().filter(|d| {
            let enabled = self.config.is_enabled(d.name());
            if !enabled {
                debug!("Skipping disabled detector: {}", d.name());
            }
            enabled
        })
    }

    /// Look up a registered detector by exact id, then by normalized id
    pub fn detector(&self, name: &str) -> Option<&Arc<dyn Detector>> {
        self.detectors
            .get(name)
            .or_else(|| self.detectors.get(normalize_detector_name(name).as_str()))
    }

    fn run_pass(
        &self,
        detectors: &[&Arc<dyn Detector>],
        pr: &PullRequestRecord,
        stop_on_definitive: bool,
    ) -> Pass {
        let mut outcomes = Vec::with_capacity(detectors.len());
        let mut failed = Vec::new();

        for (i, detector) in detectors.iter().enumerate() {
            let outcome = match self.run_single_detector(detector, pr) {
                DetectorRun::Completed(outcome) => outcome,
                DetectorRun::Failed {
                    detector_name,
                    error,
                    duration_ms,
                } => {
                    warn!(
                        "Dropping {} from this run after {:.2}ms: {}",
                        detector_name, duration_ms, error
                    );
                    failed.push(detector_name);
                    continue;
                }
            };
            let definitive = outcome.is_definitive();
            outcomes.push(outcome);

            if stop_on_definitive && definitive {
                let remaining = detectors.len() - i - 1;
                if remaining > 0 {
                    debug!(
                        "Definitive outcome from {}, skipping {} remaining detector(s)",
                        detector.name(),
                        remaining
                    );
                    return Pass {
                        outcomes,
                        failed,
                        early_exit: true,
                    };
                }
                break;
            }
        }

        Pass {
            outcomes,
            failed,
            early_exit: false,
        }
    }

    /// Run one detector, capturing errors and panics
    fn run_single_detector(
        &self,
        detector: &Arc<dyn Detector>,
        pr: &PullRequestRecord,
    ) -> DetectorRun {
        let name = detector.name();
        let start = Instant::now();

        debug!("Running detector: {}", name);

        // Wrap in catch_unwind to handle panics
        let detect_result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| detector.detect(pr)));

        match detect_result {
            Ok(Ok(outcome)) => {
                debug!(
                    "Detector {} scored {} ({}) in {:.2}ms",
                    name, outcome.score, outcome.confidence, outcome.duration_ms
                );
                DetectorRun::Completed(outcome)
            }
            Ok(Err(e)) => {
                let duration = start.elapsed().as_secs_f64() * 1000.0;
                DetectorRun::Failed {
                    detector_name: name.to_string(),
                    error: e.to_string(),
                    duration_ms: duration,
                }
            }
            Err(panic_info) => {
                let duration = start.elapsed().as_secs_f64() * 1000.0;
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                error!("Detector {} panicked: {}", name, panic_msg);
                DetectorRun::Failed {
                    detector_name: name.to_string(),
                    error: format!("Panic: {}", panic_msg),
                    duration_ms: duration,
                }
            }
        }
    }

    fn log_summary(
        &self,
        mode: &str,
        result: &AggregatedOutcome,
        failed: &[String],
        start: Instant,
    ) {
        let failures = if failed.is_empty() {
            String::new()
        } else {
            format!(", {} failed ({})", failed.len(), failed.join(", "))
        };
        info!(
            "{}: {} detector(s) ran{}, score {} ({}) in {:?}{}",
            mode,
            result.metadata.detectors_run,
            failures,
            result.final_score,
            result.final_confidence,
            start.elapsed(),
            if result.metadata.early_exit {
                ", early exit"
            } else {
                ""
            }
        );
    }
}

/// Builder for DetectorEngine with fluent API
pub struct DetectorEngineBuilder {
    config: DetectorConfig,
    detectors: Vec<Arc<dyn Detector>>,
    strategy: Option<Box<dyn ScoringStrategy>>,
    default_detectors: bool,
}

impl DetectorEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
            detectors: Vec::new(),
            strategy: None,
            default_detectors: false,
        }
    }

    pub fn config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the built-in detectors before any added with `detector`
    pub fn default_detectors(mut self) -> Self {
        self.default_detectors = true;
        self
    }

    /// Add a detector
    pub fn detector(mut self, detector: Arc<dyn Detector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Add multiple detectors
    pub fn detectors(mut self, detectors: impl IntoIterator<Item = Arc<dyn Detector>>) -> Self {
        self.detectors.extend(detectors);
        self
    }

    /// Use a custom scoring strategy instead of the configured one
    pub fn strategy(mut self, strategy: Box<dyn ScoringStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<DetectorEngine, ScoringError> {
        let mut engine = match self.strategy {
            Some(strategy) => DetectorEngine::with_strategy(self.config, strategy),
            None => DetectorEngine::new(self.config)?,
        };

        if self.default_detectors {
            let commit_pattern = CommitPatternDetector::new(&engine.config);
            engine
                .register(Arc::new(ExplicitAttributionDetector::new()))
                .register(Arc::new(commit_pattern));
        }
        for detector in self.detectors {
            engine.register(detector);
        }

        Ok(engine)
    }
}

impl Default for DetectorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
