//! Property tests for scoring and detector invariants

use aidetect::scoring::{RunContext, ScoringStrategy, WeightedAverageStrategy};
use aidetect::{
    AuthorIdentity, CommitPatternDetector, CommitRecord, ConfidenceLevel, DetectionOutcome,
    Detector, DetectorConfig, DetectorEngine, Metadata, PullRequestRecord,
};
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

const LEVELS: [ConfidenceLevel; 5] = [
    ConfidenceLevel::Uncertain,
    ConfidenceLevel::Low,
    ConfidenceLevel::Medium,
    ConfidenceLevel::High,
    ConfidenceLevel::Definitive,
];

const TOOLS: [&str; 3] = ["Claude Code", "GitHub Copilot", "Cursor"];

fn arb_outcome() -> impl Strategy<Value = DetectionOutcome> {
    (
        0i64..=100,
        0usize..LEVELS.len(),
        proptest::option::of(0usize..TOOLS.len()),
        0usize..6,
    )
        .prop_map(|(score, level, tool, id)| {
            DetectionOutcome::new(
                format!("detector_{}", id),
                score,
                LEVELS[level],
                tool.map(|t| TOOLS[t].to_string()),
                "generated",
                vec![],
                std::time::Duration::ZERO,
            )
        })
}

fn arb_pull_request() -> impl Strategy<Value = PullRequestRecord> {
    let message = prop_oneof![
        Just("Add feature"),
        Just("fix typo"),
        Just("WIP"),
        Just("Implement parser. Adds tests."),
        Just("Summary:\n- add cache\n- add metrics"),
        Just("debugging"),
    ];
    (
        proptest::collection::vec((message, 0i64..600), 0..12),
        0u64..2000,
        0u64..500,
    )
        .prop_map(|(commits, additions, deletions)| {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let mut at = start;
            let commits = commits
                .into_iter()
                .enumerate()
                .map(|(i, (msg, gap))| {
                    at += Duration::seconds(gap);
                    CommitRecord::new(
                        format!("h{}", i),
                        msg,
                        AuthorIdentity::new("Dev", "dev@example.com"),
                        at,
                    )
                })
                .collect();
            PullRequestRecord {
                title: "Generated".to_string(),
                description: None,
                commits,
                branch: None,
                labels: Default::default(),
                metadata: Metadata {
                    additions,
                    deletions,
                    changed_file_count: 1,
                    opened_at: start,
                    merged_at: None,
                },
            }
        })
}

fn strategy() -> WeightedAverageStrategy {
    WeightedAverageStrategy::new(&DetectorConfig::default())
}

proptest! {
    #[test]
    fn aggregate_score_stays_in_range(outcomes in proptest::collection::vec(arb_outcome(), 0..10)) {
        let result = strategy().aggregate(outcomes, RunContext::default());
        prop_assert!(result.final_score <= 100);
    }

    #[test]
    fn aggregate_is_order_independent(
        outcomes in proptest::collection::vec(arb_outcome(), 1..10),
        rotation in 0usize..10,
    ) {
        let mut reordered = outcomes.clone();
        reordered.reverse();
        let len = reordered.len();
        reordered.rotate_left(rotation % len);

        let a = strategy().aggregate(outcomes, RunContext::default());
        let b = strategy().aggregate(reordered, RunContext::default());
        prop_assert_eq!(a.final_score, b.final_score);
        prop_assert_eq!(a.final_confidence, b.final_confidence);
        prop_assert_eq!(a.metadata.detectors_run, b.metadata.detectors_run);
    }

    #[test]
    fn aggregate_is_idempotent(outcomes in proptest::collection::vec(arb_outcome(), 0..10)) {
        let a = strategy().aggregate(outcomes.clone(), RunContext::default());
        let b = strategy().aggregate(outcomes, RunContext::default());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn any_definitive_forces_definitive(
        mut outcomes in proptest::collection::vec(arb_outcome(), 0..8),
        position in 0usize..8,
    ) {
        let definitive = DetectionOutcome::new(
            "explicit_attribution",
            100,
            ConfidenceLevel::Definitive,
            None,
            "marker",
            vec![],
            std::time::Duration::ZERO,
        );
        let at = position.min(outcomes.len());
        outcomes.insert(at, definitive);

        let result = strategy().aggregate(outcomes, RunContext::default());
        prop_assert_eq!(result.final_confidence, ConfidenceLevel::Definitive);
    }

    #[test]
    fn commit_pattern_score_stays_in_range(pr in arb_pull_request()) {
        let detector = CommitPatternDetector::new(&DetectorConfig::default());
        let outcome = detector.detect(&pr).unwrap();
        prop_assert!(outcome.score <= 100);
        prop_assert_eq!(outcome.confidence, ConfidenceLevel::from_score(outcome.score));
        prop_assert_eq!(outcome.detected_tool.is_some(), outcome.score >= 70);
    }

    #[test]
    fn engine_results_stay_in_range(pr in arb_pull_request()) {
        let engine = DetectorEngine::with_default_detectors(DetectorConfig::default()).unwrap();
        for result in [engine.detect(&pr), engine.detect_optimized(&pr)] {
            prop_assert!(result.final_score <= 100);
            prop_assert!(result.detector_results.iter().all(|o| o.score <= 100));
        }
    }
}
