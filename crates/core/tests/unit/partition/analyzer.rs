//! PartitionAnalyzer unit tests.
//!
//! Runs whole intervals through each stack and search mode and checks that
//! missing data is confined to the interval it affects.

use pretty_assertions::assert_eq;
use waysplit_core::common::{AllocationVector, ConfigError, DataError, StackKind};
use waysplit_core::config::{SearchMode, StackMode};
use waysplit_core::partition::PartitionShape;
use waysplit_core::{Error, HistogramStore, PartitionAnalyzer, PartitionConfig};

use crate::common::{Entry, config, init_tracing, store};

const PRIVATE: StackKind = StackKind::Private;
const SHARED: StackKind = StackKind::Shared;

fn two_thread_store(config: &PartitionConfig) -> HistogramStore {
    init_tracing();
    let entries: [Entry<'_>; 8] = [
        (0, 1, PRIVATE, &[(12.0, 100)]),
        (1, 1, PRIVATE, &[(6.0, 90)]),
        (0, 1, SHARED, &[]),
        (1, 1, SHARED, &[]),
        (0, 2, PRIVATE, &[(0.0, 100)]),
        (1, 2, PRIVATE, &[(5.0, 100)]),
        (0, 2, SHARED, &[(2.5, 150)]),
        (1, 2, SHARED, &[]),
    ];
    store(config, &entries)
}

#[test]
fn test_new_rejects_invalid_config() {
    assert_eq!(
        PartitionAnalyzer::new(PartitionConfig::new(15, 2)).unwrap_err(),
        ConfigError::WaysNotDivisible {
            total_ways: 15,
            num_threads: 2
        }
    );
}

#[test]
fn test_private_heuristic_per_interval() {
    let cfg = config(16, 2);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();

    assert_eq!(report.intervals.len(), 2);
    assert_eq!(report.failed().count(), 0);

    let first = &report.intervals[0];
    assert_eq!(first.interval, 1);
    assert_eq!(first.decisions.len(), 2);
    let d0 = &first.decisions[0];
    assert_eq!(d0.preferred, 0);
    assert_eq!(d0.heuristic.as_ref().map(|o| o.best_ways), Some(13));
    assert!(d0.hybrid.is_none());
    assert!(d0.exhaustive.is_none());
    assert_eq!(d0.recommended().map(|o| o.best_ways), Some(13));
}

#[test]
fn test_hybrid_mode_refines_private_result() {
    let cfg = config(16, 2).with_stack_mode(StackMode::Hybrid);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();

    let d = &report.intervals[1].decisions[0];
    let heuristic = d.heuristic.as_ref().unwrap();
    let hybrid = d.hybrid.as_ref().unwrap();
    assert_eq!(heuristic.best_ways, 8);
    assert_eq!(hybrid.best_ways, 11);
    assert_eq!(d.recommended(), Some(hybrid));
}

#[test]
fn test_shared_mode_searches_shared_profiles() {
    let cfg = config(16, 2).with_stack_mode(StackMode::Shared);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();

    // Interval 2's shared stack of thread 0 only needs 3 ways.
    let d = &report.intervals[1].decisions[0];
    assert!(d.hybrid.is_none());
    assert_eq!(d.heuristic.as_ref().map(|o| o.improved), Some(false));
}

#[test]
fn test_both_search_modes_run() {
    let cfg = config(16, 2).with_search_mode(SearchMode::Both);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();

    let d = &report.intervals[0].decisions[0];
    let exhaustive = d.exhaustive.as_ref().unwrap();
    assert_eq!(exhaustive.label, "15-1");
    assert_eq!(exhaustive.misses, 90);
    assert!(d.heuristic.is_some());
    assert_eq!(report.catalogue.len(), 4);
}

#[test]
fn test_exhaustive_only() {
    let cfg = config(16, 2).with_search_mode(SearchMode::Exhaustive);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();

    let d = &report.intervals[0].decisions[0];
    assert!(d.heuristic.is_none());
    assert!(d.recommended().is_none());
    assert!(d.exhaustive.is_some());
}

#[test]
fn test_custom_catalogue() {
    let cfg = config(16, 2).with_search_mode(SearchMode::Exhaustive);
    let shapes = vec![PartitionShape {
        label: "only".to_string(),
        ways: AllocationVector::new(vec![14, 2], 16).unwrap(),
    }];
    let analyzer = PartitionAnalyzer::new(cfg.clone())
        .unwrap()
        .with_catalogue(shapes)
        .unwrap();
    assert_eq!(analyzer.catalogue().len(), 1);

    let report = analyzer.analyze(&two_thread_store(&cfg)).unwrap();
    let d = &report.intervals[0].decisions[1];
    let exhaustive = d.exhaustive.as_ref().unwrap();
    assert_eq!(exhaustive.label, "only");
    assert_eq!(exhaustive.allocation.as_slice(), &[2, 14]);
}

#[test]
fn test_missing_data_is_confined_to_its_interval() {
    let cfg = config(16, 2);
    let entries: [Entry<'_>; 3] = [
        (0, 1, PRIVATE, &[(0.0, 1)]),
        (1, 1, PRIVATE, &[(0.0, 1)]),
        (0, 2, PRIVATE, &[(0.0, 1)]),
    ];
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();

    assert!(report.intervals[0].is_ok());
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].interval, 2);
    assert!(failed[0].decisions.is_empty());
    assert_eq!(
        failed[0].error,
        Some(Error::Data(DataError::MissingHistogram {
            thread: 1,
            interval: 2,
            stack: PRIVATE
        }))
    );
    assert_eq!(report.decisions().count(), 2);
}

#[test]
fn test_hybrid_without_shared_profiles_fails_interval() {
    let cfg = config(16, 2).with_stack_mode(StackMode::Hybrid);
    let entries: [Entry<'_>; 2] = [(0, 1, PRIVATE, &[(0.0, 1)]), (1, 1, PRIVATE, &[(0.0, 1)])];
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();
    assert!(matches!(
        report.intervals[0].error,
        Some(Error::Data(DataError::MissingHistogram { stack: StackKind::Shared, .. }))
    ));
}

#[test]
fn test_hybrid_exhaustive_only_needs_private_profiles() {
    let cfg = config(16, 2)
        .with_stack_mode(StackMode::Hybrid)
        .with_search_mode(SearchMode::Exhaustive);
    let entries: [Entry<'_>; 2] = [(0, 1, PRIVATE, &[(12.0, 100)]), (1, 1, PRIVATE, &[(6.0, 90)])];
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();

    assert!(report.intervals[0].is_ok());
    let d = &report.intervals[0].decisions[0];
    assert!(d.heuristic.is_none());
    assert!(d.hybrid.is_none());
    assert_eq!(d.exhaustive.as_ref().map(|e| e.label.as_str()), Some("15-1"));
}

#[test]
fn test_shared_mode_ignores_missing_private_profiles() {
    let cfg = config(16, 2).with_stack_mode(StackMode::Shared);
    let entries: [Entry<'_>; 2] = [(0, 1, SHARED, &[(12.0, 100)]), (1, 1, SHARED, &[])];
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();

    assert!(report.intervals[0].is_ok());
    let d = &report.intervals[0].decisions[0];
    assert_eq!(d.heuristic.as_ref().map(|o| o.best_ways), Some(13));
}

#[test]
fn test_empty_histograms_keep_equal_split() {
    let cfg = config(16, 4);
    let entries: Vec<Entry<'_>> = (0..4).map(|t| (t, 1, PRIVATE, &[][..])).collect();
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();
    for (_, d) in report.decisions() {
        let h = d.heuristic.as_ref().unwrap();
        assert!(!h.improved);
        assert_eq!(h.allocation, AllocationVector::equal(16, 4));
    }
}

#[test]
fn test_rejects_store_for_other_thread_count() {
    let analyzer = PartitionAnalyzer::new(config(16, 2)).unwrap();
    let other = store(&config(16, 4), &[]);
    assert_eq!(
        analyzer.analyze(&other).unwrap_err(),
        Error::Data(DataError::ThreadCount {
            expected: 2,
            found: 4
        })
    );
}

#[test]
fn test_decide_for_single_thread() {
    let cfg = config(16, 2);
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let s = two_thread_store(&cfg);
    let d = analyzer.decide_for(&s, 1, 0).unwrap();
    assert_eq!(d.heuristic.unwrap().allocation.as_slice(), &[13, 3]);
    assert!(matches!(
        analyzer.decide_for(&s, 1, 7),
        Err(Error::Config(ConfigError::PreferredOutOfRange { .. }))
    ));
}

#[test]
fn test_report_serializes_to_json() {
    let cfg = config(16, 2).with_search_mode(SearchMode::Both);
    let entries: [Entry<'_>; 2] = [(0, 1, PRIVATE, &[(0.0, 1)]), (0, 2, PRIVATE, &[(0.0, 1)])];
    let analyzer = PartitionAnalyzer::new(cfg.clone()).unwrap();
    let report = analyzer.analyze(&store(&cfg, &entries)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["config"]["total_ways"], 16);
    assert_eq!(json["catalogue"][0]["ways"], serde_json::json!([8, 8]));
    assert_eq!(
        json["intervals"][0]["error"],
        "thread 1 has no private histogram for interval 1"
    );
    assert!(json["intervals"][0]["decisions"].as_array().unwrap().is_empty());
}
