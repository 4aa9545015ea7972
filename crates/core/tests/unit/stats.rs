//! AnalysisStats unit tests.
//!
//! Verifies aggregation over a report and selective section rendering.

use pretty_assertions::assert_eq;
use waysplit_core::PartitionAnalyzer;
use waysplit_core::common::StackKind;
use waysplit_core::config::{SearchMode, StackMode};
use waysplit_core::partition::AnalysisReport;
use waysplit_core::stats::{AnalysisStats, STATS_SECTIONS, ThreadStats};

use crate::common::{Entry, config, store};

fn report() -> AnalysisReport {
    let cfg = config(16, 2).with_search_mode(SearchMode::Both);
    let entries: [Entry<'_>; 5] = [
        (0, 1, StackKind::Private, &[(12.0, 100)]),
        (1, 1, StackKind::Private, &[(6.0, 90)]),
        (0, 2, StackKind::Private, &[(0.0, 10)]),
        (1, 2, StackKind::Private, &[(0.0, 10)]),
        (0, 3, StackKind::Private, &[(0.0, 10)]),
    ];
    PartitionAnalyzer::new(cfg.clone())
        .unwrap()
        .analyze(&store(&cfg, &entries))
        .unwrap()
}

#[test]
fn test_default_stats_all_zero() {
    let stats = AnalysisStats::default();
    assert_eq!(stats.intervals, 0);
    assert_eq!(stats.decisions, 0);
    assert_eq!(stats.mean_gain(), 0.0);
    assert_eq!(ThreadStats::default().mean_ways(), 0.0);
}

#[test]
fn test_from_report_counts() {
    let stats = AnalysisStats::from_report(&report());
    assert_eq!(stats.intervals, 3);
    assert_eq!(stats.failed_intervals, 1);
    assert_eq!(stats.decisions, 4);
    assert_eq!(stats.recommendations, 4);
    assert_eq!(stats.improved, 1);
    assert_eq!(stats.total_gain, 10.0);
    assert_eq!(stats.mean_gain(), 2.5);
    assert_eq!(stats.exhaustive_runs, 4);
}

#[test]
fn test_from_report_per_thread() {
    let stats = AnalysisStats::from_report(&report());
    assert_eq!(stats.threads.len(), 2);
    let t0 = &stats.threads[0];
    assert_eq!(t0.decisions, 2);
    assert_eq!(t0.improved, 1);
    assert_eq!(t0.mean_ways(), 10.5);
    assert_eq!(t0.mean_gain(), 5.0);
    assert_eq!(stats.threads[1].mean_ways(), 8.0);
}

#[test]
fn test_hybrid_counts_heuristic_move_without_refinement() {
    let cfg = config(16, 2).with_stack_mode(StackMode::Hybrid);
    let entries: [Entry<'_>; 4] = [
        (0, 1, StackKind::Private, &[(10.0, 100)]),
        (1, 1, StackKind::Private, &[]),
        (0, 1, StackKind::Shared, &[]),
        (1, 1, StackKind::Shared, &[]),
    ];
    let report = PartitionAnalyzer::new(cfg.clone())
        .unwrap()
        .analyze(&store(&cfg, &entries))
        .unwrap();

    let d = &report.intervals[0].decisions[0];
    let hybrid = d.hybrid.as_ref().unwrap();
    assert!(!hybrid.improved);
    assert_eq!(hybrid.best_ways, 11);
    assert!(d.moved_from_equal_split());
    assert_eq!(d.gain_over_equal_split(), 100.0);

    let stats = AnalysisStats::from_report(&report);
    assert_eq!(stats.recommendations, 2);
    assert_eq!(stats.improved, 1);
    assert_eq!(stats.total_gain, 100.0);
    assert_eq!(stats.threads[0].improved, 1);
    assert_eq!(stats.threads[0].mean_ways(), 11.0);
    assert_eq!(stats.threads[1].improved, 0);
}

#[test]
fn test_render_selected_sections() {
    let stats = AnalysisStats::from_report(&report());
    let text = stats.render_sections(&["threads".to_string()]);
    assert!(text.contains("PREFERRED THREADS"));
    assert!(!text.contains("CATALOGUE SCAN"));
    assert!(!text.contains("intervals_failed"));
}

#[test]
fn test_render_all_sections() {
    let text = AnalysisStats::from_report(&report()).render_sections(&[]);
    assert!(text.contains("intervals_failed         1"));
    assert!(text.contains("PREFERRED THREADS"));
    assert!(text.contains("CATALOGUE SCAN"));
    assert_eq!(STATS_SECTIONS, &["summary", "threads", "exhaustive"]);
}
