//! # Configuration Tests
//!
//! Tests for configuration defaults, deserialization, derived way arithmetic,
//! and validation.

use pretty_assertions::assert_eq;
use rstest::rstest;
use waysplit_core::common::ConfigError;
use waysplit_core::config::*;

#[test]
fn test_config_default() {
    let config = PartitionConfig::default();
    assert_eq!(config.total_ways, 16);
    assert_eq!(config.num_threads, 2);
    assert_eq!(config.sets_per_way(), 1);
    assert_eq!(config.line_bytes, 64);
    assert_eq!(config.stack_mode, StackMode::Private);
    assert_eq!(config.search_mode, SearchMode::Heuristic);
    assert_eq!(config.filter_distance, 0.0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_minimal_json_uses_defaults() {
    let config: PartitionConfig =
        serde_json::from_str(r#"{ "total_ways": 8, "num_threads": 4 }"#).unwrap();
    assert_eq!(config, PartitionConfig::new(8, 4));
}

#[test]
fn test_config_full_json() {
    let json = r#"{
        "total_ways": 16,
        "num_threads": 2,
        "sets_per_way": 2,
        "line_bytes": 128,
        "stack_mode": "Shared",
        "search_mode": "both",
        "filter_distance": 64.0
    }"#;
    let config: PartitionConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.sets_per_way(), 2);
    assert_eq!(config.line_bytes, 128);
    assert_eq!(config.stack_mode, StackMode::Shared);
    assert_eq!(config.search_mode, SearchMode::Both);
    assert_eq!(config.filter_distance, 64.0);
}

#[test]
fn test_config_missing_geometry_is_rejected() {
    assert!(serde_json::from_str::<PartitionConfig>(r#"{ "num_threads": 2 }"#).is_err());
}

#[test]
fn test_set_bits_resolve_to_power_of_two() {
    let config: PartitionConfig =
        serde_json::from_str(r#"{ "total_ways": 16, "num_threads": 2, "set_bits": 11 }"#).unwrap();
    assert_eq!(config.sets_per_way(), 2048);
}

#[rstest]
#[case(16, 2, 8, 15, 1)]
#[case(16, 4, 4, 13, 3)]
#[case(32, 8, 4, 25, 7)]
#[case(8, 1, 8, 8, 0)]
fn test_way_arithmetic(
    #[case] ways: usize,
    #[case] threads: usize,
    #[case] default: usize,
    #[case] max: usize,
    #[case] step: usize,
) {
    let config = PartitionConfig::new(ways, threads);
    assert_eq!(config.default_ways(), default);
    assert_eq!(config.max_ways(), max);
    assert_eq!(config.step(), step);
}

#[test]
fn test_boundaries_from_geometry() {
    let config = PartitionConfig::new(4, 2).with_sets_per_way(512);
    let boundaries = config.boundaries();
    assert_eq!(
        boundaries.lines(),
        &[512.0, 1024.0, 1536.0, 2048.0, f64::INFINITY]
    );
    assert_eq!(boundaries.labels(), &["32K", "64K", "96K", "128K", "inf"]);
}

#[rstest]
#[case::zero_threads(PartitionConfig::new(16, 0), ConfigError::ZeroThreads)]
#[case::zero_sets(PartitionConfig::new(16, 2).with_sets_per_way(0), ConfigError::ZeroSets)]
#[case::too_few_ways(
    PartitionConfig::new(2, 4),
    ConfigError::TooFewWays { total_ways: 2, num_threads: 4 }
)]
#[case::not_divisible(
    PartitionConfig::new(15, 2),
    ConfigError::WaysNotDivisible { total_ways: 15, num_threads: 2 }
)]
#[case::negative_filter(
    PartitionConfig::new(16, 2).with_filter_distance(-1.0),
    ConfigError::InvalidFilterDistance(-1.0)
)]
fn test_validate_rejects(#[case] config: PartitionConfig, #[case] expected: ConfigError) {
    assert_eq!(config.validate(), Err(expected));
}

#[test]
fn test_validate_rejects_conflicting_set_counts() {
    let mut config = PartitionConfig::new(16, 2).with_sets_per_way(4);
    config.set_bits = Some(2);
    assert_eq!(config.validate(), Err(ConfigError::ConflictingSetCount));
}

#[test]
fn test_validate_rejects_oversized_set_bits() {
    let mut config = PartitionConfig::new(16, 2);
    config.set_bits = Some(64);
    assert_eq!(config.validate(), Err(ConfigError::SetBitsTooLarge(64)));
}

#[test]
fn test_validate_rejects_infinite_filter() {
    let config = PartitionConfig::new(16, 2).with_filter_distance(f64::INFINITY);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidFilterDistance(_))
    ));
}

#[test]
fn test_search_mode_flags() {
    assert!(SearchMode::Heuristic.runs_heuristic());
    assert!(!SearchMode::Heuristic.runs_exhaustive());
    assert!(!SearchMode::Exhaustive.runs_heuristic());
    assert!(SearchMode::Exhaustive.runs_exhaustive());
    assert!(SearchMode::Both.runs_heuristic());
    assert!(SearchMode::Both.runs_exhaustive());
}
