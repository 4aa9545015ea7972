//! Configuration system for the partitioning engine.
//!
//! This module defines the parameters of an analysis run. It provides:
//! 1. **Defaults:** Baseline cache geometry and mode constants.
//! 2. **Structures:** [`PartitionConfig`], deserializable from JSON.
//! 3. **Enums:** Stack mode (which reuse stack drives the search) and search mode.
//!
//! Configuration arrives as part of the JSON analysis document read by the
//! CLI, or is built in code with `PartitionConfig::new`.

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::profile::CapacityBoundaries;

/// Default configuration constants for an analysis run.
mod defaults {
    /// Ways of the shared cache being partitioned.
    pub const TOTAL_WAYS: usize = 16;

    /// Threads sharing the cache.
    pub const NUM_THREADS: usize = 2;

    /// Sets per way. One set makes each way boundary one line wide.
    pub const SETS_PER_WAY: u64 = 1;

    /// Cache line size in bytes, used only for capacity labels.
    pub const LINE_BYTES: u64 = 64;

    /// No filtering cache in front of the partitioned one.
    pub const FILTER_DISTANCE: f64 = 0.0;
}

/// Which reuse stack drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    /// Marginal-gain search over private-stack profiles.
    #[default]
    #[serde(alias = "Private")]
    Private,
    /// Marginal-gain search over shared-stack profiles.
    #[serde(alias = "Shared")]
    Shared,
    /// Private search refined with the shared-stack profiles.
    #[serde(alias = "Hybrid")]
    Hybrid,
}

/// Which search strategies run for each interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Marginal-gain heuristic only.
    #[default]
    #[serde(alias = "Heuristic")]
    Heuristic,
    /// Catalogue scan only.
    #[serde(alias = "Exhaustive")]
    Exhaustive,
    /// Heuristic plus catalogue scan, for cross-checking.
    #[serde(alias = "Both")]
    Both,
}

impl SearchMode {
    /// True when the marginal-gain heuristic runs.
    #[inline]
    pub const fn runs_heuristic(self) -> bool {
        matches!(self, Self::Heuristic | Self::Both)
    }

    /// True when the catalogue scan runs.
    #[inline]
    pub const fn runs_exhaustive(self) -> bool {
        matches!(self, Self::Exhaustive | Self::Both)
    }
}

/// Root configuration of an analysis run.
///
/// # Examples
///
/// ```
/// use waysplit_core::config::{PartitionConfig, StackMode};
///
/// let json = r#"{
///     "total_ways": 32,
///     "num_threads": 4,
///     "set_bits": 9,
///     "stack_mode": "hybrid"
/// }"#;
///
/// let config: PartitionConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.sets_per_way(), 512);
/// assert_eq!(config.stack_mode, StackMode::Hybrid);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Total ways of the shared cache.
    pub total_ways: usize,

    /// Threads sharing the cache.
    pub num_threads: usize,

    /// Sets per way; each way boundary spans this many lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets_per_way: Option<u64>,

    /// Alternative to `sets_per_way`: sets per way as a power of two.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_bits: Option<u32>,

    /// Cache line size in bytes (capacity labels only)
    #[serde(default = "PartitionConfig::default_line_bytes")]
    pub line_bytes: u64,

    /// Reuse stack driving the search
    #[serde(default)]
    pub stack_mode: StackMode,

    /// Search strategies to run
    #[serde(default)]
    pub search_mode: SearchMode,

    /// Accesses closer than this distance are absorbed by a filtering cache
    /// and dropped from every histogram at ingestion.
    #[serde(default = "PartitionConfig::default_filter_distance")]
    pub filter_distance: f64,
}

impl PartitionConfig {
    /// Creates a configuration with default modes and geometry.
    pub fn new(total_ways: usize, num_threads: usize) -> Self {
        Self {
            total_ways,
            num_threads,
            ..Self::default()
        }
    }

    /// Sets the number of sets per way.
    #[must_use]
    pub fn with_sets_per_way(mut self, sets: u64) -> Self {
        self.sets_per_way = Some(sets);
        self.set_bits = None;
        self
    }

    /// Sets the stack mode.
    #[must_use]
    pub fn with_stack_mode(mut self, mode: StackMode) -> Self {
        self.stack_mode = mode;
        self
    }

    /// Sets the search mode.
    #[must_use]
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Sets the filtering-cache distance.
    #[must_use]
    pub fn with_filter_distance(mut self, distance: f64) -> Self {
        self.filter_distance = distance;
        self
    }

    fn default_line_bytes() -> u64 {
        defaults::LINE_BYTES
    }

    fn default_filter_distance() -> f64 {
        defaults::FILTER_DISTANCE
    }

    /// Resolved number of sets per way.
    ///
    /// `set_bits` wins when `sets_per_way` is absent; oversized bit counts
    /// saturate here and are rejected by [`validate`](Self::validate).
    pub fn sets_per_way(&self) -> u64 {
        match (self.sets_per_way, self.set_bits) {
            (Some(sets), _) => sets,
            (None, Some(bits)) => 1u64.checked_shl(bits).unwrap_or(u64::MAX),
            (None, None) => defaults::SETS_PER_WAY,
        }
    }

    /// Ways each thread receives under the equal split.
    #[inline]
    pub const fn default_ways(&self) -> usize {
        if self.num_threads == 0 {
            0
        } else {
            self.total_ways / self.num_threads
        }
    }

    /// Largest allocation a preferred thread may reach while every other
    /// thread keeps one way.
    #[inline]
    pub const fn max_ways(&self) -> usize {
        self.total_ways.saturating_sub(self.num_threads.saturating_sub(1))
    }

    /// Ways the preferred thread gains per search step (one from each other thread).
    #[inline]
    pub const fn step(&self) -> usize {
        self.num_threads.saturating_sub(1)
    }

    /// Capacity boundaries implied by the cache geometry.
    pub fn boundaries(&self) -> CapacityBoundaries {
        CapacityBoundaries::for_ways(self.total_ways, self.sets_per_way(), self.line_bytes)
    }

    /// Checks the configuration before any search runs.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: zero threads, zero sets, fewer ways
    /// than threads, ways not divisible by threads, conflicting or oversized
    /// set counts, or a negative / non-finite filter distance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.sets_per_way.is_some() && self.set_bits.is_some() {
            return Err(ConfigError::ConflictingSetCount);
        }
        if let Some(bits) = self.set_bits.filter(|&bits| bits >= u64::BITS - 1) {
            return Err(ConfigError::SetBitsTooLarge(bits));
        }
        if self.sets_per_way() == 0 {
            return Err(ConfigError::ZeroSets);
        }
        if self.total_ways < self.num_threads {
            return Err(ConfigError::TooFewWays {
                total_ways: self.total_ways,
                num_threads: self.num_threads,
            });
        }
        if self.total_ways % self.num_threads != 0 {
            return Err(ConfigError::WaysNotDivisible {
                total_ways: self.total_ways,
                num_threads: self.num_threads,
            });
        }
        if !self.filter_distance.is_finite() || self.filter_distance < 0.0 {
            return Err(ConfigError::InvalidFilterDistance(self.filter_distance));
        }
        Ok(())
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            total_ways: defaults::TOTAL_WAYS,
            num_threads: defaults::NUM_THREADS,
            sets_per_way: None,
            set_bits: None,
            line_bytes: defaults::LINE_BYTES,
            stack_mode: StackMode::default(),
            search_mode: SearchMode::default(),
            filter_distance: defaults::FILTER_DISTANCE,
        }
    }
}
