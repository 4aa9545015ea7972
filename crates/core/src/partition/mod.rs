//! Partition search.
//!
//! This module decides how many ways each thread should get. It provides:
//! 1. **Heuristic:** Marginal-gain search that grows one preferred thread at
//!    the expense of all others.
//! 2. **Hybrid:** Refinement of the heuristic result that credits hits on the
//!    shared reuse stack to the preferred thread's growth.
//! 3. **Exhaustive:** Miss counting over a fixed catalogue of partition shapes.
//! 4. **Analyzer:** One entry point running the above per interval and per
//!    preferred thread, selected by stack mode and search mode.

/// Per-interval driver for all search strategies.
pub mod analyzer;

/// Catalogue scan over fixed partition shapes.
pub mod exhaustive;

/// Marginal-gain heuristic search.
pub mod heuristic;

/// Shared-stack refinement of the heuristic result.
pub mod hybrid;

/// Search outcomes and per-interval reports.
pub mod report;

pub use analyzer::PartitionAnalyzer;
pub use exhaustive::{PartitionCatalogue, PartitionShape};
pub use report::{
    AnalysisReport, ExhaustiveOutcome, IntervalReport, PreferredDecision, SearchOutcome,
};

use crate::common::{ConfigError, DataError};
use crate::config::PartitionConfig;
use crate::profile::CapacityProfile;

/// Way arithmetic shared by every search, derived from a validated config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Ways of the shared cache.
    pub total_ways: usize,
    /// Threads sharing it.
    pub num_threads: usize,
    /// Equal-split allocation per thread.
    pub default_ways: usize,
    /// Largest allocation a preferred thread can reach.
    pub max_ways: usize,
    /// Ways the preferred thread gains per step.
    pub step: usize,
}

impl Geometry {
    /// Validates `config` and derives the way arithmetic.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: &PartitionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            total_ways: config.total_ways,
            num_threads: config.num_threads,
            default_ways: config.default_ways(),
            max_ways: config.max_ways(),
            step: config.step(),
        })
    }

    /// Ways each non-preferred thread keeps when the preferred one has `preferred_ways`.
    #[inline]
    pub const fn other_ways(&self, preferred_ways: usize) -> usize {
        if self.num_threads < 2 {
            0
        } else {
            self.total_ways.saturating_sub(preferred_ways) / (self.num_threads - 1)
        }
    }

    pub(crate) fn check_profiles(&self, profiles: &[&CapacityProfile]) -> Result<(), DataError> {
        if profiles.len() == self.num_threads {
            Ok(())
        } else {
            Err(DataError::ThreadCount {
                expected: self.num_threads,
                found: profiles.len(),
            })
        }
    }

    /// Checks that `preferred` names a configured thread.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PreferredOutOfRange`] otherwise.
    pub fn check_preferred(&self, preferred: usize) -> Result<(), ConfigError> {
        if preferred < self.num_threads {
            Ok(())
        } else {
            Err(ConfigError::PreferredOutOfRange {
                preferred,
                num_threads: self.num_threads,
            })
        }
    }
}

/// Mean of the gains of every thread except `preferred`.
///
/// Returns 0 when there is no other thread.
pub(crate) fn mean_over_others<F>(profiles: &[&CapacityProfile], preferred: usize, gain: F) -> f64
where
    F: Fn(&CapacityProfile) -> i64,
{
    let (sum, count) = profiles
        .iter()
        .enumerate()
        .filter(|&(thread, _)| thread != preferred)
        .fold((0i64, 0usize), |(sum, count), (_, profile)| {
            (sum + gain(profile), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
