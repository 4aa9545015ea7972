//! Search outcomes and per-interval reports.
//!
//! Everything here is plain data handed to the reporting collaborator; it
//! serializes to JSON and holds no reference back into the store.

use serde::{Serialize, Serializer};

use super::exhaustive::PartitionShape;
use crate::common::{AllocationVector, Error, ProfileId, ThreadId};
use crate::config::PartitionConfig;

/// Result of a marginal-gain search (heuristic or hybrid) for one preferred thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    /// Thread whose allocation was grown.
    pub preferred: ThreadId,
    /// Best way count found for the preferred thread.
    pub best_ways: usize,
    /// Net gain (hits) of the best step; 0 when nothing improved.
    pub gain: f64,
    /// False when no step had a strictly positive gain and the search kept
    /// its starting allocation.
    pub improved: bool,
    /// Number of candidate steps evaluated.
    pub steps: usize,
    /// Full allocation implied by `best_ways`.
    pub allocation: AllocationVector,
}

impl SearchOutcome {
    /// Outcome of a search that never moved from `start_ways`.
    pub(crate) fn unimproved(
        preferred: ThreadId,
        start_ways: usize,
        total_ways: usize,
        num_threads: usize,
    ) -> Self {
        Self {
            preferred,
            best_ways: start_ways,
            gain: 0.0,
            improved: false,
            steps: 0,
            allocation: AllocationVector::with_preferred(
                preferred,
                start_ways,
                total_ways,
                num_threads,
            ),
        }
    }
}

/// Best catalogue shape for one preferred thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExhaustiveOutcome {
    /// Thread the shape's first slot was rotated onto.
    pub preferred: ThreadId,
    /// Label of the winning shape.
    pub label: String,
    /// Winning shape after rotation, indexed by thread.
    pub allocation: AllocationVector,
    /// Total misses of the winning shape.
    ///
    /// Accesses recorded at the miss sentinel distance are kept in the
    /// histograms, so this includes each thread's guaranteed misses. That adds
    /// the same constant to every shape and leaves the winner unchanged.
    pub misses: u64,
    /// Total misses of the equal split, for reference.
    pub equal_split_misses: u64,
}

/// Everything computed for one (interval, preferred thread) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferredDecision {
    /// Thread treated as preferred.
    pub preferred: ThreadId,
    /// Marginal-gain result over the mode's stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<SearchOutcome>,
    /// Shared-stack refinement of `heuristic` (hybrid mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid: Option<SearchOutcome>,
    /// Catalogue scan result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhaustive: Option<ExhaustiveOutcome>,
}

impl PreferredDecision {
    /// The marginal-gain recommendation: hybrid when present, else heuristic.
    pub fn recommended(&self) -> Option<&SearchOutcome> {
        self.hybrid.as_ref().or(self.heuristic.as_ref())
    }

    /// True when the recommendation moved away from the equal split, either
    /// in the heuristic step or in the hybrid refinement after it.
    pub fn moved_from_equal_split(&self) -> bool {
        self.heuristic.iter().chain(&self.hybrid).any(|o| o.improved)
    }

    /// Gain of the recommendation over the equal split: the heuristic's gain
    /// plus the hybrid refinement's gain on top of it.
    pub fn gain_over_equal_split(&self) -> f64 {
        self.heuristic.iter().chain(&self.hybrid).map(|o| o.gain).sum()
    }
}

/// Decisions for one interval, or the data error that prevented them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalReport {
    /// Interval (profile id) analyzed.
    pub interval: ProfileId,
    /// One decision per preferred thread; empty when `error` is set.
    pub decisions: Vec<PreferredDecision>,
    /// Why the interval could not be analyzed.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_error"
    )]
    pub error: Option<Error>,
}

impl IntervalReport {
    /// True when the interval produced decisions.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of analyzing every interval of a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Configuration the analysis ran with.
    pub config: PartitionConfig,
    /// Catalogue used by the exhaustive scan.
    pub catalogue: Vec<PartitionShape>,
    /// Per-interval results, ascending by interval.
    pub intervals: Vec<IntervalReport>,
}

impl AnalysisReport {
    /// Intervals that failed with a data error.
    pub fn failed(&self) -> impl Iterator<Item = &IntervalReport> {
        self.intervals.iter().filter(|r| !r.is_ok())
    }

    /// Every decision of every successful interval.
    pub fn decisions(&self) -> impl Iterator<Item = (ProfileId, &PreferredDecision)> {
        self.intervals
            .iter()
            .flat_map(|r| r.decisions.iter().map(move |d| (r.interval, d)))
    }
}

#[allow(clippy::ref_option)]
fn serialize_error<S: Serializer>(
    error: &Option<Error>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
