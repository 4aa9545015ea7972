//! Per-thread way allocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use super::ThreadId;
use super::error::ConfigError;

/// Ways assigned to each thread, indexed by thread id.
///
/// A valid allocation sums to the total ways of the cache and gives every
/// thread at least one way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationVector(Vec<usize>);

impl AllocationVector {
    /// Wraps a way vector after checking it against `total_ways`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] if the vector is empty, does not
    /// sum to `total_ways`, or leaves a thread without a way.
    pub fn new(ways: Vec<usize>, total_ways: usize) -> Result<Self, ConfigError> {
        let candidate = Self(ways);
        let invalid = |reason: String| ConfigError::InvalidShape {
            label: candidate.label(),
            reason,
        };
        if candidate.0.is_empty() {
            return Err(invalid("no thread slots".to_string()));
        }
        if let Some(thread) = candidate.0.iter().position(|&w| w == 0) {
            return Err(invalid(format!("slot {thread} has no way")));
        }
        let sum = candidate.total();
        if sum != total_ways {
            return Err(invalid(format!("sums to {sum} ways, expected {total_ways}")));
        }
        Ok(candidate)
    }

    /// The equal split of `total_ways` across `num_threads`.
    pub fn equal(total_ways: usize, num_threads: usize) -> Self {
        Self(vec![total_ways / num_threads.max(1); num_threads])
    }

    /// Gives `preferred` exactly `preferred_ways` and splits the rest evenly.
    ///
    /// Used to expand the scalar result of a search into a full vector. With
    /// a single thread the vector is just `[preferred_ways]`.
    pub fn with_preferred(
        preferred: ThreadId,
        preferred_ways: usize,
        total_ways: usize,
        num_threads: usize,
    ) -> Self {
        let others = num_threads.saturating_sub(1);
        let other_ways = if others == 0 {
            0
        } else {
            total_ways.saturating_sub(preferred_ways) / others
        };
        Self(
            (0..num_threads)
                .map(|t| if t == preferred { preferred_ways } else { other_ways })
                .collect(),
        )
    }

    /// Rotates a shape so that its first slot lands on `preferred`.
    ///
    /// Thread `t` receives `shape[(t + n - preferred) % n]`.
    pub fn rotated_to(&self, preferred: ThreadId) -> Self {
        let n = self.0.len();
        if n == 0 {
            return self.clone();
        }
        Self((0..n).map(|t| self.0[(t + n - preferred % n) % n]).collect())
    }

    /// Ways assigned to `thread`, if the thread exists.
    #[inline]
    pub fn get(&self, thread: ThreadId) -> Option<usize> {
        self.0.get(thread).copied()
    }

    /// Number of thread slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the vector has no slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all slots.
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Slots as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Way counts joined by `-`, e.g. `12-4`.
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Index<ThreadId> for AllocationVector {
    type Output = usize;

    fn index(&self, thread: ThreadId) -> &usize {
        &self.0[thread]
    }
}

impl fmt::Display for AllocationVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
