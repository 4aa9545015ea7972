//! Capacity profiles: cumulative hit curves indexed by allocation size.
//!
//! This module turns reuse-distance histograms into the curves every search
//! reads from. It provides:
//! 1. **Boundaries:** The capacity (in lines) reached at each way count, plus
//!    one unbounded boundary, with byte-size labels.
//! 2. **Profiles:** For each boundary, the number of accesses whose reuse
//!    distance is strictly below it, i.e. the hits an allocation of that
//!    size would see.
//! 3. **Gain:** The signed change in hits when an allocation moves between
//!    two way counts.

use serde::Serialize;
use tracing::debug;

use super::histogram::ReuseDistanceHistogram;
use crate::common::ConfigError;
use crate::common::constants::{GIB, INFINITE_CAPACITY_LABEL, KIB, MIB};

/// Strictly increasing capacity boundaries, in cache lines.
///
/// For a cache of `W` ways and `S` sets per way the boundaries are
/// `[S, 2S, ..., W*S, +inf]`: entry `k` is the capacity of a `k + 1` way
/// allocation, and the last entry stands for unbounded capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityBoundaries {
    lines: Vec<f64>,
    labels: Vec<String>,
}

impl CapacityBoundaries {
    /// Boundaries for `total_ways` ways of `sets_per_way` sets each.
    ///
    /// Labels give the capacity in bytes (`line_bytes` per line), e.g. `64K`.
    pub fn for_ways(total_ways: usize, sets_per_way: u64, line_bytes: u64) -> Self {
        let mut lines = Vec::with_capacity(total_ways + 1);
        let mut labels = Vec::with_capacity(total_ways + 1);
        for ways in 1..=total_ways as u64 {
            let capacity = ways.saturating_mul(sets_per_way);
            lines.push(capacity as f64);
            labels.push(capacity_label(capacity.saturating_mul(line_bytes)));
        }
        lines.push(f64::INFINITY);
        labels.push(INFINITE_CAPACITY_LABEL.to_string());
        Self { lines, labels }
    }

    /// Boundaries from explicit line counts.
    ///
    /// An unbounded boundary is appended when `lines` does not already end
    /// with one. Labels are the line counts themselves.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonIncreasingBoundaries`] if the counts are not
    /// strictly increasing.
    pub fn from_lines(mut lines: Vec<f64>) -> Result<Self, ConfigError> {
        if lines.last().is_none_or(|last| last.is_finite()) {
            lines.push(f64::INFINITY);
        }
        if let Some(index) = lines
            .windows(2)
            .position(|pair| pair[1].partial_cmp(&pair[0]) != Some(std::cmp::Ordering::Greater))
        {
            return Err(ConfigError::NonIncreasingBoundaries { index: index + 1 });
        }
        let labels = lines
            .iter()
            .map(|&l| {
                if l.is_finite() {
                    format!("{l}")
                } else {
                    INFINITE_CAPACITY_LABEL.to_string()
                }
            })
            .collect();
        Ok(Self { lines, labels })
    }

    /// Boundary values in lines; the last one is `+inf`.
    #[inline]
    pub fn lines(&self) -> &[f64] {
        &self.lines
    }

    /// Human-readable capacity labels, one per boundary.
    #[inline]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of boundaries, including the unbounded one.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when there is no boundary at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of finite boundaries (the way counts).
    #[inline]
    pub fn finite_len(&self) -> usize {
        self.lines.iter().filter(|l| l.is_finite()).count()
    }
}

/// Formats a byte count the way cache sizes are usually quoted (`512`, `1K`, `64K`, `1M`).
///
/// Sizes that are not a whole number of the larger unit fall back to the
/// next smaller one.
pub fn capacity_label(bytes: u64) -> String {
    if bytes == 0 {
        return "0".to_string();
    }
    if bytes % GIB == 0 {
        format!("{}G", bytes / GIB)
    } else if bytes % MIB == 0 {
        format!("{}M", bytes / MIB)
    } else if bytes % KIB == 0 {
        format!("{}K", bytes / KIB)
    } else {
        bytes.to_string()
    }
}

/// Cumulative hits by capacity boundary for one thread and interval.
///
/// Entry `k` is the number of accesses whose reuse distance is strictly less
/// than boundary `k`. The curve is non-decreasing and its last entry (the
/// unbounded boundary) equals the total access count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapacityProfile {
    counts: Vec<u64>,
}

impl CapacityProfile {
    /// Builds the cumulative curve of `histogram` over `boundaries`.
    ///
    /// Walks the sorted distances and the boundaries together. Every time a
    /// distance reaches a boundary, the running total is frozen into that
    /// boundary and the boundary cursor advances; boundaries that no distance
    /// falls before all receive the same frozen value. Slots left after the
    /// last distance get the final total. An empty histogram yields zeros.
    pub fn build(histogram: &ReuseDistanceHistogram, boundaries: &CapacityBoundaries) -> Self {
        let bounds = boundaries.lines();
        let mut counts = Vec::with_capacity(bounds.len());
        let mut running: u64 = 0;

        for &(distance, frequency) in histogram.entries() {
            while counts.len() < bounds.len() && distance >= bounds[counts.len()] {
                counts.push(running);
            }
            running += frequency;
        }
        counts.resize(bounds.len(), running);

        debug!(
            distances = histogram.len(),
            total = running,
            boundaries = bounds.len(),
            "built capacity profile"
        );
        Self { counts }
    }

    /// Wraps precomputed cumulative counts.
    ///
    /// Intended for profiles produced elsewhere (e.g. replayed from a
    /// report); no monotonicity check is performed, see
    /// [`is_monotonic`](Self::is_monotonic).
    pub const fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Cumulative counts, one per boundary.
    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of boundaries covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True for a profile over no boundary.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total accesses (the unbounded boundary).
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.last().copied().unwrap_or(0)
    }

    /// Accesses that hit within an allocation of `ways` ways.
    ///
    /// Zero ways hit nothing. Allocations past the last boundary are treated
    /// as unbounded and hit every access.
    #[inline]
    pub fn hits(&self, ways: usize) -> u64 {
        match ways {
            0 => 0,
            w => self.counts.get(w - 1).copied().unwrap_or_else(|| self.total()),
        }
    }

    /// Accesses that miss with an allocation of `ways` ways.
    #[inline]
    pub fn misses(&self, ways: usize) -> u64 {
        self.total().saturating_sub(self.hits(ways))
    }

    /// Signed change in hits when the allocation moves from `from` to `to` ways.
    ///
    /// Positive when growing, negative when shrinking; `gain(a, b) == -gain(b, a)`.
    #[inline]
    pub fn gain(&self, from: usize, to: usize) -> i64 {
        self.hits(to) as i64 - self.hits(from) as i64
    }

    /// True when no entry is smaller than the one before it.
    pub fn is_monotonic(&self) -> bool {
        self.counts.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
