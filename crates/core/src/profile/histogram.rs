//! Reuse-distance histograms.
//!
//! A histogram maps each observed reuse distance to the number of accesses
//! seen at that distance. Distances are kept as a sorted array of
//! `(distance, frequency)` pairs so that capacity profiles can be built in a
//! single forward pass. Formatted keys (`"16.00"`) are parsed once, at
//! construction.

use tracing::trace;

use crate::common::{HistogramError, MISS_DISTANCE};

/// Access frequencies by reuse distance for one thread and interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReuseDistanceHistogram {
    entries: Vec<(f64, u64)>,
}

impl ReuseDistanceHistogram {
    /// Creates an empty histogram.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a histogram from `(distance, frequency)` pairs.
    ///
    /// Pairs may arrive in any order. Repeated distances are merged by
    /// summing their frequencies. Distances at or beyond [`MISS_DISTANCE`],
    /// including `+inf`, are folded onto the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::NotANumber`] or [`HistogramError::Negative`]
    /// for distances that cannot be placed on the capacity axis.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = (f64, u64)>,
    {
        let mut entries = pairs
            .into_iter()
            .map(|(distance, frequency)| Ok((normalize(distance)?, frequency)))
            .collect::<Result<Vec<_>, HistogramError>>()?;
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        entries.dedup_by(|next, kept| {
            if next.0 == kept.0 {
                kept.1 += next.1;
                true
            } else {
                false
            }
        });
        Ok(Self { entries })
    }

    /// Builds a histogram from formatted distance keys.
    ///
    /// Keys are compared by numeric value, never lexicographically: `"9.00"`
    /// sorts before `"10.00"`.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::Unparseable`] for keys that are not numbers,
    /// plus the errors of [`from_pairs`](Self::from_pairs).
    pub fn from_formatted<I, S>(pairs: I) -> Result<Self, HistogramError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let parsed = pairs
            .into_iter()
            .map(|(key, frequency)| {
                let key = key.as_ref().trim();
                key.parse::<f64>()
                    .map(|distance| (distance, frequency))
                    .map_err(|_| HistogramError::Unparseable(key.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_pairs(parsed)
    }

    /// Sorted `(distance, frequency)` pairs with unique distances.
    #[inline]
    pub fn entries(&self) -> &[(f64, u64)] {
        &self.entries
    }

    /// Number of distinct distances.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no access was recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of accesses.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|&(_, f)| f).sum()
    }

    /// Accesses recorded at the miss sentinel.
    pub fn guaranteed_misses(&self) -> u64 {
        self.entries
            .last()
            .filter(|(d, _)| *d >= MISS_DISTANCE)
            .map_or(0, |&(_, f)| f)
    }

    /// Drops every access closer than `min_distance`.
    ///
    /// Models a smaller filtering cache (an L1 in front of the partitioned
    /// L2) that turns those accesses into hits before they reach the shared
    /// cache. The distances of the surviving accesses are left untouched.
    #[must_use]
    pub fn filtered(&self, min_distance: f64) -> Self {
        if min_distance <= 0.0 {
            return self.clone();
        }
        let start = self.entries.partition_point(|&(d, _)| d < min_distance);
        trace!(
            min_distance,
            dropped = start,
            kept = self.entries.len() - start,
            "filtered histogram"
        );
        Self {
            entries: self.entries[start..].to_vec(),
        }
    }
}

fn normalize(distance: f64) -> Result<f64, HistogramError> {
    if distance.is_nan() {
        Err(HistogramError::NotANumber)
    } else if distance < 0.0 {
        Err(HistogramError::Negative(distance))
    } else if distance >= MISS_DISTANCE {
        Ok(MISS_DISTANCE)
    } else {
        Ok(distance)
    }
}
