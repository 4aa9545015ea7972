//! Catalogue scan over fixed partition shapes.
//!
//! A baseline for the heuristic: every shape of a small, fixed catalogue is
//! rotated so that its first slot lands on the preferred thread, and the
//! shape with the fewest total misses wins. The full space of compositions is
//! deliberately not enumerated.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Geometry;
use super::report::ExhaustiveOutcome;
use crate::common::{AllocationVector, ConfigError, Error, ThreadId};
use crate::profile::CapacityProfile;

/// A labelled allocation. Slot 0 is the slot given to the preferred thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionShape {
    /// Human-readable label; defaults to the way counts joined by `-`.
    #[serde(default)]
    pub label: String,
    /// Ways per slot.
    pub ways: AllocationVector,
}

/// Validated set of partition shapes for one cache geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionCatalogue {
    shapes: Vec<PartitionShape>,
}

impl PartitionCatalogue {
    /// Validates `shapes` against `geometry`.
    ///
    /// Empty labels are replaced by the shape's way counts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCatalogue`] for no shapes and
    /// [`ConfigError::InvalidShape`] for a shape with the wrong slot count, a
    /// slot without a way, or a sum other than the total ways.
    pub fn new(shapes: Vec<PartitionShape>, geometry: &Geometry) -> Result<Self, ConfigError> {
        if shapes.is_empty() {
            return Err(ConfigError::EmptyCatalogue);
        }
        let shapes = shapes
            .into_iter()
            .map(|shape| {
                let ways =
                    AllocationVector::new(shape.ways.as_slice().to_vec(), geometry.total_ways)?;
                let label = if shape.label.is_empty() {
                    ways.label()
                } else {
                    shape.label
                };
                if ways.len() != geometry.num_threads {
                    return Err(ConfigError::InvalidShape {
                        label,
                        reason: format!(
                            "has {} slots, expected {}",
                            ways.len(),
                            geometry.num_threads
                        ),
                    });
                }
                Ok(PartitionShape { label, ways })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { shapes })
    }

    /// The standard catalogue: the equal split plus a few skewed splits.
    ///
    /// A skew of `k` gives slot 0 `default + k * (n - 1)` ways and every other
    /// slot `default - k`, for `k` in `default / 4`, `default / 2` and
    /// `default - 1` (duplicates and zero skews dropped).
    pub fn standard(geometry: &Geometry) -> Self {
        let default = geometry.default_ways;
        let n = geometry.num_threads;
        let mut shapes = vec![PartitionShape::from_ways(AllocationVector::equal(
            geometry.total_ways,
            n,
        ))];
        if n >= 2 {
            let mut skews = vec![default / 4, default / 2, default.saturating_sub(1)];
            skews.retain(|&k| k >= 1);
            skews.dedup();
            for k in skews {
                let ways = AllocationVector::with_preferred(
                    0,
                    default + k * (n - 1),
                    geometry.total_ways,
                    n,
                );
                shapes.push(PartitionShape::from_ways(ways));
            }
        }
        Self { shapes }
    }

    /// Shapes in catalogue order.
    #[inline]
    pub fn shapes(&self) -> &[PartitionShape] {
        &self.shapes
    }

    /// Number of shapes.
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// True for a catalogue without shapes (never produced by the constructors).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl PartitionShape {
    fn from_ways(ways: AllocationVector) -> Self {
        Self {
            label: ways.label(),
            ways,
        }
    }
}

/// Total misses of `allocation` across all threads.
///
/// Each thread contributes its total accesses minus the accesses that fit in
/// its allocated ways.
pub fn misses_for(profiles: &[&CapacityProfile], allocation: &AllocationVector) -> u64 {
    profiles
        .iter()
        .enumerate()
        .map(|(thread, profile)| profile.misses(allocation.get(thread).unwrap_or(0)))
        .sum()
}

/// Scans `catalogue` for the shape with the fewest misses when rotated onto `preferred`.
///
/// Ties keep the shape listed first.
///
/// # Errors
///
/// Returns a configuration error when `preferred` is out of range and a data
/// error when `profiles` does not cover every thread.
pub fn evaluate_catalogue(
    geometry: &Geometry,
    catalogue: &PartitionCatalogue,
    profiles: &[&CapacityProfile],
    preferred: ThreadId,
) -> Result<ExhaustiveOutcome, Error> {
    geometry.check_preferred(preferred)?;
    geometry.check_profiles(profiles)?;

    let equal_split_misses = misses_for(
        profiles,
        &AllocationVector::equal(geometry.total_ways, geometry.num_threads),
    );
    let mut best: Option<ExhaustiveOutcome> = None;

    for shape in catalogue.shapes() {
        let allocation = shape.ways.rotated_to(preferred);
        let misses = misses_for(profiles, &allocation);
        debug!(preferred, shape = %shape.label, %allocation, misses, "catalogue shape");
        if best.as_ref().is_none_or(|b| misses < b.misses) {
            best = Some(ExhaustiveOutcome {
                preferred,
                label: shape.label.clone(),
                allocation,
                misses,
                equal_split_misses,
            });
        }
    }

    best.ok_or_else(|| ConfigError::EmptyCatalogue.into())
}
