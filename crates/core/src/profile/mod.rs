//! Reuse-distance profiles.
//!
//! This module holds everything between raw histograms and the curves the
//! searches read from. It provides:
//! 1. **Histograms:** Sorted `(distance, frequency)` arrays per thread and interval.
//! 2. **Capacity Profiles:** Cumulative hits per way boundary, and the gain between sizes.
//! 3. **Store:** Per-thread contexts keyed by interval and stack kind.

/// Capacity boundaries, capacity profiles, and gain.
pub mod capacity;

/// Reuse-distance histograms.
pub mod histogram;

/// Per-thread histogram and profile storage.
pub mod store;

pub use capacity::{CapacityBoundaries, CapacityProfile, capacity_label};
pub use histogram::ReuseDistanceHistogram;
pub use store::{HistogramRecord, HistogramStore, ThreadContext};
