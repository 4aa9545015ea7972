//! Global Engine Constants.
//!
//! This module defines constants shared across the engine. It includes:
//! 1. **Distance Constants:** The sentinel used for accesses that never hit.
//! 2. **Capacity Constants:** Units used when labelling capacity boundaries.

/// Reuse distance recorded for an access that always misses (2^62).
///
/// Tracing tools emit this value for first touches and for lines evicted
/// beyond any modelled capacity. Any larger or infinite distance is folded
/// onto it.
pub const MISS_DISTANCE: f64 = 4_611_686_018_427_387_904.0;

/// Bytes per kibibyte, used for capacity labels.
pub const KIB: u64 = 1024;

/// Bytes per mebibyte, used for capacity labels.
pub const MIB: u64 = 1024 * KIB;

/// Bytes per gibibyte, used for capacity labels.
pub const GIB: u64 = 1024 * MIB;

/// Label given to the unbounded capacity boundary.
pub const INFINITE_CAPACITY_LABEL: &str = "inf";
