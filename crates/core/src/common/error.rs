//! Error definitions for the partitioning engine.
//!
//! This module defines the failure taxonomy of the engine. It provides:
//! 1. **Configuration Errors:** Fatal, raised before any search runs.
//! 2. **Data Errors:** Missing or inconsistent histogram data, reported per interval.
//! 3. **Histogram Errors:** Distance keys that cannot be turned into a valid histogram.
//!
//! Empty histograms are not an error: they produce an all-zero capacity
//! profile and leave every thread at the equal split.

use thiserror::Error as ThisError;

use super::{ProfileId, StackKind, ThreadId};

/// Invalid analysis parameters.
///
/// Raised by [`PartitionConfig::validate`](crate::config::PartitionConfig::validate)
/// and by catalogue construction, always before any interval is analyzed.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum ConfigError {
    /// The analysis was configured without any thread.
    #[error("number of threads must be at least 1")]
    ZeroThreads,

    /// Capacity boundaries need at least one set per way.
    #[error("sets per way must be at least 1")]
    ZeroSets,

    /// Every thread must receive at least one way.
    #[error("{total_ways} ways cannot give each of {num_threads} threads a way")]
    TooFewWays {
        /// Total ways available for partitioning.
        total_ways: usize,
        /// Number of threads sharing the cache.
        num_threads: usize,
    },

    /// The equal split must be exact.
    #[error("{total_ways} ways are not divisible by {num_threads} threads")]
    WaysNotDivisible {
        /// Total ways available for partitioning.
        total_ways: usize,
        /// Number of threads sharing the cache.
        num_threads: usize,
    },

    /// A preferred thread index outside `0..num_threads`.
    #[error("preferred thread {preferred} out of range for {num_threads} threads")]
    PreferredOutOfRange {
        /// Requested preferred thread.
        preferred: ThreadId,
        /// Number of threads sharing the cache.
        num_threads: usize,
    },

    /// A catalogue shape that is not a valid allocation.
    #[error("partition shape '{label}' is invalid: {reason}")]
    InvalidShape {
        /// Human-readable shape label.
        label: String,
        /// What made the shape invalid.
        reason: String,
    },

    /// A catalogue without any shape.
    #[error("partition catalogue is empty")]
    EmptyCatalogue,

    /// Filter distance must be a finite, non-negative number.
    #[error("filter distance {0} must be finite and non-negative")]
    InvalidFilterDistance(f64),

    /// `sets_per_way` and `set_bits` were both supplied.
    #[error("specify either sets_per_way or set_bits, not both")]
    ConflictingSetCount,

    /// `set_bits` large enough to overflow the set count.
    #[error("set_bits {0} is too large")]
    SetBitsTooLarge(u32),

    /// Capacity boundaries must be strictly increasing.
    #[error("capacity boundary {index} does not exceed the one before it")]
    NonIncreasingBoundaries {
        /// Index of the first offending boundary.
        index: usize,
    },
}

/// Missing or inconsistent per-thread data.
///
/// These errors are scoped to one interval: the analyzer records them in the
/// interval's report and keeps going with the other intervals.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DataError {
    /// No histogram was ingested for the given key.
    #[error("thread {thread} has no {stack} histogram for interval {interval}")]
    MissingHistogram {
        /// Thread the histogram belongs to.
        thread: ThreadId,
        /// Interval the histogram was expected for.
        interval: ProfileId,
        /// Stack the histogram was expected on.
        stack: StackKind,
    },

    /// A histogram exists but its capacity profile has not been built.
    #[error("thread {thread} has no {stack} capacity profile for interval {interval}")]
    MissingProfile {
        /// Thread the profile belongs to.
        thread: ThreadId,
        /// Interval the profile was expected for.
        interval: ProfileId,
        /// Stack the profile was expected on.
        stack: StackKind,
    },

    /// A histogram was offered for a thread the store does not know.
    #[error("thread {thread} out of range for {num_threads} threads")]
    UnknownThread {
        /// Offending thread id.
        thread: ThreadId,
        /// Number of threads the store was created with.
        num_threads: usize,
    },

    /// A store or profile set sized for a different thread count.
    #[error("expected profiles for {expected} threads, found {found}")]
    ThreadCount {
        /// Threads in the active configuration.
        expected: usize,
        /// Threads actually supplied.
        found: usize,
    },

    /// Interval ids start at 1.
    #[error("profile id 0 is not a valid interval (ids are 1-based)")]
    InvalidProfileId,

    /// A profile built against a different set of capacity boundaries.
    #[error("capacity profile has {found} entries, expected {expected}")]
    ProfileLength {
        /// Number of boundaries of the active configuration.
        expected: usize,
        /// Number of entries in the offending profile.
        found: usize,
    },
}

/// A distance key that cannot be part of a histogram.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum HistogramError {
    /// The distance string is not a number.
    #[error("reuse distance '{0}' is not a number")]
    Unparseable(String),

    /// NaN distances have no position on the capacity axis.
    #[error("reuse distance is NaN")]
    NotANumber,

    /// Distances count blocks and cannot be negative.
    #[error("reuse distance {0} is negative")]
    Negative(f64),
}

/// Umbrella error returned by the engine's fallible entry points.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Missing or inconsistent data.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Invalid histogram contents.
    #[error(transparent)]
    Histogram(#[from] HistogramError),
}

/// Result alias using the engine's umbrella [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
