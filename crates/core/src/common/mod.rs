//! Common utilities and types used throughout the partitioning engine.
//!
//! This module provides the building blocks shared by the profile and
//! partition layers. It includes:
//! 1. **Identifiers:** Thread and profile (interval) id aliases and the stack kind tag.
//! 2. **Allocations:** The per-thread way vector produced by every search.
//! 3. **Constants:** The miss-distance sentinel and capacity label units.
//! 4. **Error Handling:** Configuration, data consistency, and histogram errors.

/// Per-thread way allocation vector.
pub mod allocation;

/// Common constants used throughout the engine.
pub mod constants;

/// Error types for configuration, data, and histogram failures.
pub mod error;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use allocation::AllocationVector;
pub use constants::MISS_DISTANCE;
pub use error::{ConfigError, DataError, Error, HistogramError, Result};

/// Index of a thread in the analyzed program (0-based).
pub type ThreadId = usize;

/// Interval index a histogram was aggregated over (1-based).
pub type ProfileId = u32;

/// Which reuse stack a histogram was measured on.
///
/// Private histograms count reuse within a single thread's accesses; shared
/// histograms count reuse of lines touched by more than one thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackKind {
    /// Reuse measured on the thread's own stack.
    #[default]
    #[serde(alias = "Private")]
    Private,
    /// Reuse measured on the stack of lines shared across threads.
    #[serde(alias = "Shared")]
    Shared,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.write_str("private"),
            Self::Shared => f.write_str("shared"),
        }
    }
}
