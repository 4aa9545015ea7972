//! Reuse-distance driven cache way partitioning.
//!
//! This crate decides how to split the ways of a shared set-associative cache
//! between concurrently running threads. It provides:
//! 1. **Profiles:** Reuse-distance histograms per thread and interval, and the
//!    cumulative hit curves (capacity profiles) derived from them.
//! 2. **Search:** A marginal-gain heuristic, a hybrid refinement that credits a
//!    shared reuse stack, and an exhaustive evaluator over a fixed catalogue of
//!    partition shapes.
//! 3. **Analysis:** A single analyzer parameterized by stack and search mode,
//!    plus aggregate statistics over a run.
//!
//! The computation is offline and deterministic: histograms go in, allocation
//! recommendations and gain/miss figures come out.

/// Common types, constants, and error definitions.
pub mod common;
/// Analysis configuration (defaults, modes, validation).
pub mod config;
/// JSON analysis document (config, catalogue, histograms).
pub mod document;
/// Partition search (heuristic, hybrid, exhaustive) and the analyzer driving them.
pub mod partition;
/// Reuse-distance histograms, capacity profiles, and the per-thread store.
pub mod profile;
/// Aggregate statistics over an analysis report.
pub mod stats;

/// Crate-wide error and result types.
pub use crate::common::error::{Error, Result};
/// Parsed JSON input of a run.
pub use crate::document::AnalysisDocument;
/// Root configuration type; deserialize from JSON or build directly.
pub use crate::config::PartitionConfig;
/// Entry point of the analysis; construct with `PartitionAnalyzer::new`.
pub use crate::partition::PartitionAnalyzer;
/// Histogram and profile storage keyed by thread and interval.
pub use crate::profile::HistogramStore;
