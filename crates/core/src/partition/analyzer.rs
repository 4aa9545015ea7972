//! Per-interval driver for all search strategies.
//!
//! [`PartitionAnalyzer`] is the single entry point of the engine. The stack
//! mode picks which profiles feed the search (private, shared, or private
//! refined with shared) and the search mode picks which strategies run.
//! Intervals are independent and are analyzed in parallel; a data error in
//! one interval is recorded in that interval's report and never stops the
//! others.

use rayon::prelude::*;
use tracing::{info, warn};

use super::exhaustive::{PartitionCatalogue, PartitionShape, evaluate_catalogue};
use super::heuristic::find_best_partition;
use super::hybrid::refine_with_shared;
use super::report::{AnalysisReport, IntervalReport, PreferredDecision};
use super::Geometry;
use crate::common::{ConfigError, DataError, Error, ProfileId, StackKind, ThreadId};
use crate::config::{PartitionConfig, SearchMode, StackMode};
use crate::profile::{CapacityProfile, HistogramStore};

/// Runs the configured searches over every interval of a [`HistogramStore`].
#[derive(Debug, Clone)]
pub struct PartitionAnalyzer {
    config: PartitionConfig,
    geometry: Geometry,
    catalogue: PartitionCatalogue,
}

impl PartitionAnalyzer {
    /// Creates an analyzer with the standard catalogue.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: PartitionConfig) -> Result<Self, ConfigError> {
        let geometry = Geometry::new(&config)?;
        let catalogue = PartitionCatalogue::standard(&geometry);
        Ok(Self {
            config,
            geometry,
            catalogue,
        })
    }

    /// Replaces the catalogue used by the exhaustive scan.
    ///
    /// # Errors
    ///
    /// Returns the catalogue's validation error.
    pub fn with_catalogue(mut self, shapes: Vec<PartitionShape>) -> Result<Self, ConfigError> {
        self.catalogue = PartitionCatalogue::new(shapes, &self.geometry)?;
        Ok(self)
    }

    /// Configuration the analyzer was built with.
    #[inline]
    pub const fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Way arithmetic derived from the configuration.
    #[inline]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Catalogue used by the exhaustive scan.
    #[inline]
    pub const fn catalogue(&self) -> &PartitionCatalogue {
        &self.catalogue
    }

    /// Analyzes every interval of `store`.
    ///
    /// Profiles must have been built. Per-interval data errors end up in the
    /// interval's report.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ThreadCount`] when the store was created for a
    /// different number of threads.
    pub fn analyze(&self, store: &HistogramStore) -> Result<AnalysisReport, Error> {
        if store.num_threads() != self.geometry.num_threads {
            return Err(DataError::ThreadCount {
                expected: self.geometry.num_threads,
                found: store.num_threads(),
            }
            .into());
        }

        let intervals: Vec<IntervalReport> = store
            .intervals()
            .par_iter()
            .map(|&interval| match self.analyze_interval(store, interval) {
                Ok(decisions) => IntervalReport {
                    interval,
                    decisions,
                    error: None,
                },
                Err(error) => {
                    warn!(interval, %error, "skipping interval");
                    IntervalReport {
                        interval,
                        decisions: Vec::new(),
                        error: Some(error),
                    }
                }
            })
            .collect();

        let failed = intervals.iter().filter(|r| !r.is_ok()).count();
        info!(
            intervals = intervals.len(),
            failed,
            stack_mode = ?self.config.stack_mode,
            search_mode = ?self.config.search_mode,
            "analysis complete"
        );

        Ok(AnalysisReport {
            config: self.config.clone(),
            catalogue: self.catalogue.shapes().to_vec(),
            intervals,
        })
    }

    /// Decisions for every preferred thread of one interval.
    ///
    /// # Errors
    ///
    /// Returns the first missing-data error for the interval.
    pub fn analyze_interval(
        &self,
        store: &HistogramStore,
        interval: ProfileId,
    ) -> Result<Vec<PreferredDecision>, Error> {
        let profiles = self.load_profiles(store, interval)?;
        let decisions = (0..self.geometry.num_threads)
            .map(|preferred| self.decide(&profiles, preferred))
            .collect::<Result<Vec<_>, _>>()?;
        info!(interval, threads = decisions.len(), "interval analyzed");
        Ok(decisions)
    }

    /// Decision for one interval with `preferred` as the preferred thread.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an out-of-range `preferred` and a
    /// data error when the interval lacks the profiles the mode needs.
    pub fn decide_for(
        &self,
        store: &HistogramStore,
        interval: ProfileId,
        preferred: ThreadId,
    ) -> Result<PreferredDecision, Error> {
        self.geometry.check_preferred(preferred)?;
        let profiles = self.load_profiles(store, interval)?;
        self.decide(&profiles, preferred)
    }

    fn load_profiles<'a>(
        &self,
        store: &'a HistogramStore,
        interval: ProfileId,
    ) -> Result<IntervalProfiles<'a>, DataError> {
        IntervalProfiles::load(store, interval, self.config.stack_mode, self.config.search_mode)
    }

    fn decide(
        &self,
        profiles: &IntervalProfiles<'_>,
        preferred: ThreadId,
    ) -> Result<PreferredDecision, Error> {
        let search = self.config.search_mode;
        let heuristic = if search.runs_heuristic() {
            Some(find_best_partition(&self.geometry, profiles.primary(), preferred)?)
        } else {
            None
        };
        let hybrid = match &heuristic {
            Some(base) if profiles.mode == StackMode::Hybrid => Some(refine_with_shared(
                &self.geometry,
                &profiles.private,
                &profiles.shared,
                base,
            )?),
            _ => None,
        };
        let exhaustive = if search.runs_exhaustive() {
            Some(evaluate_catalogue(
                &self.geometry,
                &self.catalogue,
                profiles.primary(),
                preferred,
            )?)
        } else {
            None
        };
        Ok(PreferredDecision {
            preferred,
            heuristic,
            hybrid,
            exhaustive,
        })
    }
}

/// Profiles of every thread for one interval, as required by a stack mode.
///
/// Shared profiles are only loaded when a search reads them: in shared mode,
/// and in hybrid mode when the marginal-gain search (and so the refinement)
/// runs.
struct IntervalProfiles<'a> {
    mode: StackMode,
    private: Vec<&'a CapacityProfile>,
    shared: Vec<&'a CapacityProfile>,
}

impl<'a> IntervalProfiles<'a> {
    fn load(
        store: &'a HistogramStore,
        interval: ProfileId,
        mode: StackMode,
        search: SearchMode,
    ) -> Result<Self, DataError> {
        let needs_private = mode != StackMode::Shared;
        let needs_shared = match mode {
            StackMode::Private => false,
            StackMode::Shared => true,
            StackMode::Hybrid => search.runs_heuristic(),
        };
        let private = if needs_private {
            store.interval_profiles(interval, StackKind::Private)?
        } else {
            Vec::new()
        };
        let shared = if needs_shared {
            store.interval_profiles(interval, StackKind::Shared)?
        } else {
            Vec::new()
        };
        Ok(Self {
            mode,
            private,
            shared,
        })
    }

    /// Profiles the heuristic and exhaustive scan run on.
    fn primary(&self) -> &[&'a CapacityProfile] {
        match self.mode {
            StackMode::Shared => &self.shared,
            StackMode::Private | StackMode::Hybrid => &self.private,
        }
    }
}
