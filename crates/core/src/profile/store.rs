//! Per-thread histogram and profile storage.
//!
//! The store owns one [`ThreadContext`] per thread, created up front. Each
//! context maps an interval (profile id) and stack kind to the ingested
//! histogram and, once built, its capacity profile. Profiles are immutable:
//! ingesting a new histogram for the same key discards the old profile and a
//! later build replaces it wholesale.

use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::capacity::{CapacityBoundaries, CapacityProfile};
use super::histogram::ReuseDistanceHistogram;
use crate::common::{ConfigError, DataError, Error, ProfileId, StackKind, ThreadId};
use crate::config::PartitionConfig;

/// One histogram as supplied by the ingestion collaborator.
///
/// Distances arrive as formatted strings (`"16.00"`) and are parsed once,
/// numerically, when the record is converted.
#[derive(Debug, Clone, Deserialize)]
pub struct HistogramRecord {
    /// Thread the histogram was measured on.
    pub thread: ThreadId,
    /// Interval (1-based) the histogram was aggregated over.
    pub interval: ProfileId,
    /// Reuse stack the histogram was measured on.
    #[serde(default)]
    pub stack: StackKind,
    /// Access frequency by formatted reuse distance.
    pub distances: BTreeMap<String, u64>,
}

impl HistogramRecord {
    /// Parses the distances into a histogram.
    ///
    /// # Errors
    ///
    /// Propagates [`HistogramError`](crate::common::HistogramError) for bad keys.
    pub fn to_histogram(&self) -> Result<ReuseDistanceHistogram, Error> {
        Ok(ReuseDistanceHistogram::from_formatted(
            self.distances.iter().map(|(k, &f)| (k.as_str(), f)),
        )?)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    histogram: ReuseDistanceHistogram,
    profile: Option<CapacityProfile>,
}

/// Histograms and derived profiles of a single thread.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    thread: ThreadId,
    slots: BTreeMap<(ProfileId, StackKind), Slot>,
}

impl ThreadContext {
    /// Creates an empty context for `thread`.
    pub const fn new(thread: ThreadId) -> Self {
        Self {
            thread,
            slots: BTreeMap::new(),
        }
    }

    /// Thread this context belongs to.
    #[inline]
    pub const fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Stores a histogram, dropping any profile built from a previous one.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidProfileId`] for interval 0.
    pub fn set_histogram(
        &mut self,
        interval: ProfileId,
        stack: StackKind,
        histogram: ReuseDistanceHistogram,
    ) -> Result<(), DataError> {
        if interval == 0 {
            return Err(DataError::InvalidProfileId);
        }
        let _previous = self.slots.insert(
            (interval, stack),
            Slot {
                histogram,
                profile: None,
            },
        );
        Ok(())
    }

    /// Histogram for `interval` on `stack`, if one was ingested.
    pub fn histogram(
        &self,
        interval: ProfileId,
        stack: StackKind,
    ) -> Option<&ReuseDistanceHistogram> {
        self.slots.get(&(interval, stack)).map(|s| &s.histogram)
    }

    /// Capacity profile for `interval` on `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingHistogram`] when nothing was ingested for
    /// the key, or [`DataError::MissingProfile`] when profiles have not been
    /// built since the histogram arrived.
    pub fn profile(
        &self,
        interval: ProfileId,
        stack: StackKind,
    ) -> Result<&CapacityProfile, DataError> {
        let slot = self
            .slots
            .get(&(interval, stack))
            .ok_or(DataError::MissingHistogram {
                thread: self.thread,
                interval,
                stack,
            })?;
        slot.profile.as_ref().ok_or(DataError::MissingProfile {
            thread: self.thread,
            interval,
            stack,
        })
    }

    /// Builds every missing profile against `boundaries`; returns how many were built.
    pub fn build_profiles(&mut self, boundaries: &CapacityBoundaries) -> usize {
        let mut built = 0;
        for (&(interval, stack), slot) in &mut self.slots {
            if slot.profile.is_none() {
                debug!(thread = self.thread, interval, %stack, "building profile");
                slot.profile = Some(CapacityProfile::build(&slot.histogram, boundaries));
                built += 1;
            }
        }
        built
    }

    /// Intervals with at least one histogram, ascending.
    pub fn intervals(&self) -> impl Iterator<Item = ProfileId> + '_ {
        let mut last = None;
        self.slots.keys().filter_map(move |&(interval, _)| {
            if last == Some(interval) {
                None
            } else {
                last = Some(interval);
                Some(interval)
            }
        })
    }
}

/// Histograms and capacity profiles for every thread of a run.
#[derive(Debug, Clone)]
pub struct HistogramStore {
    threads: Vec<ThreadContext>,
    boundaries: CapacityBoundaries,
    filter_distance: f64,
}

impl HistogramStore {
    /// Creates a store with one empty context per configured thread.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error, if any.
    pub fn new(config: &PartitionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            threads: (0..config.num_threads).map(ThreadContext::new).collect(),
            boundaries: config.boundaries(),
            filter_distance: config.filter_distance,
        })
    }

    /// Number of threads the store was created for.
    #[inline]
    pub fn num_threads(&self) -> usize {
        self.threads.len()
    }

    /// Capacity boundaries every profile is built against.
    #[inline]
    pub const fn boundaries(&self) -> &CapacityBoundaries {
        &self.boundaries
    }

    /// Context of `thread`, if it exists.
    pub fn thread(&self, thread: ThreadId) -> Option<&ThreadContext> {
        self.threads.get(thread)
    }

    /// Ingests one histogram, applying the configured filtering distance.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownThread`] or [`DataError::InvalidProfileId`].
    pub fn insert(
        &mut self,
        thread: ThreadId,
        interval: ProfileId,
        stack: StackKind,
        histogram: &ReuseDistanceHistogram,
    ) -> Result<(), DataError> {
        let num_threads = self.threads.len();
        let context = self
            .threads
            .get_mut(thread)
            .ok_or(DataError::UnknownThread {
                thread,
                num_threads,
            })?;
        context.set_histogram(interval, stack, histogram.filtered(self.filter_distance))
    }

    /// Ingests a batch of records; returns how many were stored.
    ///
    /// # Errors
    ///
    /// Stops at the first record that fails to parse or names an unknown
    /// thread / invalid interval.
    pub fn ingest<'a, I>(&mut self, records: I) -> Result<usize, Error>
    where
        I: IntoIterator<Item = &'a HistogramRecord>,
    {
        let mut count = 0;
        for record in records {
            let histogram = record.to_histogram()?;
            self.insert(record.thread, record.interval, record.stack, &histogram)?;
            count += 1;
        }
        info!(records = count, threads = self.threads.len(), "ingested histograms");
        Ok(count)
    }

    /// Builds all pending capacity profiles, in parallel across threads.
    ///
    /// Returns the number of profiles built. Must run before any search.
    pub fn build_profiles(&mut self) -> usize {
        let boundaries = &self.boundaries;
        let built: usize = self
            .threads
            .par_iter_mut()
            .map(|context| context.build_profiles(boundaries))
            .sum();
        info!(built, "capacity profiles ready");
        built
    }

    /// Capacity profile of `thread` for `interval` on `stack`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownThread`] or the context's lookup error.
    pub fn profile(
        &self,
        thread: ThreadId,
        interval: ProfileId,
        stack: StackKind,
    ) -> Result<&CapacityProfile, DataError> {
        self.threads
            .get(thread)
            .ok_or(DataError::UnknownThread {
                thread,
                num_threads: self.threads.len(),
            })?
            .profile(interval, stack)
    }

    /// Profiles of every thread for `interval` on `stack`, indexed by thread.
    ///
    /// # Errors
    ///
    /// Returns the first thread's missing-data error.
    pub fn interval_profiles(
        &self,
        interval: ProfileId,
        stack: StackKind,
    ) -> Result<Vec<&CapacityProfile>, DataError> {
        let expected = self.boundaries.len();
        self.threads
            .iter()
            .map(|context| {
                let profile = context.profile(interval, stack)?;
                if profile.len() == expected {
                    Ok(profile)
                } else {
                    Err(DataError::ProfileLength {
                        expected,
                        found: profile.len(),
                    })
                }
            })
            .collect()
    }

    /// Every interval seen on any thread, ascending.
    pub fn intervals(&self) -> Vec<ProfileId> {
        self.threads
            .iter()
            .flat_map(ThreadContext::intervals)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
