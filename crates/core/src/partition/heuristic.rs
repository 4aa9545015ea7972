//! Marginal-gain partition search.
//!
//! Starting from the equal split, the preferred thread takes one way from
//! every other thread per step (so it grows by `n - 1` while each other
//! thread shrinks by 1) until the others are down to a single way. Each step
//! is scored as the preferred thread's gain plus the mean gain (a loss) of the
//! other threads, both measured from the equal split. The first step with the
//! strictly highest positive score wins; when none scores above zero the
//! equal split stands and the outcome is flagged as not improved.

use tracing::debug;

use super::{Geometry, mean_over_others};
use super::report::SearchOutcome;
use crate::common::{AllocationVector, Error, ThreadId};
use crate::profile::CapacityProfile;

/// Finds the best allocation for `preferred` given one profile per thread.
///
/// `profiles` is indexed by thread id and must cover every thread of
/// `geometry`. With a single thread there is nothing to trade and the thread
/// keeps every way.
///
/// # Errors
///
/// Returns a configuration error when `preferred` is out of range and a data
/// error when the profile count does not match the thread count.
pub fn find_best_partition(
    geometry: &Geometry,
    profiles: &[&CapacityProfile],
    preferred: ThreadId,
) -> Result<SearchOutcome, Error> {
    geometry.check_preferred(preferred)?;
    geometry.check_profiles(profiles)?;

    let default = geometry.default_ways;
    let mut outcome =
        SearchOutcome::unimproved(preferred, default, geometry.total_ways, geometry.num_threads);
    if geometry.num_threads < 2 {
        return Ok(outcome);
    }

    let target = profiles[preferred];
    let mut preferred_ways = default + geometry.step;
    let mut other_ways = default - 1;

    while preferred_ways <= geometry.max_ways {
        let gain = target.gain(default, preferred_ways) as f64;
        let loss = mean_over_others(profiles, preferred, |p| p.gain(default, other_ways));
        let total = gain + loss;
        outcome.steps += 1;
        debug!(
            preferred,
            preferred_ways, other_ways, gain, loss, total, "heuristic step"
        );

        if total > outcome.gain {
            outcome.gain = total;
            outcome.best_ways = preferred_ways;
            outcome.improved = true;
        }

        preferred_ways += geometry.step;
        other_ways = other_ways.saturating_sub(1);
    }

    outcome.allocation = AllocationVector::with_preferred(
        preferred,
        outcome.best_ways,
        geometry.total_ways,
        geometry.num_threads,
    );
    Ok(outcome)
}
