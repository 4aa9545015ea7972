//! Shared-stack refinement of the marginal-gain search.
//!
//! Lines shared between threads live longer in the preferred thread's larger
//! partition, so every extra way given to it is credited with the shared hits
//! of *all* threads up to that extra capacity, counted from distance 0. The
//! other threads pay with their private-stack loss relative to the allocation
//! the private search left them with.

use tracing::debug;

use super::report::SearchOutcome;
use super::{Geometry, mean_over_others};
use crate::common::{AllocationVector, Error};
use crate::profile::CapacityProfile;

/// Refines `base` (a private-stack outcome) with shared-stack profiles.
///
/// Steps the preferred thread up from `base.best_ways` by `n - 1` ways and
/// every other thread down by one way from the allocation `base` left it,
/// while the preferred allocation stays within the geometry's maximum. Each
/// step scores
///
/// ```text
/// shared_gain  = sum over all threads of shared[t].gain(0, extra)
/// private_loss = mean over other threads of private[o].gain(other, new_other)
/// ```
///
/// where `extra` is the preferred thread's growth beyond `base.best_ways`.
/// The strictly best positive step supersedes `base`; otherwise `base`'s
/// allocation is returned with `improved == false` and zero gain.
///
/// # Errors
///
/// Returns a data error when either profile set does not cover every thread,
/// or a configuration error when `base.preferred` is out of range.
pub fn refine_with_shared(
    geometry: &Geometry,
    private: &[&CapacityProfile],
    shared: &[&CapacityProfile],
    base: &SearchOutcome,
) -> Result<SearchOutcome, Error> {
    let preferred = base.preferred;
    geometry.check_preferred(preferred)?;
    geometry.check_profiles(private)?;
    geometry.check_profiles(shared)?;

    let start = base.best_ways;
    let mut outcome =
        SearchOutcome::unimproved(preferred, start, geometry.total_ways, geometry.num_threads);
    if geometry.num_threads < 2 {
        return Ok(outcome);
    }

    let other_ways = geometry.other_ways(start);
    let mut preferred_ways = start + geometry.step;
    let mut new_other_ways = other_ways.saturating_sub(1);

    while preferred_ways <= geometry.max_ways {
        let extra = preferred_ways - start;
        let shared_gain: i64 = shared.iter().map(|p| p.gain(0, extra)).sum();
        let private_loss =
            mean_over_others(private, preferred, |p| p.gain(other_ways, new_other_ways));
        let total = shared_gain as f64 + private_loss;
        outcome.steps += 1;
        debug!(
            preferred,
            preferred_ways, new_other_ways, shared_gain, private_loss, total, "hybrid step"
        );

        if total > outcome.gain {
            outcome.gain = total;
            outcome.best_ways = preferred_ways;
            outcome.improved = true;
        }

        preferred_ways += geometry.step;
        new_other_ways = new_other_ways.saturating_sub(1);
    }

    outcome.allocation = AllocationVector::with_preferred(
        preferred,
        outcome.best_ways,
        geometry.total_ways,
        geometry.num_threads,
    );
    Ok(outcome)
}
