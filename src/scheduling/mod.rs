//! This module takes care of scheduling the toy Monte Carlo work, encapsulating
//! use of multiple threads

#[cfg(feature = "multi-threading")]
mod multi_threading;
#[cfg(not(feature = "multi-threading"))]
mod sequential;

use crate::{accumulate::ToyAccumulator, random::RandomGenerator};
use std::ops::Range;

/// Size of the simulated trial batches
///
/// Trials are grouped in batches of a certain size, each of which draws from
/// its own random number stream. This makes the results of sequential and
/// parallel runs identical, and keeps the amount of work per task large
/// enough for synchronization overhead not to matter.
///
pub const TRIAL_BATCH_SIZE: usize = 10_000;

/// Split a number of trials into consecutive batches
fn batches(num_trials: usize) -> impl Iterator<Item = Range<usize>> {
    (0..num_trials)
        .step_by(TRIAL_BATCH_SIZE)
        .map(move |start| start..(start + TRIAL_BATCH_SIZE).min(num_trials))
}

/// Run the toy Monte Carlo in the manner that was configured at build time
///
/// Takes as parameters the total number of trials, the random seed, and a
/// kernel that simulates a range of trials given an initial random number
/// generator state.
///
/// Returns the results of all batches, merged in batch order.
///
pub fn run_simulation(
    num_trials: usize,
    seed: u64,
    simulate_trials: impl Send + Sync + Fn(Range<usize>, &mut RandomGenerator) -> ToyAccumulator,
) -> ToyAccumulator {
    assert!(num_trials > 0, "Must simulate at least one trial");
    let rng = RandomGenerator::new(seed);

    #[cfg(not(feature = "multi-threading"))]
    {
        sequential::run_simulation_impl(num_trials, rng, simulate_trials)
    }

    #[cfg(feature = "multi-threading")]
    {
        multi_threading::run_simulation_impl(num_trials, rng, simulate_trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batches_cover_all_trials() {
        let ranges = batches(25_000).collect::<Vec<_>>();
        assert_eq!(ranges, [0..10_000, 10_000..20_000, 20_000..25_000]);
        assert_eq!(batches(10_000).count(), 1);
    }
}
