//! Sequential back-end of the toy Monte Carlo

use super::batches;
use crate::{accumulate::ToyAccumulator, random::RandomGenerator};
use std::ops::Range;

/// Simulate trials in sequential mode
///
/// We use batched logic even in sequential mode, in order to achieve
/// reproducibility with respect to multi-threaded runs.
///
/// Note that this is anyways generally a good thing to do when accumulating
/// lots of results, as otherwise the accumulator will eventually grow much
/// larger than the accumulated values and numerical accumulation errors
/// will start to blow up.
///
pub fn run_simulation_impl(
    num_trials: usize,
    mut rng: RandomGenerator,
    simulate_trials: impl Fn(Range<usize>, &mut RandomGenerator) -> ToyAccumulator,
) -> ToyAccumulator {
    let mut simulate_batch = |trials: Range<usize>| {
        let mut batch_rng = rng.clone();
        rng.jump();
        simulate_trials(trials, &mut batch_rng)
    };

    let mut batches = batches(num_trials);
    let first_batch = batches
        .next()
        .expect("There should be at least one batch");
    let mut accumulator = simulate_batch(first_batch);
    for batch in batches {
        accumulator.merge(simulate_batch(batch));
    }
    accumulator
}
