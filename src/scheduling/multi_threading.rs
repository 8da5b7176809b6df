//! Multi-threaded back-end of the toy Monte Carlo

use super::batches;
use crate::{accumulate::ToyAccumulator, random::RandomGenerator};
use std::{ops::Range, sync::Mutex};

/// Simulate trials in multi-threaded mode
///
/// Each batch of trials is a rayon task which draws from its own random
/// number stream, and task results are merged in batch order, so results are
/// identical to those of the sequential back-end.
///
pub fn run_simulation_impl(
    num_trials: usize,
    mut rng: RandomGenerator,
    simulate_trials: impl Send + Sync + Fn(Range<usize>, &mut RandomGenerator) -> ToyAccumulator,
) -> ToyAccumulator {
    let accumulator = ReproducibleAccumulator::new(batches(num_trials).count());

    // This function is a synchronization scope: it will only return
    // once all inner tasks have been executed
    rayon::scope(|scope| {
        for (batch_id, trials) in batches(num_trials).enumerate() {
            let mut task_rng = rng.clone();
            rng.jump();
            let accumulator_ref = &accumulator;
            let simulate_trials_ref = &simulate_trials;
            scope.spawn(move |_| {
                let result = simulate_trials_ref(trials, &mut task_rng);
                accumulator_ref.set_task_result(batch_id, result);
            });
        }
    });

    accumulator.get_merged_result()
}

/// Reproducibility-optimized results accumulation mechanism
struct ReproducibleAccumulator {
    /// Storage for the intermediary simulation results of parallel tasks
    results: Box<[Mutex<Option<ToyAccumulator>>]>,
}
//
impl ReproducibleAccumulator {
    /// Set up results storage for N parallel tasks
    fn new(num_tasks: usize) -> Self {
        assert!(num_tasks > 0, "There should be at least one task");
        Self {
            results: (0..num_tasks)
                .map(|_| Mutex::new(None))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Integrate the results of the n-th simulation task
    fn set_task_result(&self, task_id: usize, result: ToyAccumulator) {
        let mut lock = self.results[task_id]
            .lock()
            .expect("Mutex data should be valid");
        assert!(lock.is_none(), "Tasks should not report results twice");
        *lock = Some(result);
    }

    /// Aggregate the results in batch order
    fn get_merged_result(self) -> ToyAccumulator {
        let mut results_iter = self.results.into_vec().into_iter().map(|entry| {
            entry
                .into_inner()
                .expect("Mutex data should be valid")
                .expect("Result should be ready")
        });
        let first_result = results_iter
            .next()
            .expect("There should be at least one task");
        results_iter.fold(first_result, |mut r1, r2| {
            r1.merge(r2);
            r1
        })
    }
}
