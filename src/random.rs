//! Random number generation, on top of the abstractions of the "rand" crate

use crate::numeric::Float;
use rand::{Rng, SeedableRng};

/// Random number generation engine in use
type Engine = rand_xoshiro::Xoshiro256Plus;

/// Default seed of the toy Monte Carlo
pub const DEFAULT_SEED: u64 = 12345;

/// Seedable, jumpable random number generator
#[derive(Clone, Debug)]
pub struct RandomGenerator {
    rng: Engine,
}
//
impl RandomGenerator {
    /// Spawn a new random number generator
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Engine::seed_from_u64(seed),
        }
    }

    /// Generate a random floating-point number in [0, 1)
    pub fn random(&mut self) -> Float {
        self.rng.gen()
    }

    /// Generate an array of random numbers in [0, 1)
    pub fn random_array<const N: usize>(&mut self) -> [Float; N] {
        self.rng.gen()
    }

    /// Generate a random number uniformly distributed in [low, high)
    pub fn uniform(&mut self, low: Float, high: Float) -> Float {
        low + (high - low) * self.random()
    }

    /// Switch to a state which is 2^128 draws away from the current one,
    /// giving an independent stream
    pub fn jump(&mut self) {
        self.rng.jump();
    }
}
