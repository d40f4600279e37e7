//! Injectable randomness for price moves and market generation.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of the draws the simulation needs.
pub trait RandomSource {
    /// Uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
    /// Fair coin.
    fn next_bool(&mut self) -> bool;
    /// Uniform in `0..bound`. `bound` must be non-zero.
    fn next_below(&mut self, bound: u32) -> u32;
}

/// Adapter turning any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<ChaCha8Rng> {
    /// Reproducible stream: the same seed yields the same game.
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn next_bool(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        self.0.gen_range(0..bound)
    }
}

/// Replays fixed draws in order, cycling when exhausted. Test double.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    units: Vec<f64>,
    bools: Vec<bool>,
    ints: Vec<u32>,
    pos: (usize, usize, usize),
}

impl ScriptedSource {
    pub fn new(units: Vec<f64>, bools: Vec<bool>, ints: Vec<u32>) -> Self {
        Self {
            units,
            bools,
            ints,
            pos: (0, 0, 0),
        }
    }
}

fn cycle<T: Copy>(items: &[T], idx: &mut usize, fallback: T) -> T {
    if items.is_empty() {
        return fallback;
    }
    let v = items[*idx % items.len()];
    *idx += 1;
    v
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        cycle(&self.units, &mut self.pos.0, 0.0)
    }

    fn next_bool(&mut self) -> bool {
        cycle(&self.bools, &mut self.pos.1, true)
    }

    fn next_below(&mut self, bound: u32) -> u32 {
        cycle(&self.ints, &mut self.pos.2, 0) % bound
    }
}
