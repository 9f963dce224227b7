//! Random source seam.
//!
//! Every probability draw in the engine goes through [`RandomSource`], one
//! `next_fraction()` call per layer. Production code uses [`SeededRandom`];
//! tests replay an exact sequence with [`SequenceRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed fractions in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next fraction in `[0, 1)`.
    fn next_fraction(&mut self) -> f64;
}

/// Seeded generator backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a generator from a seed. Equal seeds produce equal sequences.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_fraction(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of fractions, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty list always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
    draws: usize,
}

impl SequenceRandom {
    /// Create a sequence source.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let values = values
            .into()
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            values,
            cursor: 0,
            draws: 0,
        }
    }

    /// Number of fractions drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for SequenceRandom {
    fn next_fraction(&mut self) -> f64 {
        self.draws += 1;
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        value
    }
}

/// Roll a percentage: succeeds when `fraction * 100 < rate`.
///
/// Always consumes exactly one draw, even for rates of 0 or 100.
pub fn roll_percent(rng: &mut dyn RandomSource, rate: f64) -> bool {
    rng.next_fraction() * 100.0 < rate
}

/// Pick a uniformly random index below `len`. Consumes one draw; `None` when empty.
pub fn pick_index(rng: &mut dyn RandomSource, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let index = (rng.next_fraction() * len as f64) as usize;
    Some(index.min(len - 1))
}
