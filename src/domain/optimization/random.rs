//! Injectable random source for strategies and the score evaluator.
//!
//! Production code seeds from OS entropy; tests pass a fixed seed (or a
//! scripted source) so trials are reproducible. Seeded sources use ChaCha8,
//! whose output stream is fixed for a given seed across rand releases.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Minimal uniform sampling interface used by the optimizer
pub trait RandomSource: Send {
    /// Sample uniformly from `[low, high)`; returns `low` when the range is empty
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// `ChaCha8Rng`-backed source
pub struct SeededRandom {
    rng: ChaCha8Rng,
    seed: Option<u64>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Non-reproducible source for production runs
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            seed: None,
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low.is_nan() || high.is_nan() || low >= high || !(high - low).is_finite() {
            return low;
        }
        self.rng.random_range(low..high)
    }
}

/// Replays a recorded sequence of unit draws (cycling), mapped onto the
/// requested range. Used to pin trials to exact fixtures.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    draws: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    /// `draws` are fractions in `[0, 1)`; out-of-range entries are clipped
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Every draw lands on the midpoint of the range
    pub fn midpoint() -> Self {
        Self::new(vec![0.5])
    }
}

impl RandomSource for SequenceRandom {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if self.draws.is_empty() {
            return low;
        }
        let unit = self.draws[self.cursor % self.draws.len()].clamp(0.0, 1.0);
        self.cursor += 1;
        low + unit * (high - low)
    }
}

impl std::fmt::Debug for SeededRandom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededRandom").field("seed", &self.seed).finish()
    }
}
