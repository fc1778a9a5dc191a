//! Injectable randomness.
//!
//! The director's hijinx roll and the template pools are the only random
//! choices in a cycle. Both go through [`RandomSource`] so a fixed seed (or a
//! scripted sequence in tests) reproduces a broadcast exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the randomized gates used during a cycle.
pub trait RandomSource: Send {
    /// Uniform roll in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Seeded source backed by `StdRng`.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the operating system, for live broadcasts.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn roll(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

/// Replays a fixed list of rolls, cycling when exhausted.
///
/// `pick` maps the next roll onto the index range, so a script of `0.0`
/// always picks the first template and fires every gate whose probability
/// is above zero. A script of `0.99` fires none of the default gates.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, cursor: 0 }
    }

    /// Every roll returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let value = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        let index = (self.roll() * len as f64) as usize;
        index.min(len - 1)
    }
}
