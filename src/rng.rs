//! Injected randomness
//!
//! Every stochastic component draws through [`NoiseSource`] rather than a
//! process-global generator, so callers can pin a seed and replay identical
//! simulations. The production source is ChaCha8-backed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pseudo-random source injected into the stochastic components
pub trait NoiseSource {
    /// Uniform draw in `[lo, hi)`; a pinned range (`lo == hi`) yields `lo`
    fn next_uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Uniform integer draw in `[lo, hi]`, both ends inclusive
    fn next_int(&mut self, lo: i32, hi: i32) -> i32;
}

/// ChaCha8-backed noise source
pub struct PrngNoise {
    rng: ChaCha8Rng,
}

impl PrngNoise {
    /// Source with a pinned seed; the same seed replays the same draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl NoiseSource for PrngNoise {
    fn next_uniform(&mut self, lo: f64, hi: f64) -> f64 {
        // gen_range rejects an empty float range outright
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    fn next_int(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.gen_range(lo..=hi)
    }
}

/// Scripted noise source for component tests: pops pre-arranged draws in
/// order and panics when a test under-provisions them.
#[cfg(test)]
pub(crate) struct ScriptNoise {
    uniforms: std::collections::VecDeque<f64>,
    ints: std::collections::VecDeque<i32>,
}

#[cfg(test)]
impl ScriptNoise {
    pub(crate) fn new(uniforms: &[f64], ints: &[i32]) -> Self {
        Self {
            uniforms: uniforms.iter().copied().collect(),
            ints: ints.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl NoiseSource for ScriptNoise {
    fn next_uniform(&mut self, _lo: f64, _hi: f64) -> f64 {
        self.uniforms.pop_front().expect("script ran out of uniforms")
    }

    fn next_int(&mut self, _lo: i32, _hi: i32) -> i32 {
        self.ints.pop_front().expect("script ran out of ints")
    }
}
