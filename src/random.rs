//! Injectable random source for layout seeding and motion jitter.
//!
//! Production uses the thread-local generator, so layouts differ between
//! runs.  Tests (and `TOOLFIELD_SEED=<n>`) use [`SeededRandom`] so every
//! size, jitter and initial velocity is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform `f32` draws over an inclusive range.
///
/// The engine is a Bevy `Resource`, so implementations must be `Send + Sync`.
pub trait RandomSource: Send + Sync {
    /// Uniform sample in `[min, max]`.  `min == max` returns `min`.
    fn range(&mut self, min: f32, max: f32) -> f32;

    /// Uniform sample in `[-half_width, half_width]`.
    fn symmetric(&mut self, half_width: f32) -> f32 {
        let h = half_width.abs();
        self.range(-h, h)
    }
}

/// Unseeded source backed by `rand::thread_rng()`.
///
/// `ThreadRng` is `!Send`, so the handle is fetched per draw instead of stored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Deterministic source for tests and reproducible demos.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}
