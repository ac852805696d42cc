// SPDX-License-Identifier: MIT OR Apache-2.0
//! Injectable randomness for particle jitter and pool shuffling.

use crate::particle::Particle;
use rand::prelude::*;

/// Random source used by the engine.
///
/// Any [`rand::Rng`] implements it. Tests can supply a fixed source to pin
/// jitter values and pool order.
pub trait ParticleRng {
    /// Uniform sample in `[lo, hi)`; returns `lo` for an empty window
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// Reorder a freshly created particle pool
    fn shuffle(&mut self, particles: &mut [Particle]);
}

impl<R: Rng> ParticleRng for R {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if lo < hi {
            self.gen_range(lo..hi)
        } else {
            lo
        }
    }

    fn shuffle(&mut self, particles: &mut [Particle]) {
        particles.shuffle(self);
    }
}

/// Create the engine RNG, drawing a seed when none is configured
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| {
        let seed = rand::thread_rng().gen();
        tracing::debug!("Using random seed {seed}");
        seed
    });
    StdRng::seed_from_u64(seed)
}
